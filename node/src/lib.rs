use anyhow::Context;
use blobstore::{BlobAccess, GrpcActionCache, GrpcCas, Icas, InMemory};
use builder::{
    BuildQueue, DemultiplexingBuildQueue, ForwardingBuildQueue, NonExecutableBuildQueue,
    UpdatableActionCacheBuildQueue,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tonic::transport::{Channel, Endpoint, Server};
use tracing::info;

mod services;

use protos::*;
pub use services::{
    ActionCacheService, BuildQueueService, BytestreamService, ContentStorageService, IcasService,
};

/// The default upper bound on the size of messages that are sent and
/// received, and on the objects that are loaded into memory to serve them.
pub const DEFAULT_MAXIMUM_MESSAGE_SIZE_BYTES: usize = 16 * 1024 * 1024;

/// The contents of the configuration file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub address: std::net::SocketAddr,
    #[serde(default = "default_maximum_message_size_bytes")]
    pub maximum_message_size_bytes: usize,
    /// Instances for which clients may store results in the action cache.
    #[serde(default)]
    pub allow_ac_updates_for_instances: Vec<String>,
    pub content_addressable_storage: BlobAccessConfig,
    pub action_cache: BlobAccessConfig,
    /// The ICAS service is only offered when this is set.
    #[serde(default)]
    pub indirect_content_addressable_storage: Option<BlobAccessConfig>,
    /// Instance name to scheduler endpoint.
    #[serde(default)]
    pub schedulers: BTreeMap<String, String>,
}

fn default_maximum_message_size_bytes() -> usize {
    DEFAULT_MAXIMUM_MESSAGE_SIZE_BYTES
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlobAccessConfig {
    Memory,
    Grpc { endpoint: String },
}

/// What kind of objects a [`BlobAccess`] holds, which decides the protocol
/// that is used to reach remote storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageType {
    ContentAddressableStorage,
    ActionCache,
    IndirectContentAddressableStorage,
}

pub enum Connection {
    // Default gRPC over TCP
    Tcp(std::net::SocketAddr),
    // Unix Domain Socket. Used for testing.
    Uds(tokio_stream::wrappers::UnixListenerStream),
}

fn connect(endpoint: &str) -> anyhow::Result<Channel> {
    let endpoint = Endpoint::from_shared(endpoint.to_string())
        .with_context(|| format!("Invalid endpoint {endpoint:?}"))?;
    // Remote services are connected to on first use, so that the node can
    // start before its backends do.
    Ok(endpoint.connect_lazy())
}

pub fn new_blob_access(
    config: &BlobAccessConfig,
    storage_type: StorageType,
    maximum_message_size_bytes: usize,
) -> anyhow::Result<Arc<dyn BlobAccess>> {
    Ok(match config {
        BlobAccessConfig::Memory => Arc::new(InMemory::new(maximum_message_size_bytes)),
        BlobAccessConfig::Grpc { endpoint } => {
            let channel = connect(endpoint)?;
            match storage_type {
                StorageType::ContentAddressableStorage => Arc::new(GrpcCas::new(channel)),
                StorageType::ActionCache => {
                    Arc::new(GrpcActionCache::new(channel, maximum_message_size_bytes))
                }
                StorageType::IndirectContentAddressableStorage => {
                    Arc::new(Icas::new(channel, maximum_message_size_bytes))
                }
            }
        }
    })
}

/// Builds the routing table of schedulers and returns the build queue that
/// dispatches to them.
pub fn new_build_queue(config: &NodeConfig) -> anyhow::Result<Arc<dyn BuildQueue>> {
    let mut schedulers: HashMap<String, Arc<dyn BuildQueue>> = HashMap::new();

    // Instances without a scheduler that do allow action cache updates
    // still need to answer GetCapabilities.
    let non_executable: Arc<dyn BuildQueue> = Arc::new(NonExecutableBuildQueue::new());
    for instance in &config.allow_ac_updates_for_instances {
        schedulers.insert(instance.clone(), non_executable.clone());
    }

    for (instance, endpoint) in &config.schedulers {
        let channel = connect(endpoint)
            .with_context(|| format!("Failed to create scheduler for instance {instance:?}"))?;
        schedulers.insert(
            instance.clone(),
            Arc::new(ForwardingBuildQueue::new(channel)),
        );
    }

    for instance in &config.allow_ac_updates_for_instances {
        if let Some(scheduler) = schedulers.remove(instance) {
            schedulers.insert(
                instance.clone(),
                Arc::new(UpdatableActionCacheBuildQueue::new(scheduler)),
            );
        }
    }

    info!(instances = ?schedulers.keys().collect::<Vec<_>>(), "configured build queues");
    Ok(Arc::new(DemultiplexingBuildQueue::from_backends(schedulers)))
}

pub async fn start_node(config: NodeConfig, conn: Connection) -> anyhow::Result<()> {
    let maximum_message_size_bytes = config.maximum_message_size_bytes;
    let content_addressable_storage = new_blob_access(
        &config.content_addressable_storage,
        StorageType::ContentAddressableStorage,
        maximum_message_size_bytes,
    )
    .context("Failed to create Content Addressable Storage")?;
    let action_cache = new_blob_access(
        &config.action_cache,
        StorageType::ActionCache,
        maximum_message_size_bytes,
    )
    .context("Failed to create Action Cache")?;
    let indirect_content_addressable_storage = config
        .indirect_content_addressable_storage
        .as_ref()
        .map(|icas| {
            new_blob_access(
                icas,
                StorageType::IndirectContentAddressableStorage,
                maximum_message_size_bytes,
            )
        })
        .transpose()
        .context("Failed to create Indirect Content Addressable Storage")?;
    let build_queue = BuildQueueService::new(new_build_queue(&config)?);
    let allow_ac_updates_for_instances: HashSet<String> =
        config.allow_ac_updates_for_instances.iter().cloned().collect();

    let server = Server::builder()
        .trace_fn(|request| tracing::info_span!("gRPC Request", api = request.uri().path()))
        .add_service(
            ActionCacheServer::new(ActionCacheService::new(
                action_cache,
                allow_ac_updates_for_instances,
                maximum_message_size_bytes,
            ))
            .max_decoding_message_size(maximum_message_size_bytes)
            .max_encoding_message_size(maximum_message_size_bytes),
        )
        .add_service(
            ContentAddressableStorageServer::new(ContentStorageService::new(
                content_addressable_storage.clone(),
                maximum_message_size_bytes,
            ))
            .max_decoding_message_size(maximum_message_size_bytes)
            .max_encoding_message_size(maximum_message_size_bytes),
        )
        .add_service(ByteStreamServer::new(BytestreamService::new(
            content_addressable_storage,
            maximum_message_size_bytes,
        )))
        .add_optional_service(indirect_content_addressable_storage.map(|icas| {
            IndirectContentAddressableStorageServer::new(IcasService::new(
                icas,
                maximum_message_size_bytes,
            ))
            .max_decoding_message_size(maximum_message_size_bytes)
            .max_encoding_message_size(maximum_message_size_bytes)
        }))
        .add_service(CapabilitiesServer::new(build_queue.clone()))
        .add_service(ExecutionServer::new(build_queue));

    match conn {
        Connection::Tcp(address) => {
            info!(%address, "serving");
            server.serve(address).await?;
        }
        Connection::Uds(uds_stream) => {
            server.serve_with_incoming(uds_stream).await?;
        }
    }
    Ok(())
}
