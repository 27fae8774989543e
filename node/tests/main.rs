use common::Digest;
use node_lib::{BlobAccessConfig, Connection, NodeConfig};
use sha2::{Digest as _, Sha256};
use std::future::Future;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempPath};
use tokio::net::{UnixListener, UnixStream};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::server::Router;
use tonic::transport::{Channel, Endpoint, Uri};

mod action_cache;
mod cas;

fn bind_socket() -> (Arc<TempPath>, UnixListenerStream) {
    let socket = NamedTempFile::new().unwrap();
    let socket = Arc::new(socket.into_temp_path());
    std::fs::remove_file(&*socket).unwrap();

    let uds = UnixListener::bind(&*socket).unwrap();
    (socket, UnixListenerStream::new(uds))
}

fn connect(socket: Arc<TempPath>) -> Channel {
    Endpoint::try_from("http://node.test")
        .unwrap()
        .connect_with_connector_lazy(tower::service_fn(move |_: Uri| {
            let socket = Arc::clone(&socket);
            async move { UnixStream::connect(&*socket).await }
        }))
}

/// A node with in-memory storage that accepts action results for "main".
pub fn test_config() -> NodeConfig {
    NodeConfig {
        address: "127.0.0.1:0".parse().unwrap(),
        maximum_message_size_bytes: node_lib::DEFAULT_MAXIMUM_MESSAGE_SIZE_BYTES,
        allow_ac_updates_for_instances: vec!["main".to_string()],
        content_addressable_storage: BlobAccessConfig::Memory,
        action_cache: BlobAccessConfig::Memory,
        indirect_content_addressable_storage: Some(BlobAccessConfig::Memory),
        schedulers: Default::default(),
    }
}

/// Runs `test` against a node started with `config`.
pub async fn node_test<F, Fut>(config: NodeConfig, test: F)
where
    F: FnOnce(Channel) -> Fut,
    Fut: Future<Output = ()>,
{
    let (socket, incoming) = bind_socket();
    let server_fut = node_lib::start_node(config, Connection::Uds(incoming));
    let client_fut = test(connect(socket));

    tokio::select! {
        result = server_fut => panic!("Server ended execution before client: {result:?}"),
        _ = client_fut => (),
    }
}

/// Runs `test` against an arbitrary set of services.
pub async fn router_test<F, Fut>(router: Router, test: F)
where
    F: FnOnce(Channel) -> Fut,
    Fut: Future<Output = ()>,
{
    let (socket, incoming) = bind_socket();
    let server_fut = router.serve_with_incoming(incoming);
    let client_fut = test(connect(socket));

    tokio::select! {
        result = server_fut => panic!("Server ended execution before client: {result:?}"),
        _ = client_fut => (),
    }
}

/// The SHA-256 digest of `data`.
pub fn digest_of(instance: &str, data: &[u8]) -> Digest {
    let hash = base16ct::lower::encode_string(&Sha256::digest(data));
    Digest::new(instance, hash, data.len() as i64).unwrap()
}
