//! Backends that relay to another storage node over gRPC.

use crate::{find_missing_per_instance, BlobAccess, BlobError, Buffer, Repairability};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use common::{Digest, DigestSet};
use prost::Message;
use protos::bytestream::{ReadRequest, WriteRequest};
use protos::re::{
    ActionResult, FindMissingBlobsRequest, GetActionResultRequest, UpdateActionResultRequest,
};
use protos::{ActionCacheClient, ByteStreamClient, ContentAddressableStorageClient};
use tonic::transport::Channel;
use tracing::{debug, instrument};
use uuid::Uuid;

const WRITE_CHUNK_SIZE_BYTES: usize = 1 << 16;

/// A remote Content Addressable Storage. Objects are transferred through
/// the ByteStream service, so they are not bound by message size limits.
#[derive(Clone, Debug)]
pub struct GrpcCas {
    bytestream: ByteStreamClient<Channel>,
    cas: ContentAddressableStorageClient<Channel>,
}

impl GrpcCas {
    pub fn new(channel: Channel) -> Self {
        GrpcCas {
            bytestream: ByteStreamClient::new(channel.clone()),
            cas: ContentAddressableStorageClient::new(channel),
        }
    }
}

#[async_trait]
impl BlobAccess for GrpcCas {
    fn get(&self, digest: &Digest) -> Buffer {
        let mut client = self.bytestream.clone();
        let request = ReadRequest {
            resource_name: digest.read_resource_name(),
            read_offset: 0,
            read_limit: 0,
        };
        Buffer::new_cas_buffer_from_future(
            digest,
            async move {
                let mut stream = client.read(request).await?.into_inner();
                let mut data = BytesMut::new();
                while let Some(response) = stream.message().await? {
                    data.extend_from_slice(&response.data);
                }
                Ok(data.freeze())
            },
            Repairability::Irreparable,
        )
    }

    #[instrument(skip_all, fields(digest = %digest))]
    async fn put(&self, digest: &Digest, buffer: Buffer) -> Result<(), BlobError> {
        let data = buffer.into_bytes(digest.size_bytes() as usize).await?;
        let resource_name = digest.write_resource_name(Uuid::new_v4());

        let chunks: Vec<Bytes> = if data.is_empty() {
            vec![Bytes::new()]
        } else {
            data.chunks(WRITE_CHUNK_SIZE_BYTES)
                .map(|chunk| data.slice_ref(chunk))
                .collect()
        };
        let last = chunks.len() - 1;
        let mut write_offset = 0;
        let mut requests = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.into_iter().enumerate() {
            let size_bytes = chunk.len() as i64;
            requests.push(WriteRequest {
                resource_name: resource_name.clone(),
                write_offset,
                finish_write: i == last,
                data: chunk.to_vec(),
            });
            write_offset += size_bytes;
        }
        debug!(chunks = requests.len(), "uploading blob");

        let response = self
            .bytestream
            .clone()
            .write(futures::stream::iter(requests))
            .await?
            .into_inner();
        if response.committed_size != digest.size_bytes() {
            return Err(tonic::Status::internal(format!(
                "Server committed {} bytes, while {} bytes were uploaded",
                response.committed_size,
                digest.size_bytes()
            ))
            .into());
        }
        Ok(())
    }

    #[instrument(skip_all, fields(digests = digests.len()))]
    async fn find_missing(&self, digests: &DigestSet) -> Result<DigestSet, BlobError> {
        find_missing_per_instance(digests, |instance_name, blob_digests| {
            let mut client = self.cas.clone();
            async move {
                let response = client
                    .find_missing_blobs(FindMissingBlobsRequest {
                        instance_name,
                        blob_digests,
                        ..Default::default()
                    })
                    .await?;
                Ok(response.into_inner().missing_blob_digests)
            }
        })
        .await
    }
}

/// A remote Action Cache.
#[derive(Clone, Debug)]
pub struct GrpcActionCache {
    client: ActionCacheClient<Channel>,
    maximum_message_size_bytes: usize,
}

impl GrpcActionCache {
    pub fn new(channel: Channel, maximum_message_size_bytes: usize) -> Self {
        GrpcActionCache {
            client: ActionCacheClient::new(channel),
            maximum_message_size_bytes,
        }
    }
}

#[async_trait]
impl BlobAccess for GrpcActionCache {
    fn get(&self, digest: &Digest) -> Buffer {
        let mut client = self.client.clone();
        let request = GetActionResultRequest {
            instance_name: digest.instance().to_string(),
            action_digest: Some(digest.to_partial_digest()),
            ..Default::default()
        };
        Buffer::from_future(
            async move {
                let action_result = client.get_action_result(request).await?.into_inner();
                Ok(Bytes::from(action_result.encode_to_vec()))
            },
            Repairability::Irreparable,
        )
    }

    #[instrument(skip_all, fields(digest = %digest))]
    async fn put(&self, digest: &Digest, buffer: Buffer) -> Result<(), BlobError> {
        let action_result: ActionResult =
            buffer.into_proto(self.maximum_message_size_bytes).await?;
        self.client
            .clone()
            .update_action_result(UpdateActionResultRequest {
                instance_name: digest.instance().to_string(),
                action_digest: Some(digest.to_partial_digest()),
                action_result: Some(action_result),
                results_cache_policy: None,
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    async fn find_missing(&self, _digests: &DigestSet) -> Result<DigestSet, BlobError> {
        Err(tonic::Status::unimplemented(
            "Bazel action cache does not support bulk existence checking",
        )
        .into())
    }
}
