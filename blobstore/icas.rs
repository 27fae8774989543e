use crate::{find_missing_per_instance, BlobAccess, BlobError, Buffer, Repairability};
use async_trait::async_trait;
use bytes::Bytes;
use common::{Digest, DigestSet};
use prost::Message;
use protos::icas::{
    batch_update_references_request, BatchUpdateReferencesRequest, GetReferenceRequest, Reference,
};
use protos::re::FindMissingBlobsRequest;
use protos::IndirectContentAddressableStorageClient;
use tonic::transport::Channel;
use tracing::instrument;

/// Relays requests to a server implementing the Indirect Content
/// Addressable Storage service. Instead of object contents, it stores
/// references to objects held in external corpora.
#[derive(Clone, Debug)]
pub struct Icas {
    client: IndirectContentAddressableStorageClient<Channel>,
    maximum_message_size_bytes: usize,
}

impl Icas {
    pub fn new(channel: Channel, maximum_message_size_bytes: usize) -> Self {
        Icas {
            client: IndirectContentAddressableStorageClient::new(channel),
            maximum_message_size_bytes,
        }
    }
}

#[async_trait]
impl BlobAccess for Icas {
    fn get(&self, digest: &Digest) -> Buffer {
        let mut client = self.client.clone();
        let request = GetReferenceRequest {
            instance_name: digest.instance().to_string(),
            digest: Some(digest.to_partial_digest()),
        };
        Buffer::from_future(
            async move {
                let reference = client.get_reference(request).await?.into_inner();
                Ok(Bytes::from(reference.encode_to_vec()))
            },
            Repairability::Irreparable,
        )
    }

    #[instrument(skip_all, fields(digest = %digest))]
    async fn put(&self, digest: &Digest, buffer: Buffer) -> Result<(), BlobError> {
        let reference: Reference = buffer.into_proto(self.maximum_message_size_bytes).await?;
        // TODO: The ICAS protocol permits batching, which BlobAccess has no
        // way to express. Every put is sent as a batch of one.
        let response = self
            .client
            .clone()
            .batch_update_references(BatchUpdateReferencesRequest {
                instance_name: digest.instance().to_string(),
                requests: vec![batch_update_references_request::Request {
                    digest: Some(digest.to_partial_digest()),
                    reference: Some(reference),
                }],
            })
            .await?
            .into_inner();
        for response in response.responses {
            if let Some(status) = response.status {
                if status.code != protos::rpc::Code::Ok as i32 {
                    return Err(tonic::Status::from(status).into());
                }
            }
        }
        Ok(())
    }

    #[instrument(skip_all, fields(digests = digests.len()))]
    async fn find_missing(&self, digests: &DigestSet) -> Result<DigestSet, BlobError> {
        find_missing_per_instance(digests, |instance_name, blob_digests| {
            let mut client = self.client.clone();
            async move {
                let response = client
                    .find_missing_references(FindMissingBlobsRequest {
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
