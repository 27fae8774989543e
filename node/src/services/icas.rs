use super::item_status;
use blobstore::{BlobAccess, BlobError, Buffer, Repairability};
use common::{Digest, DigestSet};
use futures::future::join_all;
use protos::icas::{BatchUpdateReferencesRequest, GetReferenceRequest, Reference};
use protos::re::{
    batch_update_blobs_response, BatchUpdateBlobsResponse, FindMissingBlobsRequest,
    FindMissingBlobsResponse,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::instrument;

/// Serves the Indirect Content Addressable Storage on top of any
/// [`BlobAccess`] that stores encoded references.
pub struct IcasService {
    blob_access: Arc<dyn BlobAccess>,
    maximum_message_size_bytes: usize,
}

impl IcasService {
    pub fn new(blob_access: Arc<dyn BlobAccess>, maximum_message_size_bytes: usize) -> Self {
        IcasService {
            blob_access,
            maximum_message_size_bytes,
        }
    }

    async fn update_reference(
        &self,
        instance: &str,
        partial_digest: Option<&protos::re::Digest>,
        reference: Option<Reference>,
    ) -> Result<(), Status> {
        let digest =
            Digest::from_partial_digest(instance, partial_digest).map_err(BlobError::from)?;
        let reference =
            reference.ok_or_else(|| Status::invalid_argument("No reference provided"))?;
        self.blob_access
            .put(
                &digest,
                Buffer::from_proto(&reference, Repairability::UserProvided),
            )
            .await?;
        Ok(())
    }
}

#[tonic::async_trait]
impl protos::IndirectContentAddressableStorage for IcasService {
    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn find_missing_references(
        &self,
        request: Request<FindMissingBlobsRequest>,
    ) -> Result<Response<FindMissingBlobsResponse>, Status> {
        let request = request.into_inner();
        let digests = request
            .blob_digests
            .iter()
            .map(|digest| Digest::from_partial_digest(&request.instance_name, Some(digest)))
            .collect::<Result<DigestSet, _>>()
            .map_err(BlobError::from)?;
        let missing = self.blob_access.find_missing(&digests).await?;
        Ok(Response::new(FindMissingBlobsResponse {
            missing_blob_digests: missing.to_partial_digests(),
        }))
    }

    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn batch_update_references(
        &self,
        request: Request<BatchUpdateReferencesRequest>,
    ) -> Result<Response<BatchUpdateBlobsResponse>, Status> {
        let request = request.into_inner();
        let instance = &request.instance_name;
        let responses = join_all(request.requests.into_iter().map(|request| async move {
            let result = self
                .update_reference(instance, request.digest.as_ref(), request.reference)
                .await;
            batch_update_blobs_response::Response {
                digest: request.digest,
                status: Some(item_status(result)),
            }
        }))
        .await;
        Ok(Response::new(BatchUpdateBlobsResponse { responses }))
    }

    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn get_reference(
        &self,
        request: Request<GetReferenceRequest>,
    ) -> Result<Response<Reference>, Status> {
        let request = request.into_inner();
        let digest = Digest::from_partial_digest(&request.instance_name, request.digest.as_ref())
            .map_err(BlobError::from)?;
        let reference = self
            .blob_access
            .get(&digest)
            .into_proto::<Reference>(self.maximum_message_size_bytes)
            .await?;
        Ok(Response::new(reference))
    }
}
