use super::item_status;
use blobstore::{BlobAccess, BlobError, Buffer, Repairability};
use common::{Digest, DigestSet};
use futures::future::join_all;
use protos::re::{
    batch_read_blobs_response, batch_update_blobs_response, compressor, BatchReadBlobsRequest,
    BatchReadBlobsResponse, BatchUpdateBlobsRequest, BatchUpdateBlobsResponse,
    FindMissingBlobsRequest, FindMissingBlobsResponse,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{debug, instrument};

pub struct ContentStorageService {
    blob_access: Arc<dyn BlobAccess>,
    maximum_message_size_bytes: usize,
}

impl ContentStorageService {
    pub fn new(blob_access: Arc<dyn BlobAccess>, maximum_message_size_bytes: usize) -> Self {
        ContentStorageService {
            blob_access,
            maximum_message_size_bytes,
        }
    }

    async fn update_blob(
        &self,
        instance: &str,
        partial_digest: Option<&protos::re::Digest>,
        data: Vec<u8>,
    ) -> Result<(), Status> {
        let digest =
            Digest::from_partial_digest(instance, partial_digest).map_err(BlobError::from)?;
        let buffer = Buffer::new_cas_buffer(&digest, data, Repairability::UserProvided);
        self.blob_access.put(&digest, buffer).await?;
        Ok(())
    }
}

type CasResult<T> = Result<Response<T>, Status>;

#[tonic::async_trait]
impl protos::ContentAddressableStorage for ContentStorageService {
    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn find_missing_blobs(
        &self,
        request: Request<FindMissingBlobsRequest>,
    ) -> CasResult<FindMissingBlobsResponse> {
        let request = request.into_inner();
        let digests = request
            .blob_digests
            .iter()
            .map(|digest| Digest::from_partial_digest(&request.instance_name, Some(digest)))
            .collect::<Result<DigestSet, _>>()
            .map_err(BlobError::from)?;
        let missing = self.blob_access.find_missing(&digests).await?;
        debug!(requested = digests.len(), missing = missing.len());
        Ok(Response::new(FindMissingBlobsResponse {
            missing_blob_digests: missing.to_partial_digests(),
        }))
    }

    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn batch_update_blobs(
        &self,
        request: Request<BatchUpdateBlobsRequest>,
    ) -> CasResult<BatchUpdateBlobsResponse> {
        let request = request.into_inner();
        let instance = &request.instance_name;
        let responses = join_all(request.requests.into_iter().map(|request| async move {
            let result = self
                .update_blob(instance, request.digest.as_ref(), request.data)
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
    async fn batch_read_blobs(
        &self,
        request: Request<BatchReadBlobsRequest>,
    ) -> CasResult<BatchReadBlobsResponse> {
        let request = request.into_inner();
        let digests = request
            .digests
            .iter()
            .map(|digest| Digest::from_partial_digest(&request.instance_name, Some(digest)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(BlobError::from)?;

        // Responses are sent as a single message, so their combined size is
        // bounded by the maximum message size.
        let total_size_bytes = digests
            .iter()
            .try_fold(0u64, |total, d| total.checked_add(d.size_bytes() as u64))
            .unwrap_or(u64::MAX);
        if total_size_bytes > self.maximum_message_size_bytes as u64 {
            return Err(Status::invalid_argument(format!(
                "Attempted to read a total of at least {} bytes, while a maximum of {} bytes is permitted",
                total_size_bytes, self.maximum_message_size_bytes
            )));
        }

        let responses = join_all(digests.into_iter().map(|digest| async move {
            let result = self
                .blob_access
                .get(&digest)
                .into_bytes(self.maximum_message_size_bytes)
                .await;
            let (data, status) = match result {
                Ok(data) => (data.to_vec(), Ok(())),
                Err(e) => (vec![], Err(Status::from(e))),
            };
            batch_read_blobs_response::Response {
                digest: Some(digest.to_partial_digest()),
                data,
                compressor: compressor::Value::Identity as i32,
                status: Some(item_status(status)),
            }
        }))
        .await;
        Ok(Response::new(BatchReadBlobsResponse { responses }))
    }
}
