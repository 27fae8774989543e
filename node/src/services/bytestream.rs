use blobstore::{BlobAccess, BlobError, Buffer, Repairability};
use common::Digest;
use protos::bytestream::{
    QueryWriteStatusRequest, QueryWriteStatusResponse, ReadRequest, ReadResponse, WriteRequest,
    WriteResponse,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tonic::{Request, Response, Status};
use tracing::{error, info, instrument};

/// Size of the chunks in which blobs are returned by Read.
pub const READ_CHUNK_SIZE_BYTES: usize = 1 << 16;

pub struct BytestreamService {
    blob_access: Arc<dyn BlobAccess>,
    maximum_blob_size_bytes: usize,
}

impl BytestreamService {
    pub fn new(blob_access: Arc<dyn BlobAccess>, maximum_blob_size_bytes: usize) -> Self {
        BytestreamService {
            blob_access,
            maximum_blob_size_bytes,
        }
    }
}

#[tonic::async_trait]
impl protos::ByteStream for BytestreamService {
    type ReadStream = ReceiverStream<Result<ReadResponse, Status>>;

    #[instrument(skip_all, fields(resource_name = %request.get_ref().resource_name))]
    async fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> Result<Response<Self::ReadStream>, Status> {
        let request = request.into_inner();
        let digest =
            Digest::from_read_resource_name(&request.resource_name).map_err(BlobError::from)?;

        let size_bytes = digest.size_bytes();
        if request.read_offset < 0 || request.read_offset > size_bytes {
            return Err(Status::out_of_range(format!(
                "Read offset {} is outside the range [0, {}]",
                request.read_offset, size_bytes
            )));
        }
        if request.read_limit < 0 {
            return Err(Status::invalid_argument(format!(
                "Read limit {} is negative",
                request.read_limit
            )));
        }
        let start = request.read_offset as usize;
        let end = if request.read_limit == 0 {
            size_bytes as usize
        } else {
            let end = request.read_offset.saturating_add(request.read_limit);
            std::cmp::min(size_bytes, end) as usize
        };

        let buffer = self.blob_access.get(&digest);
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let data = match buffer.into_bytes(size_bytes as usize).await {
                Ok(data) => {
                    let end = end.min(data.len());
                    data.slice(start.min(end)..end)
                }
                Err(e) => {
                    error!(%digest, "read failed: {e}");
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };
            for chunk in data.chunks(READ_CHUNK_SIZE_BYTES) {
                let response = ReadResponse {
                    data: chunk.to_vec(),
                };
                if tx.send(Ok(response)).await.is_err() {
                    // Client went away.
                    return;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    #[instrument(skip_all)]
    async fn write(
        &self,
        request: Request<tonic::Streaming<WriteRequest>>,
    ) -> Result<Response<WriteResponse>, Status> {
        let mut stream = request.into_inner();
        let closed_early =
            || Status::invalid_argument("Client closed stream without finishing write");

        // Only the first request of a stream needs to carry a resource name.
        let mut request = stream.next().await.ok_or_else(closed_early)??;
        let digest =
            Digest::from_write_resource_name(&request.resource_name).map_err(BlobError::from)?;
        // Refuse before buffering anything if the object could never be stored.
        if digest.size_bytes() as u64 > self.maximum_blob_size_bytes as u64 {
            return Err(BlobError::SizeExceeded {
                size_bytes: digest.size_bytes() as u64,
                maximum_size_bytes: self.maximum_blob_size_bytes,
                repairability: Repairability::UserProvided,
            }
            .into());
        }
        let mut blob = Vec::new();
        loop {
            if request.write_offset != blob.len() as i64 {
                return Err(Status::invalid_argument(format!(
                    "Attempted to write at offset {}, while {} bytes were already received",
                    request.write_offset,
                    blob.len()
                )));
            }
            if (blob.len() + request.data.len()) as u64 > digest.size_bytes() as u64 {
                return Err(Status::invalid_argument(format!(
                    "Received more than {} bytes of data",
                    digest.size_bytes()
                )));
            }
            blob.extend_from_slice(&request.data);

            if request.finish_write {
                let committed_size = blob.len() as i64;
                let buffer = Buffer::new_cas_buffer(&digest, blob, Repairability::UserProvided);
                self.blob_access.put(&digest, buffer).await?;
                info!(%digest, "write finished");
                return Ok(Response::new(WriteResponse { committed_size }));
            }
            request = stream.next().await.ok_or_else(closed_early)??;
        }
    }

    async fn query_write_status(
        &self,
        _request: Request<QueryWriteStatusRequest>,
    ) -> Result<Response<QueryWriteStatusResponse>, Status> {
        Err(Status::unimplemented(
            "This service does not support querying write status",
        ))
    }
}
