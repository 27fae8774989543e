use crate::BlobError;
use bytes::Bytes;
use common::Digest;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

/// Who is at fault when the contents of a buffer turn out to be invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repairability {
    /// The contents came from storage that is supposed to be correct. An
    /// error means the storage is corrupted or unavailable.
    Irreparable,
    /// The contents were provided as part of the current request. An error
    /// means the caller has to fix its input.
    UserProvided,
}

enum Contents {
    Data(Bytes),
    Pending {
        future: BoxFuture<'static, Result<Bytes, BlobError>>,
        expected_size_bytes: Option<i64>,
    },
    Error(BlobError),
}

/// The contents of an object, possibly not yet fetched.
///
/// Every method that reads the contents takes the buffer by value, so a
/// buffer can only be consumed once:
///
/// ```compile_fail
/// # async fn consume(buffer: blobstore::Buffer) {
/// let first = buffer.into_bytes(1024).await;
/// let second = buffer.into_bytes(1024).await;
/// # }
/// ```
pub struct Buffer {
    contents: Contents,
    repairability: Repairability,
}

impl Buffer {
    pub fn from_bytes(data: impl Into<Bytes>, repairability: Repairability) -> Self {
        Buffer {
            contents: Contents::Data(data.into()),
            repairability,
        }
    }

    /// Creates a buffer for an object in the Content Addressable Storage.
    /// The size of the data has to match the size stored in the digest.
    pub fn new_cas_buffer(
        digest: &Digest,
        data: impl Into<Bytes>,
        repairability: Repairability,
    ) -> Self {
        let data = data.into();
        if data.len() as u64 != digest.size_bytes() as u64 {
            return Buffer::from_error(BlobError::SizeMismatch {
                actual_size_bytes: data.len() as u64,
                expected_size_bytes: digest.size_bytes(),
                repairability,
            });
        }
        Buffer::from_bytes(data, repairability)
    }

    pub fn from_proto<M: prost::Message>(message: &M, repairability: Repairability) -> Self {
        Buffer::from_bytes(message.encode_to_vec(), repairability)
    }

    /// Creates a buffer whose contents are only fetched once consumed.
    pub fn from_future<F>(future: F, repairability: Repairability) -> Self
    where
        F: Future<Output = Result<Bytes, BlobError>> + Send + 'static,
    {
        Buffer {
            contents: Contents::Pending {
                future: future.boxed(),
                expected_size_bytes: None,
            },
            repairability,
        }
    }

    /// Like `from_future`, but for CAS objects. The size stored in the
    /// digest is known up front, so size limits can be enforced without
    /// fetching anything.
    pub fn new_cas_buffer_from_future<F>(
        digest: &Digest,
        future: F,
        repairability: Repairability,
    ) -> Self
    where
        F: Future<Output = Result<Bytes, BlobError>> + Send + 'static,
    {
        Buffer {
            contents: Contents::Pending {
                future: future.boxed(),
                expected_size_bytes: Some(digest.size_bytes()),
            },
            repairability,
        }
    }

    pub fn from_error(error: impl Into<BlobError>) -> Self {
        Buffer {
            contents: Contents::Error(error.into()),
            repairability: Repairability::Irreparable,
        }
    }

    pub fn repairability(&self) -> Repairability {
        self.repairability
    }

    /// The size of the contents, if known without fetching them.
    pub fn size_bytes(&self) -> Option<u64> {
        match &self.contents {
            Contents::Data(data) => Some(data.len() as u64),
            Contents::Pending {
                expected_size_bytes,
                ..
            } => expected_size_bytes.map(|size| size as u64),
            Contents::Error(_) => None,
        }
    }

    fn check_size(&self, size_bytes: u64, maximum_size_bytes: usize) -> Result<(), BlobError> {
        if size_bytes > maximum_size_bytes as u64 {
            return Err(BlobError::SizeExceeded {
                size_bytes,
                maximum_size_bytes,
                repairability: self.repairability,
            });
        }
        Ok(())
    }

    pub async fn into_bytes(self, maximum_size_bytes: usize) -> Result<Bytes, BlobError> {
        if let Some(size_bytes) = self.size_bytes() {
            self.check_size(size_bytes, maximum_size_bytes)?;
        }
        let repairability = self.repairability;
        match self.contents {
            Contents::Data(data) => Ok(data),
            Contents::Pending {
                future,
                expected_size_bytes,
            } => {
                let data = future.await?;
                if let Some(expected_size_bytes) = expected_size_bytes {
                    if data.len() as u64 != expected_size_bytes as u64 {
                        return Err(BlobError::SizeMismatch {
                            actual_size_bytes: data.len() as u64,
                            expected_size_bytes,
                            repairability,
                        });
                    }
                } else if data.len() > maximum_size_bytes {
                    return Err(BlobError::SizeExceeded {
                        size_bytes: data.len() as u64,
                        maximum_size_bytes,
                        repairability,
                    });
                }
                Ok(data)
            }
            Contents::Error(e) => Err(e),
        }
    }

    pub async fn into_proto<M: prost::Message + Default>(
        self,
        maximum_size_bytes: usize,
    ) -> Result<M, BlobError> {
        let repairability = self.repairability;
        let data = self.into_bytes(maximum_size_bytes).await?;
        M::decode(data).map_err(|source| BlobError::Decode {
            source,
            repairability,
        })
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents = match &self.contents {
            Contents::Data(data) => format!("{} bytes", data.len()),
            Contents::Pending { .. } => "pending".to_string(),
            Contents::Error(e) => format!("error: {e}"),
        };
        f.debug_struct("Buffer")
            .field("contents", &contents)
            .field("repairability", &self.repairability)
            .finish()
    }
}
