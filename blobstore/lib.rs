//! Storage backends, all reachable through the [`BlobAccess`] trait.

use async_trait::async_trait;
use common::{Digest, DigestSet};

mod buffer;
mod error;
mod find_missing;
mod grpc;
mod icas;
mod memory;

pub use buffer::{Buffer, Repairability};
pub use error::BlobError;
pub use find_missing::find_missing_per_instance;
pub use grpc::{GrpcActionCache, GrpcCas};
pub use icas::Icas;
pub use memory::InMemory;

#[async_trait]
pub trait BlobAccess: Send + Sync + 'static {
    /// Returns a buffer that yields the object when consumed. Nothing is
    /// fetched until then, and a failed lookup surfaces from the buffer.
    fn get(&self, digest: &Digest) -> Buffer;

    /// Stores the contents of `buffer` under `digest`, consuming it.
    async fn put(&self, digest: &Digest, buffer: Buffer) -> Result<(), BlobError>;

    /// Returns the subset of `digests` that is not present.
    async fn find_missing(&self, digests: &DigestSet) -> Result<DigestSet, BlobError>;
}
