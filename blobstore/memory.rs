use crate::{BlobAccess, BlobError, Buffer, Repairability};
use async_trait::async_trait;
use bytes::Bytes;
use common::{Digest, DigestSet};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps objects in a hash map. Objects larger than `maximum_size_bytes`
/// are refused.
#[derive(Clone, Debug)]
pub struct InMemory {
    blobs: Arc<Mutex<HashMap<Digest, Bytes>>>,
    maximum_size_bytes: usize,
}

impl InMemory {
    pub fn new(maximum_size_bytes: usize) -> Self {
        InMemory {
            blobs: Arc::default(),
            maximum_size_bytes,
        }
    }
}

#[async_trait]
impl BlobAccess for InMemory {
    fn get(&self, digest: &Digest) -> Buffer {
        let blobs = self.blobs.clone();
        let digest = digest.clone();
        Buffer::from_future(
            async move {
                let blobs = blobs.lock().await;
                log::info!("read: {}", digest);
                let data = blobs.get(&digest).cloned();
                data.ok_or(BlobError::NotFound(digest))
            },
            Repairability::Irreparable,
        )
    }

    async fn put(&self, digest: &Digest, buffer: Buffer) -> Result<(), BlobError> {
        let data = buffer.into_bytes(self.maximum_size_bytes).await?;
        let mut blobs = self.blobs.lock().await;
        log::info!("write: {}", digest);
        blobs.insert(digest.clone(), data);
        Ok(())
    }

    async fn find_missing(&self, digests: &DigestSet) -> Result<DigestSet, BlobError> {
        let blobs = self.blobs.lock().await;
        let missing: DigestSet = digests
            .iter()
            .filter(|digest| !blobs.contains_key(*digest))
            .cloned()
            .collect();
        log::info!("check: {} / {} missing", digests.len(), missing.len());
        Ok(missing)
    }
}
