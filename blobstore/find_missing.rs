use crate::BlobError;
use common::{Digest, DigestSet, DigestSetBuilder};
use futures::future;
use std::future::Future;

/// Runs a FindMissing style query against a protocol that can only address
/// a single instance name per call.
///
/// The digests are partitioned by instance name and `find_missing` is
/// called once per partition. The calls run concurrently; the first one to
/// fail fails the whole operation and the others are dropped. Digests that
/// the backend reports but that were not part of the partition are left
/// out of the result.
pub async fn find_missing_per_instance<F, Fut>(
    digests: &DigestSet,
    find_missing: F,
) -> Result<DigestSet, BlobError>
where
    F: Fn(String, Vec<protos::re::Digest>) -> Fut,
    Fut: Future<Output = Result<Vec<protos::re::Digest>, BlobError>>,
{
    let queries = digests
        .partition_by_instance()
        .into_iter()
        .map(|(instance, partition)| {
            let query = find_missing(instance.clone(), partition.to_partial_digests());
            async move {
                let mut missing = DigestSetBuilder::new();
                for partial_digest in query.await? {
                    let digest = Digest::from_partial_digest(&instance, Some(&partial_digest))?;
                    if partition.contains(&digest) {
                        missing.add(digest);
                    } else {
                        tracing::warn!(%digest, "backend reported a digest that was not requested");
                    }
                }
                Ok::<DigestSet, BlobError>(missing.build())
            }
        });
    let partitions = future::try_join_all(queries).await?;
    Ok(partitions.into_iter().flatten().collect())
}
