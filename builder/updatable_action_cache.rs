use crate::{BuildQueue, OperationStream};
use async_trait::async_trait;
use protos::re::{
    ActionCacheUpdateCapabilities, ExecuteRequest, GetCapabilitiesRequest, ServerCapabilities,
    WaitExecutionRequest,
};
use std::sync::Arc;
use tonic::Status;

/// Announces that clients may write into the action cache, on top of
/// whatever the wrapped queue reports. Execution requests are passed on
/// unchanged.
pub struct UpdatableActionCacheBuildQueue {
    base: Arc<dyn BuildQueue>,
}

impl UpdatableActionCacheBuildQueue {
    pub fn new(base: Arc<dyn BuildQueue>) -> Self {
        UpdatableActionCacheBuildQueue { base }
    }
}

#[async_trait]
impl BuildQueue for UpdatableActionCacheBuildQueue {
    async fn get_capabilities(
        &self,
        request: GetCapabilitiesRequest,
    ) -> Result<ServerCapabilities, Status> {
        let mut capabilities = self.base.get_capabilities(request).await?;
        capabilities
            .cache_capabilities
            .get_or_insert_with(Default::default)
            .action_cache_update_capabilities = Some(ActionCacheUpdateCapabilities {
            update_enabled: true,
        });
        Ok(capabilities)
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<OperationStream, Status> {
        self.base.execute(request).await
    }

    async fn wait_execution(
        &self,
        request: WaitExecutionRequest,
    ) -> Result<OperationStream, Status> {
        self.base.wait_execution(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{answered_by, NamedBuildQueue};
    use crate::NonExecutableBuildQueue;
    use futures::TryStreamExt;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn enables_updates() {
        let queue = UpdatableActionCacheBuildQueue::new(Arc::new(NonExecutableBuildQueue::new()));
        let capabilities = queue
            .get_capabilities(GetCapabilitiesRequest::default())
            .await
            .unwrap();
        let cache = capabilities.cache_capabilities.unwrap();
        assert_eq!(
            cache.action_cache_update_capabilities,
            Some(ActionCacheUpdateCapabilities {
                update_enabled: true
            })
        );
        // The rest of the wrapped capabilities survive.
        assert_eq!(cache.digest_functions.len(), 5);
        assert!(capabilities.execution_capabilities.is_none());
    }

    #[tokio::test]
    async fn passes_execution_through() {
        let (base, calls) = NamedBuildQueue::new("base");
        let queue = UpdatableActionCacheBuildQueue::new(base);

        let capabilities = queue
            .get_capabilities(GetCapabilitiesRequest::default())
            .await
            .unwrap();
        assert_eq!(answered_by(&capabilities), "base");
        assert!(capabilities.cache_capabilities.is_some());

        let names: Vec<String> = queue
            .execute(ExecuteRequest::default())
            .await
            .unwrap()
            .map_ok(|operation| operation.name)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(names, vec!["base-operation".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
