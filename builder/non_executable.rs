use crate::{BuildQueue, OperationStream};
use async_trait::async_trait;
use protos::re::{
    digest_function, CacheCapabilities, ExecuteRequest, GetCapabilitiesRequest,
    ServerCapabilities, WaitExecutionRequest,
};
use protos::semver::SemVer;
use tonic::Status;

const NOT_SUPPORTED: &str = "This instance name does not support remote execution";

/// A build queue for instances that only offer caching. It reports cache
/// capabilities without execution, and rejects every execution request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonExecutableBuildQueue;

impl NonExecutableBuildQueue {
    pub fn new() -> Self {
        NonExecutableBuildQueue
    }
}

#[async_trait]
impl BuildQueue for NonExecutableBuildQueue {
    async fn get_capabilities(
        &self,
        _request: GetCapabilitiesRequest,
    ) -> Result<ServerCapabilities, Status> {
        let api_version = SemVer {
            major: 2,
            ..Default::default()
        };
        Ok(ServerCapabilities {
            cache_capabilities: Some(CacheCapabilities {
                digest_functions: vec![
                    digest_function::Value::Sha256 as i32,
                    digest_function::Value::Sha1 as i32,
                    digest_function::Value::Md5 as i32,
                    digest_function::Value::Sha384 as i32,
                    digest_function::Value::Sha512 as i32,
                ],
                // Action cache updates are off until a decorator turns
                // them on for the instance.
                action_cache_update_capabilities: None,
                ..Default::default()
            }),
            execution_capabilities: None,
            deprecated_api_version: None,
            low_api_version: Some(api_version.clone()),
            high_api_version: Some(api_version),
        })
    }

    async fn execute(&self, _request: ExecuteRequest) -> Result<OperationStream, Status> {
        Err(Status::unimplemented(NOT_SUPPORTED))
    }

    async fn wait_execution(
        &self,
        _request: WaitExecutionRequest,
    ) -> Result<OperationStream, Status> {
        Err(Status::unimplemented(NOT_SUPPORTED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capabilities_without_execution() {
        let capabilities = NonExecutableBuildQueue::new()
            .get_capabilities(GetCapabilitiesRequest::default())
            .await
            .unwrap();
        assert!(capabilities.execution_capabilities.is_none());
        let cache = capabilities.cache_capabilities.unwrap();
        assert_eq!(cache.digest_functions.len(), 5);
        assert!(cache
            .digest_functions
            .contains(&(digest_function::Value::Sha256 as i32)));
        assert!(cache.action_cache_update_capabilities.is_none());
        assert_eq!(capabilities.high_api_version.unwrap().major, 2);
    }

    #[tokio::test]
    async fn execution_is_unimplemented() {
        let queue = NonExecutableBuildQueue::new();
        let status = queue
            .execute(ExecuteRequest::default())
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), tonic::Code::Unimplemented);
        assert_eq!(status.message(), NOT_SUPPORTED);

        let status = queue
            .wait_execution(WaitExecutionRequest::default())
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), tonic::Code::Unimplemented);
    }
}
