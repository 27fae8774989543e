//! Routing of Capabilities and Execution requests to schedulers.

use async_trait::async_trait;
use futures::stream::BoxStream;
use protos::longrunning::Operation;
use protos::re::{ExecuteRequest, GetCapabilitiesRequest, ServerCapabilities, WaitExecutionRequest};
use tonic::Status;

mod demultiplexing;
mod forwarding;
mod non_executable;
mod updatable_action_cache;

pub use demultiplexing::DemultiplexingBuildQueue;
pub use forwarding::ForwardingBuildQueue;
pub use non_executable::NonExecutableBuildQueue;
pub use updatable_action_cache::UpdatableActionCacheBuildQueue;

pub type OperationStream = BoxStream<'static, Result<Operation, Status>>;

/// Something that can report the capabilities of an instance and accept
/// actions for execution.
#[async_trait]
pub trait BuildQueue: Send + Sync + 'static {
    async fn get_capabilities(
        &self,
        request: GetCapabilitiesRequest,
    ) -> Result<ServerCapabilities, Status>;

    async fn execute(&self, request: ExecuteRequest) -> Result<OperationStream, Status>;

    async fn wait_execution(&self, request: WaitExecutionRequest)
        -> Result<OperationStream, Status>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use futures::StreamExt;
    use protos::re::ExecutionCapabilities;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answers every call with its own name, and counts the calls.
    pub struct NamedBuildQueue {
        pub name: &'static str,
        pub calls: Arc<AtomicUsize>,
    }

    impl NamedBuildQueue {
        pub fn new(name: &'static str) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let queue = Arc::new(NamedBuildQueue {
                name,
                calls: calls.clone(),
            });
            (queue, calls)
        }

        fn operation(name: String) -> OperationStream {
            futures::stream::iter(vec![Ok(Operation {
                name,
                done: true,
                ..Default::default()
            })])
            .boxed()
        }
    }

    /// The name of the queue that answered a GetCapabilities call.
    pub fn answered_by(capabilities: &ServerCapabilities) -> &str {
        &capabilities
            .execution_capabilities
            .as_ref()
            .expect("execution capabilities")
            .supported_node_properties[0]
    }

    #[async_trait]
    impl BuildQueue for NamedBuildQueue {
        async fn get_capabilities(
            &self,
            _request: GetCapabilitiesRequest,
        ) -> Result<ServerCapabilities, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ServerCapabilities {
                execution_capabilities: Some(ExecutionCapabilities {
                    exec_enabled: true,
                    supported_node_properties: vec![self.name.to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        async fn execute(&self, _request: ExecuteRequest) -> Result<OperationStream, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::operation(format!("{}-operation", self.name)))
        }

        async fn wait_execution(
            &self,
            request: WaitExecutionRequest,
        ) -> Result<OperationStream, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::operation(request.name))
        }
    }
}
