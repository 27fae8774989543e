use crate::{BuildQueue, OperationStream};
use async_trait::async_trait;
use futures::TryStreamExt;
use protos::longrunning::Operation;
use protos::re::{ExecuteRequest, GetCapabilitiesRequest, ServerCapabilities, WaitExecutionRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tonic::Status;
use tracing::instrument;

type BuildQueueGetter = Box<dyn Fn(&str) -> Result<Arc<dyn BuildQueue>, Status> + Send + Sync>;

/// Forwards requests to one of several build queues, selected by the
/// instance name in the request.
///
/// Operation names handed out to clients are prefixed with the instance
/// name and a `|`, so that a later WaitExecution can find its way back to
/// the queue that created the operation.
pub struct DemultiplexingBuildQueue {
    get_backend: BuildQueueGetter,
}

impl DemultiplexingBuildQueue {
    pub fn new<F>(get_backend: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn BuildQueue>, Status> + Send + Sync + 'static,
    {
        DemultiplexingBuildQueue {
            get_backend: Box::new(get_backend),
        }
    }

    /// Routes every instance name in `backends` to its queue, rejecting all
    /// other instance names.
    pub fn from_backends(backends: HashMap<String, Arc<dyn BuildQueue>>) -> Self {
        Self::new(move |instance| {
            backends.get(instance).cloned().ok_or_else(|| {
                Status::invalid_argument(format!("Unknown instance name: {instance:?}"))
            })
        })
    }

    fn prefix_operation_names(instance: String, operations: OperationStream) -> OperationStream {
        Box::pin(operations.map_ok(move |operation| Operation {
            name: format!("{}|{}", instance, operation.name),
            ..operation
        }))
    }
}

#[async_trait]
impl BuildQueue for DemultiplexingBuildQueue {
    #[instrument(skip_all, fields(instance = %request.instance_name))]
    async fn get_capabilities(
        &self,
        request: GetCapabilitiesRequest,
    ) -> Result<ServerCapabilities, Status> {
        let backend = (self.get_backend)(&request.instance_name)?;
        backend.get_capabilities(request).await
    }

    #[instrument(skip_all, fields(instance = %request.instance_name))]
    async fn execute(&self, request: ExecuteRequest) -> Result<OperationStream, Status> {
        let backend = (self.get_backend)(&request.instance_name)?;
        let instance = request.instance_name.clone();
        let operations = backend.execute(request).await?;
        Ok(Self::prefix_operation_names(instance, operations))
    }

    #[instrument(skip_all, fields(name = %request.name))]
    async fn wait_execution(
        &self,
        request: WaitExecutionRequest,
    ) -> Result<OperationStream, Status> {
        let Some((instance, name)) = request.name.split_once('|') else {
            return Err(Status::invalid_argument(
                "Unable to extract instance name from operation name",
            ));
        };
        let backend = (self.get_backend)(instance)?;
        let instance = instance.to_string();
        let request = WaitExecutionRequest {
            name: name.to_string(),
        };
        let operations = backend.wait_execution(request).await?;
        Ok(Self::prefix_operation_names(instance, operations))
    }
}
