use builder::{BuildQueue, OperationStream};
use protos::re::{ExecuteRequest, GetCapabilitiesRequest, ServerCapabilities, WaitExecutionRequest};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{info, instrument};

/// Exposes a [`BuildQueue`] as both the Capabilities and the Execution
/// service.
#[derive(Clone)]
pub struct BuildQueueService {
    build_queue: Arc<dyn BuildQueue>,
}

impl BuildQueueService {
    pub fn new(build_queue: Arc<dyn BuildQueue>) -> Self {
        BuildQueueService { build_queue }
    }
}

#[tonic::async_trait]
impl protos::Capabilities for BuildQueueService {
    #[instrument(skip_all)]
    async fn get_capabilities(
        &self,
        request: Request<GetCapabilitiesRequest>,
    ) -> Result<Response<ServerCapabilities>, Status> {
        info!("Instance: {}", request.get_ref().instance_name);
        let capabilities = self
            .build_queue
            .get_capabilities(request.into_inner())
            .await?;
        Ok(Response::new(capabilities))
    }
}

#[tonic::async_trait]
impl protos::Execution for BuildQueueService {
    type ExecuteStream = OperationStream;
    type WaitExecutionStream = OperationStream;

    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<Self::ExecuteStream>, Status> {
        let operations = self.build_queue.execute(request.into_inner()).await?;
        Ok(Response::new(operations))
    }

    #[instrument(skip_all, fields(name = %request.get_ref().name))]
    async fn wait_execution(
        &self,
        request: Request<WaitExecutionRequest>,
    ) -> Result<Response<Self::WaitExecutionStream>, Status> {
        let operations = self.build_queue.wait_execution(request.into_inner()).await?;
        Ok(Response::new(operations))
    }
}
