use crate::{BuildQueue, OperationStream};
use async_trait::async_trait;
use futures::StreamExt;
use protos::re::{ExecuteRequest, GetCapabilitiesRequest, ServerCapabilities, WaitExecutionRequest};
use protos::{CapabilitiesClient, ExecutionClient};
use tonic::transport::Channel;
use tonic::Status;
use tracing::instrument;

/// Passes all requests on to a remote scheduler.
#[derive(Clone, Debug)]
pub struct ForwardingBuildQueue {
    capabilities: CapabilitiesClient<Channel>,
    execution: ExecutionClient<Channel>,
}

impl ForwardingBuildQueue {
    pub fn new(channel: Channel) -> Self {
        ForwardingBuildQueue {
            capabilities: CapabilitiesClient::new(channel.clone()),
            execution: ExecutionClient::new(channel),
        }
    }
}

#[async_trait]
impl BuildQueue for ForwardingBuildQueue {
    #[instrument(skip_all, fields(instance = %request.instance_name))]
    async fn get_capabilities(
        &self,
        request: GetCapabilitiesRequest,
    ) -> Result<ServerCapabilities, Status> {
        let mut client = self.capabilities.clone();
        Ok(client.get_capabilities(request).await?.into_inner())
    }

    #[instrument(skip_all, fields(instance = %request.instance_name))]
    async fn execute(&self, request: ExecuteRequest) -> Result<OperationStream, Status> {
        let mut client = self.execution.clone();
        Ok(client.execute(request).await?.into_inner().boxed())
    }

    #[instrument(skip_all, fields(name = %request.name))]
    async fn wait_execution(
        &self,
        request: WaitExecutionRequest,
    ) -> Result<OperationStream, Status> {
        let mut client = self.execution.clone();
        Ok(client.wait_execution(request).await?.into_inner().boxed())
    }
}
