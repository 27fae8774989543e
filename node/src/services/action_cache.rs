use blobstore::{BlobAccess, BlobError, Buffer, Repairability};
use common::Digest;
use protos::re::{ActionResult, GetActionResultRequest, UpdateActionResultRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{info, instrument};

pub struct ActionCacheService {
    blob_access: Arc<dyn BlobAccess>,
    allow_updates_for_instances: HashSet<String>,
    maximum_message_size_bytes: usize,
}

impl ActionCacheService {
    pub fn new(
        blob_access: Arc<dyn BlobAccess>,
        allow_updates_for_instances: HashSet<String>,
        maximum_message_size_bytes: usize,
    ) -> Self {
        ActionCacheService {
            blob_access,
            allow_updates_for_instances,
            maximum_message_size_bytes,
        }
    }
}

#[tonic::async_trait]
impl protos::ActionCache for ActionCacheService {
    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn get_action_result(
        &self,
        request: Request<GetActionResultRequest>,
    ) -> Result<Response<ActionResult>, Status> {
        let request = request.into_inner();
        let digest =
            Digest::from_partial_digest(&request.instance_name, request.action_digest.as_ref())
                .map_err(BlobError::from)?;
        let action_result = self
            .blob_access
            .get(&digest)
            .into_proto::<ActionResult>(self.maximum_message_size_bytes)
            .await?;
        Ok(Response::new(action_result))
    }

    #[instrument(skip_all, fields(instance = %request.get_ref().instance_name))]
    async fn update_action_result(
        &self,
        request: Request<UpdateActionResultRequest>,
    ) -> Result<Response<ActionResult>, Status> {
        let request = request.into_inner();
        if !self
            .allow_updates_for_instances
            .contains(&request.instance_name)
        {
            return Err(Status::permission_denied(format!(
                "This service does not accept action results for instance {:?}",
                request.instance_name
            )));
        }
        let digest =
            Digest::from_partial_digest(&request.instance_name, request.action_digest.as_ref())
                .map_err(BlobError::from)?;
        let action_result = request
            .action_result
            .ok_or_else(|| Status::invalid_argument("No action result provided"))?;
        self.blob_access
            .put(
                &digest,
                Buffer::from_proto(&action_result, Repairability::UserProvided),
            )
            .await?;
        info!(%digest, "stored action result");
        Ok(Response::new(action_result))
    }
}
