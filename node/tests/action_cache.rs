use crate::{digest_of, node_test, router_test, test_config};
use async_trait::async_trait;
use blobstore::{BlobAccess, BlobError, Buffer};
use common::{Digest, DigestSet};
use node_lib::ActionCacheService;
use protos::re::{ActionResult, GetActionResultRequest, UpdateActionResultRequest};
use protos::{ActionCacheClient, ActionCacheServer};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tonic::transport::Server;
use tonic::{Code, Request};

fn action_result() -> ActionResult {
    ActionResult {
        exit_code: 1,
        stdout_raw: b"compiling".to_vec(),
        ..Default::default()
    }
}

#[tokio::test]
async fn update_then_get() {
    let action_digest = digest_of("main", b"action");

    node_test(test_config(), |channel| async move {
        let mut client = ActionCacheClient::new(channel);

        let status = client
            .get_action_result(Request::new(GetActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let stored = client
            .update_action_result(Request::new(UpdateActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                action_result: Some(action_result()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(stored, action_result());

        let fetched = client
            .get_action_result(Request::new(GetActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(fetched, action_result());
    })
    .await;
}

#[tokio::test]
async fn invalid_action_digest() {
    node_test(test_config(), |channel| async move {
        let mut client = ActionCacheClient::new(channel);
        let status = client
            .get_action_result(Request::new(GetActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(protos::re::Digest {
                    hash: "not hex".to_string(),
                    size_bytes: 5,
                }),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = client
            .update_action_result(Request::new(UpdateActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: None,
                action_result: Some(action_result()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    })
    .await;
}

/// Counts the calls that reach storage.
#[derive(Default)]
struct RecordingBlobAccess {
    puts: AtomicUsize,
}

#[async_trait]
impl BlobAccess for RecordingBlobAccess {
    fn get(&self, digest: &Digest) -> Buffer {
        Buffer::from_error(BlobError::NotFound(digest.clone()))
    }

    async fn put(&self, _digest: &Digest, _buffer: Buffer) -> Result<(), BlobError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_missing(&self, digests: &DigestSet) -> Result<DigestSet, BlobError> {
        Ok(digests.clone())
    }
}

#[tokio::test]
async fn update_denied_for_other_instances() {
    let storage = Arc::new(RecordingBlobAccess::default());
    let service = ActionCacheService::new(
        storage.clone(),
        HashSet::from(["main".to_string()]),
        node_lib::DEFAULT_MAXIMUM_MESSAGE_SIZE_BYTES,
    );
    let router = Server::builder().add_service(ActionCacheServer::new(service));
    let action_digest = digest_of("other", b"action");

    router_test(router, |channel| async move {
        let mut client = ActionCacheClient::new(channel);
        let status = client
            .update_action_result(Request::new(UpdateActionResultRequest {
                instance_name: "other".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                action_result: Some(action_result()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::PermissionDenied);
        assert_eq!(
            status.message(),
            "This service does not accept action results for instance \"other\""
        );
        assert_eq!(storage.puts.load(Ordering::SeqCst), 0);

        let status = client
            .update_action_result(Request::new(UpdateActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                action_result: None,
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(storage.puts.load(Ordering::SeqCst), 0);

        client
            .update_action_result(Request::new(UpdateActionResultRequest {
                instance_name: "main".to_string(),
                action_digest: Some(action_digest.to_partial_digest()),
                action_result: Some(action_result()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(storage.puts.load(Ordering::SeqCst), 1);
    })
    .await;
}
