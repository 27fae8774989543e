use crate::{digest_of, node_test, test_config};
use blobstore::{BlobAccess, Buffer, GrpcCas, Repairability};
use common::{Digest, DigestSet};
use protos::re::batch_update_blobs_request::Request as BlobRequest;
use protos::re::{BatchReadBlobsRequest, BatchUpdateBlobsRequest, FindMissingBlobsRequest};
use protos::rpc::Code;
use protos::ContentAddressableStorageClient;
use std::str::FromStr;
use tonic::Request;

#[tokio::test]
async fn simple_blob_missing() {
    let missing_digest: protos::re::Digest = Digest::from_str("aaaa:5").unwrap().into();

    node_test(test_config(), |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);
        let response = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![missing_digest.clone()],
                instance_name: "".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.missing_blob_digests, vec![missing_digest]);

        let response = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![],
                instance_name: "".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.missing_blob_digests, vec![]);
    })
    .await;
}

#[tokio::test]
async fn blob_not_missing_after_upload() {
    let digest = digest_of("main", b"swakopmund");

    node_test(test_config(), |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);

        let response = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![digest.to_partial_digest()],
                instance_name: "main".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.missing_blob_digests, vec![digest.to_partial_digest()]);

        let response_codes: Vec<i32> = client
            .batch_update_blobs(Request::new(BatchUpdateBlobsRequest {
                requests: vec![BlobRequest {
                    digest: Some(digest.to_partial_digest()),
                    data: b"swakopmund".to_vec(),
                    compressor: Default::default(),
                }],
                instance_name: "main".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner()
            .responses
            .into_iter()
            .map(|r| r.status.unwrap().code)
            .collect();
        assert_eq!(response_codes, vec![Code::Ok as i32]);

        let response = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![digest.to_partial_digest()],
                instance_name: "main".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.missing_blob_digests, vec![]);

        // Blobs are stored per instance.
        let response = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![digest.to_partial_digest()],
                instance_name: "other".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.missing_blob_digests, vec![digest.to_partial_digest()]);
    })
    .await;
}

#[tokio::test]
async fn bad_blobs_give_invalid_argument() {
    let digest = digest_of("", b"swakopmund");

    node_test(test_config(), |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);

        let response_codes: Vec<i32> = client
            .batch_update_blobs(Request::new(BatchUpdateBlobsRequest {
                requests: vec![
                    BlobRequest {
                        digest: Some(protos::re::Digest {
                            hash: "africa".to_string(),
                            size_bytes: 10,
                        }),
                        data: b"swakopmund".to_vec(),
                        compressor: Default::default(),
                    },
                    BlobRequest {
                        digest: Some(digest.to_partial_digest()),
                        data: b"windhoek".to_vec(),
                        compressor: Default::default(),
                    },
                    BlobRequest {
                        digest: Some(digest.to_partial_digest()),
                        data: b"swakopmund".to_vec(),
                        compressor: Default::default(),
                    },
                ],
                instance_name: "".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner()
            .responses
            .into_iter()
            .map(|r| r.status.unwrap().code)
            .collect();
        assert_eq!(
            response_codes,
            vec![
                Code::InvalidArgument as i32,
                Code::InvalidArgument as i32,
                Code::Ok as i32
            ]
        );

        let status = client
            .find_missing_blobs(Request::new(FindMissingBlobsRequest {
                blob_digests: vec![protos::re::Digest {
                    hash: "africa".to_string(),
                    size_bytes: 10,
                }],
                instance_name: "".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    })
    .await;
}

#[tokio::test]
async fn batch_read() {
    let present = digest_of("", b"etosha");
    let missing = digest_of("", b"kalahari");

    node_test(test_config(), |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);
        client
            .batch_update_blobs(Request::new(BatchUpdateBlobsRequest {
                requests: vec![BlobRequest {
                    digest: Some(present.to_partial_digest()),
                    data: b"etosha".to_vec(),
                    compressor: Default::default(),
                }],
                instance_name: "".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap();

        let responses = client
            .batch_read_blobs(Request::new(BatchReadBlobsRequest {
                instance_name: "".to_string(),
                digests: vec![present.to_partial_digest(), missing.to_partial_digest()],
                acceptable_compressors: vec![],
                ..Default::default()
            }))
            .await
            .unwrap()
            .into_inner()
            .responses;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].digest, Some(present.to_partial_digest()));
        assert_eq!(responses[0].data, b"etosha");
        assert_eq!(responses[0].status.as_ref().unwrap().code, Code::Ok as i32);
        assert_eq!(responses[1].digest, Some(missing.to_partial_digest()));
        assert!(responses[1].data.is_empty());
        assert_eq!(
            responses[1].status.as_ref().unwrap().code,
            Code::NotFound as i32
        );
    })
    .await;
}

#[tokio::test]
async fn batch_read_too_large() {
    let mut config = test_config();
    config.maximum_message_size_bytes = 1024;

    node_test(config, |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);
        let status = client
            .batch_read_blobs(Request::new(BatchReadBlobsRequest {
                instance_name: "".to_string(),
                digests: vec![
                    Digest::from_str("aaaa:1000").unwrap().into(),
                    Digest::from_str("bbbb:1000").unwrap().into(),
                ],
                acceptable_compressors: vec![],
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    })
    .await;
}

#[tokio::test]
async fn remote_cas_round_trip() {
    // Large enough to be split into multiple ByteStream chunks.
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let large = digest_of("main", &data);
    let small = digest_of("other", b"xyz");

    node_test(test_config(), |channel| async move {
        let remote = GrpcCas::new(channel);

        let digests: DigestSet = [large.clone(), small.clone()].into_iter().collect();
        assert_eq!(remote.find_missing(&digests).await.unwrap(), digests);

        remote
            .put(&large, Buffer::from_bytes(data.clone(), Repairability::UserProvided))
            .await
            .unwrap();
        let expected_missing: DigestSet = [small.clone()].into_iter().collect();
        assert_eq!(remote.find_missing(&digests).await.unwrap(), expected_missing);

        let fetched = remote.get(&large).into_bytes(data.len()).await.unwrap();
        assert_eq!(fetched, data);

        let status = tonic::Status::from(remote.get(&small).into_bytes(3).await.unwrap_err());
        assert_eq!(status.code(), tonic::Code::NotFound);
    })
    .await;
}

#[tokio::test]
async fn batch_read_total_size_overflow() {
    node_test(test_config(), |channel| async move {
        let mut client = ContentAddressableStorageClient::new(channel);
        let huge = |hash: &str| protos::re::Digest {
            hash: hash.to_string(),
            size_bytes: i64::MAX,
        };
        let status = client
            .batch_read_blobs(Request::new(BatchReadBlobsRequest {
                instance_name: "".to_string(),
                digests: vec![huge("aaaa"), huge("bbbb"), huge("cccc")],
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    })
    .await;
}
