use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

enum Streaming {
    None,
    Client,
    Server,
}

fn method(name: &str, route_name: &str, input: &str, output: &str, streaming: Streaming) -> Method {
    let builder = Method::builder()
        .name(name)
        .route_name(route_name)
        .input_type(input)
        .output_type(output)
        .codec_path(CODEC);
    match streaming {
        Streaming::None => builder.build(),
        Streaming::Client => builder.client_streaming().build(),
        Streaming::Server => builder.server_streaming().build(),
    }
}

fn remote_execution_services() -> Vec<Service> {
    let package = "build.bazel.remote.execution.v2";
    vec![
        Service::builder()
            .name("ActionCache")
            .package(package)
            .method(method(
                "get_action_result",
                "GetActionResult",
                "crate::re::GetActionResultRequest",
                "crate::re::ActionResult",
                Streaming::None,
            ))
            .method(method(
                "update_action_result",
                "UpdateActionResult",
                "crate::re::UpdateActionResultRequest",
                "crate::re::ActionResult",
                Streaming::None,
            ))
            .build(),
        Service::builder()
            .name("Capabilities")
            .package(package)
            .method(method(
                "get_capabilities",
                "GetCapabilities",
                "crate::re::GetCapabilitiesRequest",
                "crate::re::ServerCapabilities",
                Streaming::None,
            ))
            .build(),
        // GetTree is left out; the generated router answers it with UNIMPLEMENTED.
        Service::builder()
            .name("ContentAddressableStorage")
            .package(package)
            .method(method(
                "find_missing_blobs",
                "FindMissingBlobs",
                "crate::re::FindMissingBlobsRequest",
                "crate::re::FindMissingBlobsResponse",
                Streaming::None,
            ))
            .method(method(
                "batch_update_blobs",
                "BatchUpdateBlobs",
                "crate::re::BatchUpdateBlobsRequest",
                "crate::re::BatchUpdateBlobsResponse",
                Streaming::None,
            ))
            .method(method(
                "batch_read_blobs",
                "BatchReadBlobs",
                "crate::re::BatchReadBlobsRequest",
                "crate::re::BatchReadBlobsResponse",
                Streaming::None,
            ))
            .build(),
        Service::builder()
            .name("Execution")
            .package(package)
            .method(method(
                "execute",
                "Execute",
                "crate::re::ExecuteRequest",
                "crate::longrunning::Operation",
                Streaming::Server,
            ))
            .method(method(
                "wait_execution",
                "WaitExecution",
                "crate::re::WaitExecutionRequest",
                "crate::longrunning::Operation",
                Streaming::Server,
            ))
            .build(),
    ]
}

fn bytestream_service() -> Service {
    Service::builder()
        .name("ByteStream")
        .package("google.bytestream")
        .method(method(
            "read",
            "Read",
            "crate::bytestream::ReadRequest",
            "crate::bytestream::ReadResponse",
            Streaming::Server,
        ))
        .method(method(
            "write",
            "Write",
            "crate::bytestream::WriteRequest",
            "crate::bytestream::WriteResponse",
            Streaming::Client,
        ))
        .method(method(
            "query_write_status",
            "QueryWriteStatus",
            "crate::bytestream::QueryWriteStatusRequest",
            "crate::bytestream::QueryWriteStatusResponse",
            Streaming::None,
        ))
        .build()
}

fn icas_service() -> Service {
    Service::builder()
        .name("IndirectContentAddressableStorage")
        .package("buildbarn.icas")
        .method(method(
            "find_missing_references",
            "FindMissingReferences",
            "crate::re::FindMissingBlobsRequest",
            "crate::re::FindMissingBlobsResponse",
            Streaming::None,
        ))
        .method(method(
            "batch_update_references",
            "BatchUpdateReferences",
            "crate::icas::BatchUpdateReferencesRequest",
            "crate::re::BatchUpdateBlobsResponse",
            Streaming::None,
        ))
        .method(method(
            "get_reference",
            "GetReference",
            "crate::icas::GetReferenceRequest",
            "crate::icas::Reference",
            Streaming::None,
        ))
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let mut services = remote_execution_services();
    services.push(bytestream_service());
    services.push(icas_service());
    Builder::new().compile(&services);
    Ok(())
}
