//! Messages of `build.bazel.remote.execution.v2` that the node serves or
//! forwards, written out with the upstream field numbers.

use crate::semver;

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Digest {
    #[prost(string, tag = "1")]
    pub hash: String,
    #[prost(int64, tag = "2")]
    pub size_bytes: i64,
}

pub mod digest_function {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Value {
        Unknown = 0,
        Sha256 = 1,
        Sha1 = 2,
        Md5 = 3,
        Vso = 4,
        Sha384 = 5,
        Sha512 = 6,
        Murmur3 = 7,
    }
}

pub mod compressor {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Value {
        Identity = 0,
        Zstd = 1,
        Deflate = 2,
    }
}

pub mod symlink_absolute_path_strategy {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Value {
        Unknown = 0,
        Disallowed = 1,
        Allowed = 2,
    }
}

// Action Cache.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutputFile {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(message, optional, tag = "2")]
    pub digest: Option<Digest>,
    #[prost(bool, tag = "4")]
    pub is_executable: bool,
    #[prost(bytes = "vec", tag = "5")]
    pub contents: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutputSymlink {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(string, tag = "2")]
    pub target: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutputDirectory {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(message, optional, tag = "3")]
    pub tree_digest: Option<Digest>,
    #[prost(bool, tag = "4")]
    pub is_topologically_sorted: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutedActionMetadata {
    #[prost(string, tag = "1")]
    pub worker: String,
    #[prost(message, optional, tag = "2")]
    pub queued_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub worker_start_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "4")]
    pub worker_completed_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub input_fetch_start_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub input_fetch_completed_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub execution_start_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub execution_completed_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "9")]
    pub output_upload_start_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "10")]
    pub output_upload_completed_timestamp: Option<::prost_types::Timestamp>,
    #[prost(message, repeated, tag = "11")]
    pub auxiliary_metadata: Vec<::prost_types::Any>,
    #[prost(message, optional, tag = "12")]
    pub virtual_execution_duration: Option<::prost_types::Duration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionResult {
    #[prost(message, repeated, tag = "2")]
    pub output_files: Vec<OutputFile>,
    #[prost(message, repeated, tag = "10")]
    pub output_file_symlinks: Vec<OutputSymlink>,
    #[prost(message, repeated, tag = "12")]
    pub output_symlinks: Vec<OutputSymlink>,
    #[prost(message, repeated, tag = "3")]
    pub output_directories: Vec<OutputDirectory>,
    #[prost(message, repeated, tag = "11")]
    pub output_directory_symlinks: Vec<OutputSymlink>,
    #[prost(int32, tag = "4")]
    pub exit_code: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub stdout_raw: Vec<u8>,
    #[prost(message, optional, tag = "6")]
    pub stdout_digest: Option<Digest>,
    #[prost(bytes = "vec", tag = "7")]
    pub stderr_raw: Vec<u8>,
    #[prost(message, optional, tag = "8")]
    pub stderr_digest: Option<Digest>,
    #[prost(message, optional, tag = "9")]
    pub execution_metadata: Option<ExecutedActionMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActionResultRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, optional, tag = "2")]
    pub action_digest: Option<Digest>,
    #[prost(bool, tag = "3")]
    pub inline_stdout: bool,
    #[prost(bool, tag = "4")]
    pub inline_stderr: bool,
    #[prost(string, repeated, tag = "5")]
    pub inline_output_files: Vec<String>,
    #[prost(enumeration = "digest_function::Value", tag = "6")]
    pub digest_function: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultsCachePolicy {
    #[prost(int32, tag = "1")]
    pub priority: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionPolicy {
    #[prost(int32, tag = "1")]
    pub priority: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateActionResultRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, optional, tag = "2")]
    pub action_digest: Option<Digest>,
    #[prost(message, optional, tag = "3")]
    pub action_result: Option<ActionResult>,
    #[prost(message, optional, tag = "4")]
    pub results_cache_policy: Option<ResultsCachePolicy>,
    #[prost(enumeration = "digest_function::Value", tag = "5")]
    pub digest_function: i32,
}

// Content Addressable Storage.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindMissingBlobsRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, repeated, tag = "2")]
    pub blob_digests: Vec<Digest>,
    #[prost(enumeration = "digest_function::Value", tag = "3")]
    pub digest_function: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindMissingBlobsResponse {
    #[prost(message, repeated, tag = "2")]
    pub missing_blob_digests: Vec<Digest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchUpdateBlobsRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, repeated, tag = "2")]
    pub requests: Vec<batch_update_blobs_request::Request>,
    #[prost(enumeration = "digest_function::Value", tag = "5")]
    pub digest_function: i32,
}

pub mod batch_update_blobs_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Request {
        #[prost(message, optional, tag = "1")]
        pub digest: Option<super::Digest>,
        #[prost(bytes = "vec", tag = "2")]
        pub data: Vec<u8>,
        #[prost(enumeration = "super::compressor::Value", tag = "3")]
        pub compressor: i32,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchUpdateBlobsResponse {
    #[prost(message, repeated, tag = "1")]
    pub responses: Vec<batch_update_blobs_response::Response>,
}

pub mod batch_update_blobs_response {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Response {
        #[prost(message, optional, tag = "1")]
        pub digest: Option<super::Digest>,
        #[prost(message, optional, tag = "2")]
        pub status: Option<crate::rpc::Status>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchReadBlobsRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, repeated, tag = "2")]
    pub digests: Vec<Digest>,
    #[prost(enumeration = "compressor::Value", repeated, tag = "3")]
    pub acceptable_compressors: Vec<i32>,
    #[prost(enumeration = "digest_function::Value", tag = "4")]
    pub digest_function: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchReadBlobsResponse {
    #[prost(message, repeated, tag = "1")]
    pub responses: Vec<batch_read_blobs_response::Response>,
}

pub mod batch_read_blobs_response {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Response {
        #[prost(message, optional, tag = "1")]
        pub digest: Option<super::Digest>,
        #[prost(bytes = "vec", tag = "2")]
        pub data: Vec<u8>,
        #[prost(enumeration = "super::compressor::Value", tag = "4")]
        pub compressor: i32,
        #[prost(message, optional, tag = "3")]
        pub status: Option<crate::rpc::Status>,
    }
}

// Execution.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(bool, tag = "3")]
    pub skip_cache_lookup: bool,
    #[prost(message, optional, tag = "6")]
    pub action_digest: Option<Digest>,
    #[prost(message, optional, tag = "7")]
    pub execution_policy: Option<ExecutionPolicy>,
    #[prost(message, optional, tag = "8")]
    pub results_cache_policy: Option<ResultsCachePolicy>,
    #[prost(enumeration = "digest_function::Value", tag = "9")]
    pub digest_function: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WaitExecutionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

// Capabilities.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetCapabilitiesRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerCapabilities {
    #[prost(message, optional, tag = "1")]
    pub cache_capabilities: Option<CacheCapabilities>,
    #[prost(message, optional, tag = "2")]
    pub execution_capabilities: Option<ExecutionCapabilities>,
    #[prost(message, optional, tag = "3")]
    pub deprecated_api_version: Option<semver::SemVer>,
    #[prost(message, optional, tag = "4")]
    pub low_api_version: Option<semver::SemVer>,
    #[prost(message, optional, tag = "5")]
    pub high_api_version: Option<semver::SemVer>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionCacheUpdateCapabilities {
    #[prost(bool, tag = "1")]
    pub update_enabled: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PriorityCapabilities {
    #[prost(message, repeated, tag = "1")]
    pub priorities: Vec<priority_capabilities::PriorityRange>,
}

pub mod priority_capabilities {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PriorityRange {
        #[prost(int32, tag = "1")]
        pub min_priority: i32,
        #[prost(int32, tag = "2")]
        pub max_priority: i32,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CacheCapabilities {
    #[prost(enumeration = "digest_function::Value", repeated, tag = "1")]
    pub digest_functions: Vec<i32>,
    #[prost(message, optional, tag = "2")]
    pub action_cache_update_capabilities: Option<ActionCacheUpdateCapabilities>,
    #[prost(message, optional, tag = "3")]
    pub cache_priority_capabilities: Option<PriorityCapabilities>,
    #[prost(int64, tag = "4")]
    pub max_batch_total_size_bytes: i64,
    #[prost(enumeration = "symlink_absolute_path_strategy::Value", tag = "5")]
    pub symlink_absolute_path_strategy: i32,
    #[prost(enumeration = "compressor::Value", repeated, tag = "6")]
    pub supported_compressors: Vec<i32>,
    #[prost(enumeration = "compressor::Value", repeated, tag = "7")]
    pub supported_batch_update_compressors: Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionCapabilities {
    #[prost(enumeration = "digest_function::Value", tag = "1")]
    pub digest_function: i32,
    #[prost(bool, tag = "2")]
    pub exec_enabled: bool,
    #[prost(message, optional, tag = "3")]
    pub execution_priority_capabilities: Option<PriorityCapabilities>,
    #[prost(string, repeated, tag = "4")]
    pub supported_node_properties: Vec<String>,
    #[prost(enumeration = "digest_function::Value", repeated, tag = "5")]
    pub digest_functions: Vec<i32>,
}

include!(concat!(env!("OUT_DIR"), "/build.bazel.remote.execution.v2.ActionCache.rs"));
include!(concat!(env!("OUT_DIR"), "/build.bazel.remote.execution.v2.Capabilities.rs"));
include!(concat!(
    env!("OUT_DIR"),
    "/build.bazel.remote.execution.v2.ContentAddressableStorage.rs"
));
include!(concat!(env!("OUT_DIR"), "/build.bazel.remote.execution.v2.Execution.rs"));
