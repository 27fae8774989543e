pub use re::{
    action_cache_client::ActionCacheClient,
    action_cache_server::{ActionCache, ActionCacheServer},
    capabilities_client::CapabilitiesClient,
    capabilities_server::{Capabilities, CapabilitiesServer},
    content_addressable_storage_client::ContentAddressableStorageClient,
    content_addressable_storage_server::{
        ContentAddressableStorage, ContentAddressableStorageServer,
    },
    execution_client::ExecutionClient,
    execution_server::{Execution, ExecutionServer},
};
pub use bytestream::{
    byte_stream_client::ByteStreamClient,
    byte_stream_server::{ByteStream, ByteStreamServer},
};
pub use icas::{
    indirect_content_addressable_storage_client::IndirectContentAddressableStorageClient,
    indirect_content_addressable_storage_server::{
        IndirectContentAddressableStorage, IndirectContentAddressableStorageServer,
    },
};

pub mod bytestream;
pub mod icas;
pub mod longrunning;
pub mod re;
pub mod rpc;
pub mod semver;
