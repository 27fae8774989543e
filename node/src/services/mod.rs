//! Service the gRPC Remote Build Execution API

mod action_cache;
pub use action_cache::ActionCacheService;

mod build_queue;
pub use build_queue::BuildQueueService;

mod bytestream;
pub use bytestream::BytestreamService;

mod content_storage;
pub use content_storage::ContentStorageService;

mod icas;
pub use icas::IcasService;

/// Converts the outcome of one item of a batch call into the status that is
/// reported for that item.
fn item_status(result: Result<(), tonic::Status>) -> protos::rpc::Status {
    match result {
        Ok(()) => protos::rpc::Status::default(),
        Err(status) => status.into(),
    }
}
