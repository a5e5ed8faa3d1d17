mod bucket_store;
mod object_store;

pub use bucket_store::{BucketStore, MAX_DELETE_BATCH};
pub use object_store::ObjectStore;
