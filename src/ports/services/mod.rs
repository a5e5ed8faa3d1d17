mod bucket_service;
mod object_service;

pub use bucket_service::{BucketCleanup, BucketService, CleanupReport};
pub use object_service::ObjectService;
