pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{BucketCleanup, BucketService, CleanupReport, ObjectService};
pub use storage::{BucketStore, ObjectStore, MAX_DELETE_BATCH};
