use crate::domain::{
    errors::StorageResult,
    models::{BucketSummary, CreatedBucket, ObjectVersion, PurgeSummary, VersioningStatus},
    value_objects::BucketName,
};
use async_trait::async_trait;
use serde::Serialize;

/// Service port for bucket management
#[async_trait]
pub trait BucketService: Send + Sync + 'static {
    /// Create a bucket whose name is `prefix` followed by a random UUID
    async fn create_bucket(&self, prefix: &str) -> StorageResult<CreatedBucket>;

    /// Enable versioning and return the status read back from the service
    async fn enable_versioning(&self, bucket: &BucketName) -> StorageResult<VersioningStatus>;

    async fn versioning_status(&self, bucket: &BucketName) -> StorageResult<VersioningStatus>;

    async fn list_buckets(&self) -> StorageResult<Vec<BucketSummary>>;

    async fn list_object_versions(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectVersion>>;

    /// Delete every object version and delete marker in the bucket
    async fn delete_all_objects(&self, bucket: &BucketName) -> StorageResult<PurgeSummary>;

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()>;

    /// Empty and delete each bucket. Failures are logged and recorded; the
    /// loop always moves on to the next bucket.
    async fn cleanup(&self, buckets: &[BucketName]) -> CleanupReport;
}

/// Outcome of cleaning up one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCleanup {
    pub bucket: BucketName,
    pub purge: Option<PurgeSummary>,
    pub purge_error: Option<String>,
    pub deleted: bool,
    pub delete_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub buckets: Vec<BucketCleanup>,
}

impl CleanupReport {
    pub fn all_deleted(&self) -> bool {
        self.buckets.iter().all(|b| b.deleted)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BucketCleanup> {
        self.buckets.iter().filter(|b| !b.deleted)
    }
}
