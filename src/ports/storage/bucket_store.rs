use crate::domain::{
    errors::StorageResult,
    models::{
        BucketSummary, CreateBucketOptions, DeleteObjectsOutcome, ObjectIdentifier,
        ObjectVersion, VersioningStatus,
    },
    value_objects::BucketName,
};
use async_trait::async_trait;

/// Most entries a single batch delete request may carry
pub const MAX_DELETE_BATCH: usize = 1000;

/// Port for bucket-level storage operations
#[async_trait]
pub trait BucketStore: Send + Sync + 'static {
    /// Create a bucket located in `region`
    async fn create_bucket(
        &self,
        bucket: &BucketName,
        region: &str,
        options: &CreateBucketOptions,
    ) -> StorageResult<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()>;

    /// List every bucket visible to the caller
    async fn list_buckets(&self) -> StorageResult<Vec<BucketSummary>>;

    /// Set bucket versioning to `Enabled` or `Suspended`
    async fn put_bucket_versioning(
        &self,
        bucket: &BucketName,
        status: VersioningStatus,
    ) -> StorageResult<()>;

    async fn get_bucket_versioning(&self, bucket: &BucketName) -> StorageResult<VersioningStatus>;

    /// List all versions and delete markers of every key in the bucket
    async fn list_object_versions(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectVersion>>;

    /// Delete up to [`MAX_DELETE_BATCH`] objects or versions in one request
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        objects: &[ObjectIdentifier],
    ) -> StorageResult<DeleteObjectsOutcome>;
}
