use crate::domain::{
    errors::StorageResult,
    models::{
        DeleteObjectOutcome, ObjectAcl, ObjectDetails, ObjectSummary, PutObjectOptions,
        PutObjectOutcome,
    },
    value_objects::{BucketName, ObjectKey},
};
use async_trait::async_trait;
use std::path::Path;

/// Port for object service operations
/// Moves local files in and out of buckets and inspects stored objects
#[async_trait]
pub trait ObjectService: Send + Sync + 'static {
    /// Upload a local file under `key`
    async fn upload_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        path: &Path,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome>;

    /// Download the latest version of `key` into `path`, returning bytes written
    async fn download_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        path: &Path,
    ) -> StorageResult<u64>;

    /// Copy `key` from one bucket to another under the same key
    async fn copy_to_bucket(
        &self,
        from: &BucketName,
        to: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<PutObjectOutcome>;

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<DeleteObjectOutcome>;

    /// Check if object exists
    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool>;

    async fn object_acl(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<ObjectAcl>;

    async fn object_details(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectDetails>;

    async fn list_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectSummary>>;

    /// List the bucket and fetch full details (version id, metadata) per object
    async fn describe_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectDetails>>;
}
