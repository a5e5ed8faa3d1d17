use crate::domain::{
    errors::StorageResult,
    models::{
        DeleteObjectOutcome, ObjectAcl, ObjectDetails, ObjectSummary, PutObjectOptions,
        PutObjectOutcome,
    },
    value_objects::{BucketName, ObjectKey, VersionId},
};
use async_trait::async_trait;
use bytes::Bytes;

/// Port for object-level storage operations.
/// This abstracts the storage service (S3, an S3-compatible service, or an emulation).
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store object data, creating a new version on versioned buckets
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome>;

    /// Retrieve the latest version, or the given one
    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> StorageResult<Bytes>;

    /// Fetch object attributes without the body
    async fn head_object(&self, bucket: &BucketName, key: &ObjectKey)
        -> StorageResult<ObjectDetails>;

    /// Server-side copy of the latest version
    async fn copy_object(
        &self,
        source_bucket: &BucketName,
        source_key: &ObjectKey,
        destination_bucket: &BucketName,
        destination_key: &ObjectKey,
    ) -> StorageResult<PutObjectOutcome>;

    /// Delete an object; writes a delete marker on versioned buckets
    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<DeleteObjectOutcome>;

    /// Read the access control list of an object
    async fn get_object_acl(&self, bucket: &BucketName, key: &ObjectKey)
        -> StorageResult<ObjectAcl>;

    /// List current (non-deleted) objects in a bucket
    async fn list_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectSummary>>;
}
