use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{
            DeleteObjectOutcome, ObjectAcl, ObjectDetails, ObjectSummary, PutObjectOptions,
            PutObjectOutcome,
        },
        value_objects::{BucketName, ObjectKey},
    },
    ports::{services::ObjectService, storage::ObjectStore},
};

/// Implementation of ObjectService for moving files in and out of buckets
#[derive(Clone)]
pub struct ObjectServiceImpl {
    store: Arc<dyn ObjectStore>,
}

impl ObjectServiceImpl {
    /// Create a new ObjectServiceImpl instance
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ObjectService for ObjectServiceImpl {
    async fn upload_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        path: &Path,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::local_file(path, e))?;
        let size = data.len();

        let outcome = self
            .store
            .put_object(bucket, key, Bytes::from(data), options)
            .await?;

        info!(
            bucket = %bucket,
            key = %key,
            size,
            version_id = ?outcome.version_id,
            "Uploaded file"
        );
        Ok(outcome)
    }

    async fn download_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        path: &Path,
    ) -> StorageResult<u64> {
        let data = self.store.get_object(bucket, key, None).await?;

        tokio::fs::write(path, &data)
            .await
            .map_err(|e| StorageError::local_file(path, e))?;

        info!(bucket = %bucket, key = %key, path = %path.display(), "Downloaded object");
        Ok(data.len() as u64)
    }

    async fn copy_to_bucket(
        &self,
        from: &BucketName,
        to: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<PutObjectOutcome> {
        let outcome = self.store.copy_object(from, key, to, key).await?;
        info!(from = %from, to = %to, key = %key, "Copied object");
        Ok(outcome)
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<DeleteObjectOutcome> {
        let outcome = self.store.delete_object(bucket, key).await?;
        info!(
            bucket = %bucket,
            key = %key,
            delete_marker = outcome.delete_marker,
            "Deleted object"
        );
        Ok(outcome)
    }

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool> {
        match self.store.head_object(bucket, key).await {
            Ok(_) => Ok(true),
            Err(StorageError::ObjectNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn object_acl(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<ObjectAcl> {
        let acl = self.store.get_object_acl(bucket, key).await?;
        for grant in &acl.grants {
            debug!(key = %key, grantee = ?grant.grantee, permission = %grant.permission.as_str(), "Grant");
        }
        Ok(acl)
    }

    async fn object_details(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectDetails> {
        self.store.head_object(bucket, key).await
    }

    async fn list_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectSummary>> {
        self.store.list_objects(bucket).await
    }

    async fn describe_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectDetails>> {
        let summaries = self.store.list_objects(bucket).await?;
        let mut details = Vec::with_capacity(summaries.len());

        for summary in summaries {
            let object = self.store.head_object(bucket, &summary.key).await?;
            info!(
                bucket = %bucket,
                key = %object.key,
                storage_class = %object.storage_class,
                last_modified = ?object.last_modified,
                version_id = ?object.version_id,
                metadata = ?object.metadata,
                "Object"
            );
            details.push(object);
        }

        Ok(details)
    }
}
