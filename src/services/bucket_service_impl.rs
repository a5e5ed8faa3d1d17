use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::StorageResult,
        models::{
            BucketSummary, CreateBucketOptions, CreatedBucket, ObjectIdentifier, ObjectVersion,
            PurgeSummary, VersioningStatus,
        },
        value_objects::BucketName,
    },
    ports::{
        services::{BucketCleanup, BucketService, CleanupReport},
        storage::{BucketStore, MAX_DELETE_BATCH},
    },
};

/// Implementation of BucketService on top of a BucketStore
#[derive(Clone)]
pub struct BucketServiceImpl {
    store: Arc<dyn BucketStore>,
    region: String,
    create_options: CreateBucketOptions,
}

impl BucketServiceImpl {
    /// Create a service that places new buckets in `region`
    pub fn new(store: Arc<dyn BucketStore>, region: impl Into<String>) -> Self {
        Self {
            store,
            region: region.into(),
            create_options: CreateBucketOptions::default(),
        }
    }

    /// Options applied to every bucket this service creates
    pub fn with_create_options(mut self, options: CreateBucketOptions) -> Self {
        self.create_options = options;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    async fn cleanup_one(&self, bucket: &BucketName) -> BucketCleanup {
        info!(bucket = %bucket, "Cleaning up bucket");

        let mut entry = BucketCleanup {
            bucket: bucket.clone(),
            purge: None,
            purge_error: None,
            deleted: false,
            delete_error: None,
        };

        match self.delete_all_objects(bucket).await {
            Ok(summary) => entry.purge = Some(summary),
            Err(e) => {
                warn!(bucket = %bucket, error = %e, "Failed to delete objects");
                entry.purge_error = Some(e.to_string());
            }
        }

        match self.delete_bucket(bucket).await {
            Ok(()) => entry.deleted = true,
            Err(e) => {
                warn!(bucket = %bucket, error = %e, "Failed to delete bucket");
                entry.delete_error = Some(e.to_string());
            }
        }

        entry
    }
}

#[async_trait]
impl BucketService for BucketServiceImpl {
    async fn create_bucket(&self, prefix: &str) -> StorageResult<CreatedBucket> {
        let name = BucketName::generate(prefix)?;

        self.store
            .create_bucket(&name, &self.region, &self.create_options)
            .await?;

        info!(bucket = %name, region = %self.region, "Created bucket");

        Ok(CreatedBucket {
            name,
            region: self.region.clone(),
        })
    }

    async fn enable_versioning(&self, bucket: &BucketName) -> StorageResult<VersioningStatus> {
        self.store
            .put_bucket_versioning(bucket, VersioningStatus::Enabled)
            .await?;

        let status = self.store.get_bucket_versioning(bucket).await?;
        info!(bucket = %bucket, status = %status, "Versioning configured");
        Ok(status)
    }

    async fn versioning_status(&self, bucket: &BucketName) -> StorageResult<VersioningStatus> {
        self.store.get_bucket_versioning(bucket).await
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketSummary>> {
        let buckets = self.store.list_buckets().await?;
        for bucket in &buckets {
            info!(bucket = %bucket.name, "Bucket");
        }
        Ok(buckets)
    }

    async fn list_object_versions(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectVersion>> {
        self.store.list_object_versions(bucket).await
    }

    async fn delete_all_objects(&self, bucket: &BucketName) -> StorageResult<PurgeSummary> {
        let versions = self.store.list_object_versions(bucket).await?;
        let mut summary = PurgeSummary {
            listed: versions.len(),
            ..Default::default()
        };

        if versions.is_empty() {
            debug!(bucket = %bucket, "Bucket holds no versions");
            return Ok(summary);
        }

        for version in &versions {
            info!(
                bucket = %bucket,
                key = %version.key,
                version_id = %version.version_id,
                delete_marker = version.is_delete_marker,
                "Deleting object version"
            );
        }

        let identifiers: Vec<ObjectIdentifier> =
            versions.iter().map(ObjectVersion::identifier).collect();

        for batch in identifiers.chunks(MAX_DELETE_BATCH) {
            let outcome = self.store.delete_objects(bucket, batch).await?;
            summary.batches += 1;
            summary.deleted += outcome.deleted.len();
            summary.failed += outcome.errors.len();

            for error in &outcome.errors {
                warn!(
                    bucket = %bucket,
                    key = ?error.key,
                    version_id = ?error.version_id,
                    code = ?error.code,
                    message = ?error.message,
                    "Version was not deleted"
                );
            }
        }

        info!(
            bucket = %bucket,
            deleted = summary.deleted,
            failed = summary.failed,
            "Deleted object versions"
        );
        Ok(summary)
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        self.store.delete_bucket(bucket).await?;
        info!(bucket = %bucket, "Deleted bucket");
        Ok(())
    }

    async fn cleanup(&self, buckets: &[BucketName]) -> CleanupReport {
        let mut report = CleanupReport::default();
        for bucket in buckets {
            report.buckets.push(self.cleanup_one(bucket).await);
        }
        report
    }
}
