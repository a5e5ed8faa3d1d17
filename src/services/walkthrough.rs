//! Scripted tour of the bucket and object API
//!
//! Runs every step in sequence against whatever backend the services wrap,
//! collecting what each step observed into a [`WalkthroughReport`].

use bon::Builder;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    adapters::outbound::local_file::{create_temp_file, TempFile},
    domain::{
        errors::{StorageError, StorageResult},
        models::{
            BucketSummary, CannedAcl, ObjectAcl, ObjectDetails, PutObjectOptions,
            ServerSideEncryption, StorageClass, VersioningStatus,
        },
        value_objects::{BucketName, ObjectKey, VersionId},
    },
    ports::services::{BucketService, CleanupReport, ObjectService},
};

/// Which buckets the final cleanup step removes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupScope {
    /// Only the two buckets this run created
    #[default]
    Created,
    /// Every bucket in the account whose name starts with one of the configured prefixes
    Prefixed,
}

impl std::str::FromStr for CleanupScope {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(CleanupScope::Created),
            "prefixed" => Ok(CleanupScope::Prefixed),
            other => Err(StorageError::ValidationError {
                message: format!("unknown cleanup scope: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct WalkthroughConfig {
    #[builder(into, default = "firstbucket-".to_string())]
    pub first_bucket_prefix: String,
    #[builder(into, default = "secondbucket-".to_string())]
    pub second_bucket_prefix: String,

    #[builder(default = 300)]
    pub first_file_size: usize,
    #[builder(default = 400)]
    pub second_file_size: usize,
    #[builder(default = 300)]
    pub third_file_size: usize,

    #[builder(into, default = "f".to_string())]
    pub first_file_content: String,
    #[builder(into, default = "s".to_string())]
    pub second_file_content: String,
    #[builder(into, default = "t".to_string())]
    pub third_file_content: String,

    #[builder(into, default = "firstfile.txt".to_string())]
    pub first_file_name: String,
    #[builder(into, default = "secondfile.txt".to_string())]
    pub second_file_name: String,
    #[builder(into, default = "thirdfile.txt".to_string())]
    pub third_file_name: String,

    #[builder(default = CannedAcl::PublicRead)]
    pub second_file_acl: CannedAcl,

    /// Where the local files are written
    #[builder(into, default = PathBuf::from("."))]
    pub work_dir: PathBuf,
    #[builder(default)]
    pub keep_files: bool,
    #[builder(default)]
    pub cleanup_scope: CleanupScope,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Presence of the first object after it was deleted from both buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionCheck {
    pub key: ObjectKey,
    pub in_first_bucket: bool,
    pub in_second_bucket: bool,
}

/// Everything the walkthrough observed, in step order
#[derive(Debug, Clone, Serialize)]
pub struct WalkthroughReport {
    pub region: String,
    pub first_bucket: BucketName,
    pub second_bucket: BucketName,
    pub downloaded_bytes: u64,
    pub after_delete: DeletionCheck,
    pub public_object: ObjectKey,
    pub public_object_acl: ObjectAcl,
    pub encrypted_object: ObjectKey,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub storage_class: StorageClass,
    pub versioning_status: VersioningStatus,
    /// Versions written to the first file's key after versioning was enabled
    pub first_file_versions: Vec<VersionId>,
    pub latest_version_id: Option<VersionId>,
    pub buckets: Vec<BucketSummary>,
    pub objects: Vec<ObjectDetails>,
    pub cleanup: CleanupReport,
}

pub struct Walkthrough {
    buckets: Arc<dyn BucketService>,
    objects: Arc<dyn ObjectService>,
    config: WalkthroughConfig,
}

impl Walkthrough {
    pub fn new(
        buckets: Arc<dyn BucketService>,
        objects: Arc<dyn ObjectService>,
        config: WalkthroughConfig,
    ) -> Self {
        Self {
            buckets,
            objects,
            config,
        }
    }

    pub fn config(&self) -> &WalkthroughConfig {
        &self.config
    }

    fn key_for(file: &TempFile) -> StorageResult<ObjectKey> {
        Ok(ObjectKey::new(file.name.as_str())?)
    }

    /// Write a local file and remember it for removal
    async fn local_file(
        &self,
        files: &mut Vec<TempFile>,
        size: usize,
        name: &str,
        content: &str,
    ) -> StorageResult<TempFile> {
        let file = create_temp_file(&self.config.work_dir, size, name, content).await?;
        files.push(file.clone());
        Ok(file)
    }

    async fn remove_files(files: &[TempFile]) {
        for file in files {
            if let Err(e) = file.remove().await {
                warn!(path = %file.path.display(), error = %e, "Failed to remove local file");
            }
        }
    }

    /// Run every step; errors before cleanup abort the run.
    ///
    /// Local files are removed whether or not the run succeeds, unless
    /// `keep_files` is set.
    pub async fn run(&self) -> StorageResult<WalkthroughReport> {
        let mut files = Vec::new();
        let result = self.run_steps(&mut files).await;

        if !self.config.keep_files {
            Self::remove_files(&files).await;
        }

        result
    }

    async fn run_steps(&self, files: &mut Vec<TempFile>) -> StorageResult<WalkthroughReport> {
        let cfg = &self.config;

        let first = self.buckets.create_bucket(&cfg.first_bucket_prefix).await?;
        let second = self.buckets.create_bucket(&cfg.second_bucket_prefix).await?;
        let (a, b) = (&first.name, &second.name);

        let first_file = self
            .local_file(
                files,
                cfg.first_file_size,
                &cfg.first_file_name,
                &cfg.first_file_content,
            )
            .await?;
        let first_key = Self::key_for(&first_file)?;

        let plain = PutObjectOptions::default();
        self.objects
            .upload_file(a, &first_key, first_file.path(), &plain)
            .await?;

        // Downloads over the local copy it was uploaded from
        let downloaded_bytes = self
            .objects
            .download_file(a, &first_key, first_file.path())
            .await?;

        self.objects.copy_to_bucket(a, b, &first_key).await?;

        self.objects.delete_object(b, &first_key).await?;
        self.objects.delete_object(a, &first_key).await?;
        let after_delete = DeletionCheck {
            key: first_key.clone(),
            in_first_bucket: self.objects.object_exists(a, &first_key).await?,
            in_second_bucket: self.objects.object_exists(b, &first_key).await?,
        };
        info!(
            key = %first_key,
            in_first_bucket = after_delete.in_first_bucket,
            in_second_bucket = after_delete.in_second_bucket,
            "Checked object after delete"
        );

        let second_file = self
            .local_file(
                files,
                cfg.second_file_size,
                &cfg.second_file_name,
                &cfg.second_file_content,
            )
            .await?;
        let second_key = Self::key_for(&second_file)?;
        self.objects
            .upload_file(
                a,
                &second_key,
                second_file.path(),
                &PutObjectOptions::default().with_acl(cfg.second_file_acl),
            )
            .await?;
        let public_object_acl = self.objects.object_acl(a, &second_key).await?;
        info!(
            key = %second_key,
            grants = public_object_acl.grants.len(),
            public_read = public_object_acl.is_public_read(),
            "Read object ACL"
        );

        let third_file = self
            .local_file(
                files,
                cfg.third_file_size,
                &cfg.third_file_name,
                &cfg.third_file_content,
            )
            .await?;
        let third_key = Self::key_for(&third_file)?;
        let encrypted =
            PutObjectOptions::default().with_server_side_encryption(ServerSideEncryption::Aes256);
        self.objects
            .upload_file(a, &third_key, third_file.path(), &encrypted)
            .await?;
        let server_side_encryption = self
            .objects
            .object_details(a, &third_key)
            .await?
            .server_side_encryption;
        info!(key = %third_key, encryption = ?server_side_encryption, "Read encryption");

        self.objects
            .upload_file(
                a,
                &third_key,
                third_file.path(),
                &encrypted.with_storage_class(StorageClass::InfrequentAccess),
            )
            .await?;
        let storage_class = self.objects.object_details(a, &third_key).await?.storage_class;
        info!(key = %third_key, storage_class = %storage_class, "Read storage class");

        let versioning_status = self.buckets.enable_versioning(a).await?;

        let mut first_file_versions = Vec::new();
        for path in [first_file.path(), third_file.path()] {
            let outcome = self.objects.upload_file(a, &first_key, path, &plain).await?;
            first_file_versions.extend(outcome.version_id);
        }
        self.objects
            .upload_file(a, &second_key, second_file.path(), &plain)
            .await?;

        let latest_version_id = self.objects.object_details(a, &first_key).await?.version_id;
        info!(key = %first_key, version_id = ?latest_version_id, "Latest version");

        let buckets = self.buckets.list_buckets().await?;
        let objects = self.objects.describe_objects(a).await?;

        let targets = self.cleanup_targets(&[a.clone(), b.clone()], &buckets);
        let cleanup = self.buckets.cleanup(&targets).await;

        Ok(WalkthroughReport {
            region: first.region,
            first_bucket: first.name,
            second_bucket: second.name,
            downloaded_bytes,
            after_delete,
            public_object: second_key,
            public_object_acl,
            encrypted_object: third_key,
            server_side_encryption,
            storage_class,
            versioning_status,
            first_file_versions,
            latest_version_id,
            buckets,
            objects,
            cleanup,
        })
    }

    fn cleanup_targets(&self, created: &[BucketName], listed: &[BucketSummary]) -> Vec<BucketName> {
        match self.config.cleanup_scope {
            CleanupScope::Created => created.to_vec(),
            CleanupScope::Prefixed => listed
                .iter()
                .filter(|bucket| {
                    bucket.name.starts_with(&self.config.first_bucket_prefix)
                        || bucket.name.starts_with(&self.config.second_bucket_prefix)
                })
                .filter_map(|bucket| BucketName::new(bucket.name.as_str()).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WalkthroughConfig::default();
        assert_eq!(config.first_bucket_prefix, "firstbucket-");
        assert_eq!(config.second_bucket_prefix, "secondbucket-");
        assert_eq!(
            (config.first_file_size, config.second_file_size, config.third_file_size),
            (300, 400, 300)
        );
        assert_eq!(config.second_file_acl, CannedAcl::PublicRead);
        assert_eq!(config.cleanup_scope, CleanupScope::Created);
        assert!(!config.keep_files);
        assert_eq!(config.work_dir, PathBuf::from("."));
    }

    #[test]
    fn test_builder_overrides() {
        let config = WalkthroughConfig::builder()
            .first_bucket_prefix("alpha-")
            .keep_files(true)
            .cleanup_scope(CleanupScope::Prefixed)
            .work_dir("/tmp/walk")
            .build();
        assert_eq!(config.first_bucket_prefix, "alpha-");
        assert_eq!(config.second_bucket_prefix, "secondbucket-");
        assert!(config.keep_files);
        assert_eq!(config.work_dir, PathBuf::from("/tmp/walk"));
    }

    #[test]
    fn test_cleanup_scope_parse() {
        assert_eq!("created".parse::<CleanupScope>().unwrap(), CleanupScope::Created);
        assert_eq!("prefixed".parse::<CleanupScope>().unwrap(), CleanupScope::Prefixed);
        assert!("all".parse::<CleanupScope>().is_err());
    }
}
