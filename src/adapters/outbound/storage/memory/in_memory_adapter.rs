use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::{
    memory::InMemory, path::Path as ObjectPath, ObjectStore as ApacheObjectStore, PutPayload,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::{
    adapters::outbound::storage::error::StoreError,
    domain::{
        errors::{StorageError, StorageResult},
        models::{
            BucketSummary, CannedAcl, CreateBucketOptions, DeleteObjectOutcome,
            DeleteObjectsOutcome, DeletedObject, ObjectAcl, ObjectDetails, ObjectIdentifier,
            ObjectOwnership, ObjectSummary, ObjectVersion, Owner, PutObjectOptions, PutObjectOutcome,
            ServerSideEncryption, StorageClass, VersioningStatus,
        },
        value_objects::{BucketName, ObjectKey, VersionId},
    },
    ports::storage::{BucketStore, ObjectStore, MAX_DELETE_BATCH},
};

/// Metadata about a single stored version or delete marker
#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: VersionId,
    is_delete_marker: bool,
    size: u64,
    etag: Option<String>,
    last_modified: DateTime<Utc>,
    content_type: Option<String>,
    metadata: HashMap<String, String>,
    server_side_encryption: Option<ServerSideEncryption>,
    storage_class: StorageClass,
    acl: CannedAcl,
}

#[derive(Debug)]
struct BucketState {
    created_at: DateTime<Utc>,
    ownership: ObjectOwnership,
    versioning: VersioningStatus,
    /// Key -> versions ordered oldest first
    objects: BTreeMap<ObjectKey, Vec<StoredVersion>>,
}

impl BucketState {
    fn latest(&self, key: &ObjectKey) -> Option<&StoredVersion> {
        self.objects
            .get(key)
            .and_then(|versions| versions.last())
            .filter(|version| !version.is_delete_marker)
    }

    fn version_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    /// Remove one version, returning it when it existed
    fn remove_version(&mut self, key: &ObjectKey, version_id: &VersionId) -> Option<StoredVersion> {
        let versions = self.objects.get_mut(key)?;
        let position = versions.iter().position(|v| &v.version_id == version_id)?;
        let removed = versions.remove(position);
        if versions.is_empty() {
            self.objects.remove(key);
        }
        Some(removed)
    }

    /// Append a version, replacing the existing `null` version if the new one is `null`
    fn push_version(&mut self, key: &ObjectKey, version: StoredVersion) -> Option<StoredVersion> {
        let replaced = if version.version_id.is_null() {
            self.remove_version(key, &version.version_id)
        } else {
            None
        };
        self.objects.entry(key.clone()).or_default().push(version);
        replaced
    }
}

/// S3 emulation backed by an in-memory object store.
///
/// Versioned bodies are stored under `<bucket>/<key>.v_<version id>`.
#[derive(Clone)]
pub struct InMemoryStorageAdapter {
    store: Arc<InMemory>,
    buckets: Arc<RwLock<HashMap<BucketName, BucketState>>>,
    owner: Owner,
}

impl std::fmt::Debug for InMemoryStorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InMemoryStorageAdapter")
    }
}

impl Default for InMemoryStorageAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorageAdapter {
    pub fn new() -> Self {
        Self::with_owner(Owner {
            id: "in-memory-owner".to_string(),
            display_name: Some("in-memory".to_string()),
        })
    }

    /// Create an emulation whose buckets and objects belong to `owner`
    pub fn with_owner(owner: Owner) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            buckets: Arc::new(RwLock::new(HashMap::new())),
            owner,
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<BucketName, BucketState>>> {
        self.buckets
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()).into())
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<BucketName, BucketState>>> {
        self.buckets
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()).into())
    }

    fn versioned_path(bucket: &BucketName, key: &ObjectKey, version_id: &VersionId) -> ObjectPath {
        ObjectPath::from(format!("{}/{}.v_{}", bucket, key, version_id))
    }

    fn etag(data: &[u8]) -> String {
        format!("\"{:x}\"", md5::compute(data))
    }

    fn bucket_not_found(bucket: &BucketName) -> StorageError {
        StorageError::BucketNotFound {
            bucket: bucket.clone(),
        }
    }

    fn object_not_found(bucket: &BucketName, key: &ObjectKey) -> StorageError {
        StorageError::ObjectNotFound {
            bucket: bucket.clone(),
            key: key.clone(),
        }
    }

    async fn remove_body(&self, bucket: &BucketName, key: &ObjectKey, version: &StoredVersion) {
        if version.is_delete_marker {
            return;
        }
        let path = Self::versioned_path(bucket, key, &version.version_id);
        if let Err(e) = self.store.delete(&path).await {
            debug!(path = %path, error = %e, "Stored body already gone");
        }
    }

    /// Shared write path of put and copy
    async fn store_version(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome> {
        let versioning = {
            let buckets = self.read()?;
            let state = buckets
                .get(bucket)
                .ok_or_else(|| Self::bucket_not_found(bucket))?;

            if let Some(acl) = options.acl {
                if !state.ownership.allows_acls() && acl != CannedAcl::BucketOwnerFullControl {
                    return Err(StorageError::StorageBackendError {
                        operation: "put_object".to_string(),
                        code: Some("AccessControlListNotSupported".to_string()),
                        message: format!("The bucket {} does not allow ACLs", bucket),
                    });
                }
            }
            state.versioning
        };

        let version_id = if versioning.is_enabled() {
            VersionId::generate()
        } else {
            VersionId::null()
        };

        let etag = Self::etag(&data);
        let size = data.len() as u64;
        let path = Self::versioned_path(bucket, key, &version_id);
        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(StoreError::from)?;

        // Buckets encrypt by default
        let server_side_encryption = Some(
            options
                .server_side_encryption
                .unwrap_or(ServerSideEncryption::Aes256),
        );

        let version = StoredVersion {
            version_id: version_id.clone(),
            is_delete_marker: false,
            size,
            etag: Some(etag.clone()),
            last_modified: Utc::now(),
            content_type: options.content_type.clone(),
            metadata: options.metadata.clone(),
            server_side_encryption,
            storage_class: options.storage_class.clone().unwrap_or_default(),
            acl: options.acl.unwrap_or(CannedAcl::Private),
        };

        {
            let mut buckets = self.write()?;
            let state = buckets
                .get_mut(bucket)
                .ok_or_else(|| Self::bucket_not_found(bucket))?;
            // A replaced null version shared its path with the body just written
            let _ = state.push_version(key, version);
        }

        debug!(bucket = %bucket, key = %key, version_id = %version_id, size, "Stored object");

        Ok(PutObjectOutcome {
            bucket: bucket.clone(),
            key: key.clone(),
            etag: Some(etag),
            version_id: versioning.is_enabled().then_some(version_id),
            server_side_encryption,
        })
    }

    /// Delete without a version id: remove the `null` version or add a delete marker
    fn delete_current(
        state: &mut BucketState,
        key: &ObjectKey,
    ) -> (DeleteObjectOutcome, Option<StoredVersion>) {
        match state.versioning {
            VersioningStatus::Unversioned => {
                let removed = state.remove_version(key, &VersionId::null());
                (
                    DeleteObjectOutcome {
                        delete_marker: false,
                        version_id: None,
                    },
                    removed,
                )
            }
            status => {
                let marker_id = if status.is_enabled() {
                    VersionId::generate()
                } else {
                    VersionId::null()
                };
                let marker = StoredVersion {
                    version_id: marker_id.clone(),
                    is_delete_marker: true,
                    size: 0,
                    etag: None,
                    last_modified: Utc::now(),
                    content_type: None,
                    metadata: HashMap::new(),
                    server_side_encryption: None,
                    storage_class: StorageClass::Standard,
                    acl: CannedAcl::Private,
                };
                let replaced = state.push_version(key, marker);
                (
                    DeleteObjectOutcome {
                        delete_marker: true,
                        version_id: Some(marker_id),
                    },
                    replaced,
                )
            }
        }
    }
}

#[async_trait]
impl BucketStore for InMemoryStorageAdapter {
    async fn create_bucket(
        &self,
        bucket: &BucketName,
        region: &str,
        options: &CreateBucketOptions,
    ) -> StorageResult<()> {
        let mut buckets = self.write()?;
        if buckets.contains_key(bucket) {
            return Err(StorageError::BucketAlreadyExists {
                bucket: bucket.clone(),
            });
        }

        buckets.insert(
            bucket.clone(),
            BucketState {
                created_at: Utc::now(),
                ownership: options
                    .object_ownership
                    .unwrap_or(ObjectOwnership::BucketOwnerEnforced),
                versioning: VersioningStatus::Unversioned,
                objects: BTreeMap::new(),
            },
        );

        debug!(bucket = %bucket, region, "Created in-memory bucket");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        let mut buckets = self.write()?;
        let state = buckets
            .get(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        if state.version_count() > 0 {
            return Err(StorageError::BucketNotEmpty {
                bucket: bucket.clone(),
            });
        }

        buckets.remove(bucket);
        Ok(())
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketSummary>> {
        let buckets = self.read()?;
        let mut summaries: Vec<BucketSummary> = buckets
            .iter()
            .map(|(name, state)| BucketSummary {
                name: name.to_string(),
                created_at: Some(state.created_at),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &BucketName,
        status: VersioningStatus,
    ) -> StorageResult<()> {
        if status == VersioningStatus::Unversioned {
            return Err(StorageError::UnsupportedOperation {
                operation: "put_bucket_versioning".to_string(),
                reason: "versioning can only be enabled or suspended".to_string(),
            });
        }

        let mut buckets = self.write()?;
        let state = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;
        state.versioning = status;
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &BucketName) -> StorageResult<VersioningStatus> {
        let buckets = self.read()?;
        buckets
            .get(bucket)
            .map(|state| state.versioning)
            .ok_or_else(|| Self::bucket_not_found(bucket))
    }

    async fn list_object_versions(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectVersion>> {
        let buckets = self.read()?;
        let state = buckets
            .get(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        let mut listing = Vec::with_capacity(state.version_count());
        for (key, versions) in &state.objects {
            // Newest first, as S3 lists them
            for (index, version) in versions.iter().rev().enumerate() {
                listing.push(ObjectVersion {
                    key: key.clone(),
                    version_id: version.version_id.clone(),
                    is_latest: index == 0,
                    is_delete_marker: version.is_delete_marker,
                    size: version.size,
                    last_modified: Some(version.last_modified),
                });
            }
        }

        Ok(listing)
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        objects: &[ObjectIdentifier],
    ) -> StorageResult<DeleteObjectsOutcome> {
        if objects.len() > MAX_DELETE_BATCH {
            return Err(StorageError::ValidationError {
                message: format!(
                    "batch delete of {} entries exceeds the limit of {}",
                    objects.len(),
                    MAX_DELETE_BATCH
                ),
            });
        }

        let mut outcome = DeleteObjectsOutcome::default();
        let mut removed = Vec::new();
        {
            let mut buckets = self.write()?;
            let state = buckets
                .get_mut(bucket)
                .ok_or_else(|| Self::bucket_not_found(bucket))?;

            for object in objects {
                match &object.version_id {
                    Some(version_id) => {
                        if let Some(version) = state.remove_version(&object.key, version_id) {
                            removed.push((object.key.clone(), version));
                        }
                    }
                    None => {
                        let (_, replaced) = Self::delete_current(state, &object.key);
                        if let Some(version) = replaced {
                            removed.push((object.key.clone(), version));
                        }
                    }
                }
                // Deleting a missing key or version is reported as a success
                outcome.deleted.push(DeletedObject::from(object));
            }
        }

        for (key, version) in &removed {
            self.remove_body(bucket, key, version).await;
        }

        Ok(outcome)
    }
}

#[async_trait]
impl ObjectStore for InMemoryStorageAdapter {
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome> {
        self.store_version(bucket, key, data, options).await
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> StorageResult<Bytes> {
        let version_id = {
            let buckets = self.read()?;
            let state = buckets
                .get(bucket)
                .ok_or_else(|| Self::bucket_not_found(bucket))?;

            match version_id {
                Some(version_id) => {
                    let version = state
                        .objects
                        .get(key)
                        .and_then(|versions| versions.iter().find(|v| &v.version_id == version_id))
                        .filter(|v| !v.is_delete_marker)
                        .ok_or_else(|| StorageError::VersionNotFound {
                            bucket: bucket.clone(),
                            key: key.clone(),
                            version_id: version_id.clone(),
                        })?;
                    version.version_id.clone()
                }
                None => state
                    .latest(key)
                    .map(|v| v.version_id.clone())
                    .ok_or_else(|| Self::object_not_found(bucket, key))?,
            }
        };

        let path = Self::versioned_path(bucket, key, &version_id);
        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => Self::object_not_found(bucket, key),
            other => StoreError::from(other).into(),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| StoreError::from(e).into())
    }

    async fn head_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectDetails> {
        let buckets = self.read()?;
        let state = buckets
            .get(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;
        let version = state
            .latest(key)
            .ok_or_else(|| Self::object_not_found(bucket, key))?;

        Ok(ObjectDetails {
            bucket: bucket.clone(),
            key: key.clone(),
            size: version.size,
            etag: version.etag.clone(),
            last_modified: Some(version.last_modified),
            content_type: version.content_type.clone(),
            // S3 sends no version header until versioning has been configured
            version_id: (state.versioning != VersioningStatus::Unversioned)
                .then(|| version.version_id.clone()),
            server_side_encryption: version.server_side_encryption,
            storage_class: version.storage_class.clone(),
            metadata: version.metadata.clone(),
        })
    }

    async fn copy_object(
        &self,
        source_bucket: &BucketName,
        source_key: &ObjectKey,
        destination_bucket: &BucketName,
        destination_key: &ObjectKey,
    ) -> StorageResult<PutObjectOutcome> {
        let source = self.head_object(source_bucket, source_key).await?;
        let data = self.get_object(source_bucket, source_key, None).await?;

        // Copies keep content type and user metadata; class and ACL reset to defaults
        let options = PutObjectOptions {
            content_type: source.content_type,
            metadata: source.metadata,
            ..Default::default()
        };

        self.store_version(destination_bucket, destination_key, data, &options)
            .await
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<DeleteObjectOutcome> {
        let (outcome, removed) = {
            let mut buckets = self.write()?;
            let state = buckets
                .get_mut(bucket)
                .ok_or_else(|| Self::bucket_not_found(bucket))?;
            Self::delete_current(state, key)
        };

        if let Some(version) = removed {
            self.remove_body(bucket, key, &version).await;
        }

        Ok(outcome)
    }

    async fn get_object_acl(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectAcl> {
        let buckets = self.read()?;
        let state = buckets
            .get(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;
        let version = state
            .latest(key)
            .ok_or_else(|| Self::object_not_found(bucket, key))?;

        Ok(ObjectAcl {
            owner: Some(self.owner.clone()),
            grants: version.acl.grants(&self.owner),
        })
    }

    async fn list_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectSummary>> {
        let buckets = self.read()?;
        let state = buckets
            .get(bucket)
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        Ok(state
            .objects
            .keys()
            .filter_map(|key| {
                state.latest(key).map(|version| ObjectSummary {
                    key: key.clone(),
                    size: version.size,
                    etag: version.etag.clone(),
                    last_modified: Some(version.last_modified),
                    storage_class: version.storage_class.clone(),
                })
            })
            .collect())
    }
}
