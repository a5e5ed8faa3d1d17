use async_trait::async_trait;
use aws_sdk_s3::{
    primitives::{ByteStream, DateTime as SdkDateTime},
    types::{
        BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration, Delete,
        DeletedObject as SdkDeletedObject, ObjectCannedAcl, ObjectIdentifier as SdkObjectIdentifier,
        ObjectOwnership as SdkObjectOwnership, ServerSideEncryption as SdkServerSideEncryption,
        StorageClass as SdkStorageClass, VersioningConfiguration,
    },
    Client,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    adapters::outbound::storage::error::{ErrorContext, SdkResultExt},
    domain::{
        errors::{StorageError, StorageResult},
        models::{
            BucketSummary, CreateBucketOptions, DeleteObjectError, DeleteObjectOutcome,
            DeleteObjectsOutcome, DeletedObject, Grant, Grantee, ObjectAcl, ObjectDetails, ObjectIdentifier,
            ObjectSummary, ObjectVersion, Owner, Permission, PutObjectOptions, PutObjectOutcome,
            ServerSideEncryption, StorageClass, VersioningStatus,
        },
        value_objects::{BucketName, ObjectKey, VersionId},
    },
    ports::storage::{BucketStore, ObjectStore, MAX_DELETE_BATCH},
};

/// The one region where S3 rejects an explicit location constraint
const US_EAST_1: &str = "us-east-1";

/// S3 storage adapter that implements the ObjectStore and BucketStore traits
#[derive(Clone)]
pub struct S3StorageAdapter {
    client: Client,
}

impl S3StorageAdapter {
    /// Create a new S3 adapter
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn to_chrono(dt: &SdkDateTime) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
    }

    fn size(value: Option<i64>) -> u64 {
        value.unwrap_or(0).max(0) as u64
    }

    fn version(value: Option<&str>) -> Option<VersionId> {
        value.and_then(|v| VersionId::new(v).ok())
    }

    /// Bucket configuration for `region`; none for us-east-1, which rejects a constraint
    fn bucket_configuration(region: &str) -> Option<CreateBucketConfiguration> {
        (region != US_EAST_1).then(|| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build()
        })
    }

    fn deleted_object(deleted: &SdkDeletedObject) -> DeletedObject {
        DeletedObject {
            key: deleted.key().unwrap_or_default().to_string(),
            version_id: deleted.version_id().map(str::to_string),
        }
    }

    /// A HEAD 404 does not say whether the key or the bucket is missing
    fn resolve_head_not_found(
        object_error: StorageError,
        bucket_check: StorageResult<()>,
    ) -> StorageError {
        match bucket_check {
            Err(err @ StorageError::BucketNotFound { .. }) => err,
            _ => object_error,
        }
    }

    /// CopyObject answers NoSuchBucket for either side of the copy
    fn resolve_copy_missing_bucket(
        destination_bucket: &BucketName,
        source_check: StorageResult<()>,
    ) -> StorageError {
        match source_check {
            Err(err @ StorageError::BucketNotFound { .. }) => err,
            _ => StorageError::BucketNotFound {
                bucket: destination_bucket.clone(),
            },
        }
    }

    async fn head_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::bucket("head_bucket", bucket))?;

        Ok(())
    }

    fn encryption(value: Option<&SdkServerSideEncryption>) -> Option<ServerSideEncryption> {
        value.and_then(|sse| sse.as_str().parse().ok())
    }

    /// S3 omits the storage class for STANDARD objects
    fn storage_class(value: Option<&str>) -> StorageClass {
        value.map(StorageClass::from_service).unwrap_or_default()
    }

    fn grant(grant: &aws_sdk_s3::types::Grant) -> Option<Grant> {
        let grantee = grant.grantee()?;
        let grantee = if let Some(uri) = grantee.uri() {
            Grantee::Group {
                uri: uri.to_string(),
            }
        } else if let Some(address) = grantee.email_address() {
            Grantee::Email {
                address: address.to_string(),
            }
        } else {
            Grantee::CanonicalUser {
                id: grantee.id()?.to_string(),
                display_name: grantee.display_name().map(str::to_string),
            }
        };
        let permission: Permission = grant.permission()?.as_str().parse().ok()?;

        Some(Grant {
            grantee,
            permission,
        })
    }
}

#[async_trait]
impl BucketStore for S3StorageAdapter {
    async fn create_bucket(
        &self,
        bucket: &BucketName,
        region: &str,
        options: &CreateBucketOptions,
    ) -> StorageResult<()> {
        let mut request = self
            .client
            .create_bucket()
            .bucket(bucket.as_str())
            .set_create_bucket_configuration(Self::bucket_configuration(region));

        if let Some(ownership) = options.object_ownership {
            request = request.object_ownership(SdkObjectOwnership::from(ownership.as_str()));
        }

        request
            .send()
            .await
            .map_sdk(ErrorContext::bucket("create_bucket", bucket))?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::bucket("delete_bucket", bucket))?;

        Ok(())
    }

    async fn list_buckets(&self) -> StorageResult<Vec<BucketSummary>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_sdk(ErrorContext::new("list_buckets"))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                Some(BucketSummary {
                    name: bucket.name()?.to_string(),
                    created_at: bucket.creation_date().and_then(Self::to_chrono),
                })
            })
            .collect())
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &BucketName,
        status: VersioningStatus,
    ) -> StorageResult<()> {
        let status = match status {
            VersioningStatus::Enabled => BucketVersioningStatus::Enabled,
            VersioningStatus::Suspended => BucketVersioningStatus::Suspended,
            VersioningStatus::Unversioned => {
                return Err(StorageError::UnsupportedOperation {
                    operation: "put_bucket_versioning".to_string(),
                    reason: "versioning can only be enabled or suspended".to_string(),
                })
            }
        };

        self.client
            .put_bucket_versioning()
            .bucket(bucket.as_str())
            .versioning_configuration(VersioningConfiguration::builder().status(status).build())
            .send()
            .await
            .map_sdk(ErrorContext::bucket("put_bucket_versioning", bucket))?;

        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &BucketName) -> StorageResult<VersioningStatus> {
        let output = self
            .client
            .get_bucket_versioning()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::bucket("get_bucket_versioning", bucket))?;

        Ok(match output.status() {
            Some(BucketVersioningStatus::Enabled) => VersioningStatus::Enabled,
            Some(BucketVersioningStatus::Suspended) => VersioningStatus::Suspended,
            _ => VersioningStatus::Unversioned,
        })
    }

    async fn list_object_versions(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectVersion>> {
        let mut versions = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_object_versions()
                .bucket(bucket.as_str())
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_id_marker.take())
                .send()
                .await
                .map_sdk(ErrorContext::bucket("list_object_versions", bucket))?;

            for version in output.versions() {
                versions.push(ObjectVersion {
                    key: ObjectKey::new(version.key().unwrap_or_default())?,
                    version_id: VersionId::new(version.version_id().unwrap_or(VersionId::NULL))?,
                    is_latest: version.is_latest().unwrap_or(false),
                    is_delete_marker: false,
                    size: Self::size(version.size()),
                    last_modified: version.last_modified().and_then(Self::to_chrono),
                });
            }

            for marker in output.delete_markers() {
                versions.push(ObjectVersion {
                    key: ObjectKey::new(marker.key().unwrap_or_default())?,
                    version_id: VersionId::new(marker.version_id().unwrap_or(VersionId::NULL))?,
                    is_latest: marker.is_latest().unwrap_or(false),
                    is_delete_marker: true,
                    size: 0,
                    last_modified: marker.last_modified().and_then(Self::to_chrono),
                });
            }

            if output.is_truncated() != Some(true) {
                break;
            }
            key_marker = output.next_key_marker().map(str::to_string);
            version_id_marker = output.next_version_id_marker().map(str::to_string);
            if key_marker.is_none() {
                break;
            }
        }

        debug!(bucket = %bucket, count = versions.len(), "Listed object versions");
        Ok(versions)
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        objects: &[ObjectIdentifier],
    ) -> StorageResult<DeleteObjectsOutcome> {
        // S3 rejects a Delete element without entries
        if objects.is_empty() {
            return Ok(DeleteObjectsOutcome::default());
        }

        if objects.len() > MAX_DELETE_BATCH {
            return Err(StorageError::ValidationError {
                message: format!(
                    "batch delete of {} entries exceeds the limit of {}",
                    objects.len(),
                    MAX_DELETE_BATCH
                ),
            });
        }

        let identifiers = objects
            .iter()
            .map(|object| {
                SdkObjectIdentifier::builder()
                    .key(object.key.as_str())
                    .set_version_id(object.version_id.as_ref().map(|v| v.to_string()))
                    .build()
                    .map_err(|e| StorageError::backend("delete_objects", e.to_string()))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| StorageError::backend("delete_objects", e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket.as_str())
            .delete(delete)
            .send()
            .await
            .map_sdk(ErrorContext::bucket("delete_objects", bucket))?;

        let deleted = output.deleted().iter().map(Self::deleted_object).collect();

        let errors = output
            .errors()
            .iter()
            .map(|error| DeleteObjectError {
                key: error.key().map(str::to_string),
                version_id: error.version_id().map(str::to_string),
                code: error.code().map(str::to_string),
                message: error.message().map(str::to_string),
            })
            .collect();

        Ok(DeleteObjectsOutcome { deleted, errors })
    }
}

#[async_trait]
impl ObjectStore for S3StorageAdapter {
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: Bytes,
        options: &PutObjectOptions,
    ) -> StorageResult<PutObjectOutcome> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .body(ByteStream::from(data))
            .set_acl(options.acl.map(|acl| ObjectCannedAcl::from(acl.as_str())))
            .set_server_side_encryption(
                options
                    .server_side_encryption
                    .map(|sse| SdkServerSideEncryption::from(sse.as_str())),
            )
            .set_storage_class(
                options
                    .storage_class
                    .as_ref()
                    .map(|class| SdkStorageClass::from(class.as_str())),
            )
            .set_content_type(options.content_type.clone());

        if !options.metadata.is_empty() {
            request = request.set_metadata(Some(options.metadata.clone()));
        }

        let output = request
            .send()
            .await
            .map_sdk(ErrorContext::object("put_object", bucket, key))?;

        Ok(PutObjectOutcome {
            bucket: bucket.clone(),
            key: key.clone(),
            etag: output.e_tag().map(str::to_string),
            version_id: Self::version(output.version_id()),
            server_side_encryption: Self::encryption(output.server_side_encryption()),
        })
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_id.map(|v| v.to_string()))
            .send()
            .await
            .map_sdk(ErrorContext::object("get_object", bucket, key).with_version(version_id))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend("get_object", e.to_string()))?;

        Ok(data.into_bytes())
    }

    async fn head_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectDetails> {
        let result = self
            .client
            .head_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::object("head_object", bucket, key));

        let output = match result {
            Ok(output) => output,
            Err(err @ StorageError::ObjectNotFound { .. }) => {
                let bucket_check = self.head_bucket(bucket).await;
                return Err(Self::resolve_head_not_found(err, bucket_check));
            }
            Err(err) => return Err(err),
        };

        Ok(ObjectDetails {
            bucket: bucket.clone(),
            key: key.clone(),
            size: Self::size(output.content_length()),
            etag: output.e_tag().map(str::to_string),
            last_modified: output.last_modified().and_then(Self::to_chrono),
            content_type: output.content_type().map(str::to_string),
            version_id: Self::version(output.version_id()),
            server_side_encryption: Self::encryption(output.server_side_encryption()),
            storage_class: Self::storage_class(output.storage_class().map(|c| c.as_str())),
            metadata: output.metadata().cloned().unwrap_or_default(),
        })
    }

    async fn copy_object(
        &self,
        source_bucket: &BucketName,
        source_key: &ObjectKey,
        destination_bucket: &BucketName,
        destination_key: &ObjectKey,
    ) -> StorageResult<PutObjectOutcome> {
        let copy_source = format!(
            "{}/{}",
            source_bucket,
            urlencoding::encode(source_key.as_str())
        );

        // NoSuchKey always refers to the source object
        let result = self
            .client
            .copy_object()
            .copy_source(copy_source)
            .bucket(destination_bucket.as_str())
            .key(destination_key.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::object("copy_object", source_bucket, source_key));

        let output = match result {
            Ok(output) => output,
            Err(StorageError::BucketNotFound { .. }) => {
                let source_check = self.head_bucket(source_bucket).await;
                return Err(Self::resolve_copy_missing_bucket(
                    destination_bucket,
                    source_check,
                ));
            }
            Err(err) => return Err(err),
        };

        Ok(PutObjectOutcome {
            bucket: destination_bucket.clone(),
            key: destination_key.clone(),
            etag: output
                .copy_object_result()
                .and_then(|result| result.e_tag())
                .map(str::to_string),
            version_id: Self::version(output.version_id()),
            server_side_encryption: Self::encryption(output.server_side_encryption()),
        })
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<DeleteObjectOutcome> {
        let output = self
            .client
            .delete_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::object("delete_object", bucket, key))?;

        Ok(DeleteObjectOutcome {
            delete_marker: output.delete_marker().unwrap_or(false),
            version_id: Self::version(output.version_id()),
        })
    }

    async fn get_object_acl(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectAcl> {
        let output = self
            .client
            .get_object_acl()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_sdk(ErrorContext::object("get_object_acl", bucket, key))?;

        let owner = output.owner().and_then(|owner| {
            Some(Owner {
                id: owner.id()?.to_string(),
                display_name: owner.display_name().map(str::to_string),
            })
        });

        Ok(ObjectAcl {
            owner,
            grants: output.grants().iter().filter_map(Self::grant).collect(),
        })
    }

    async fn list_objects(&self, bucket: &BucketName) -> StorageResult<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket.as_str())
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_sdk(ErrorContext::bucket("list_objects_v2", bucket))?;

            for object in output.contents() {
                let Some(key) = object.key() else { continue };
                objects.push(ObjectSummary {
                    key: ObjectKey::new(key)?,
                    size: Self::size(object.size()),
                    etag: object.e_tag().map(str::to_string),
                    last_modified: object.last_modified().and_then(Self::to_chrono),
                    storage_class: Self::storage_class(object.storage_class().map(|c| c.as_str())),
                });
            }

            continuation_token = output.next_continuation_token().map(str::to_string);
            if output.is_truncated() != Some(true) || continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_class_defaults_to_standard() {
        assert_eq!(S3StorageAdapter::storage_class(None), StorageClass::Standard);
        assert_eq!(
            S3StorageAdapter::storage_class(Some("STANDARD_IA")),
            StorageClass::InfrequentAccess
        );
    }

    #[test]
    fn test_sdk_enum_conversions() {
        assert_eq!(
            S3StorageAdapter::encryption(Some(&SdkServerSideEncryption::Aes256)),
            Some(ServerSideEncryption::Aes256)
        );
        assert_eq!(
            SdkStorageClass::from(StorageClass::InfrequentAccess.as_str()),
            SdkStorageClass::StandardIa
        );
        assert_eq!(
            ObjectCannedAcl::from(crate::domain::models::CannedAcl::PublicRead.as_str()),
            ObjectCannedAcl::PublicRead
        );
    }

    #[test]
    fn test_bucket_configuration_by_region() {
        assert!(S3StorageAdapter::bucket_configuration("us-east-1").is_none());

        let config = S3StorageAdapter::bucket_configuration("eu-west-1").unwrap();
        assert_eq!(
            config.location_constraint(),
            Some(&BucketLocationConstraint::EuWest1)
        );
    }

    #[test]
    fn test_version_ids_from_the_service_are_kept() {
        let id = "3/L4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY+MTRCxf3vjVBH40Nr8X8gdRQBpUMLUo";
        assert_eq!(
            S3StorageAdapter::version(Some(id)).map(|v| v.to_string()),
            Some(id.to_string())
        );
        assert_eq!(S3StorageAdapter::version(None), None);
    }

    #[test]
    fn test_deleted_entries_keep_raw_keys() {
        // Keys S3 accepts but ObjectKey does not are still counted
        let entries = [
            SdkDeletedObject::builder()
                .key("/leading-slash.txt")
                .version_id("3/L4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY+MTRCxf3vjVBH40Nr8X8gdRQBpUMLUo")
                .build(),
            SdkDeletedObject::builder().key("plain.txt").build(),
        ];

        let deleted: Vec<DeletedObject> =
            entries.iter().map(S3StorageAdapter::deleted_object).collect();
        assert_eq!(deleted.len(), 2);
        assert_eq!(deleted[0].key, "/leading-slash.txt");
        assert!(deleted[0].version_id.is_some());
        assert_eq!(deleted[1].version_id, None);
    }

    #[test]
    fn test_head_not_found_resolves_missing_bucket() {
        let b = BucketName::new("missing-bucket").unwrap();
        let k = ObjectKey::new("file.txt").unwrap();
        let object_missing = || StorageError::ObjectNotFound {
            bucket: b.clone(),
            key: k.clone(),
        };

        let resolved = S3StorageAdapter::resolve_head_not_found(
            object_missing(),
            Err(StorageError::BucketNotFound { bucket: b.clone() }),
        );
        assert!(matches!(resolved, StorageError::BucketNotFound { .. }));

        let resolved = S3StorageAdapter::resolve_head_not_found(object_missing(), Ok(()));
        assert!(matches!(resolved, StorageError::ObjectNotFound { .. }));

        // Any other HeadBucket failure keeps the original answer
        let resolved = S3StorageAdapter::resolve_head_not_found(
            object_missing(),
            Err(StorageError::backend("head_bucket", "timeout")),
        );
        assert!(matches!(resolved, StorageError::ObjectNotFound { .. }));
    }

    #[test]
    fn test_copy_missing_bucket_names_the_right_side() {
        let source = BucketName::new("source-bucket").unwrap();
        let destination = BucketName::new("destination-bucket").unwrap();

        match S3StorageAdapter::resolve_copy_missing_bucket(&destination, Ok(())) {
            StorageError::BucketNotFound { bucket } => assert_eq!(bucket, destination),
            other => panic!("unexpected error: {other:?}"),
        }

        match S3StorageAdapter::resolve_copy_missing_bucket(
            &destination,
            Err(StorageError::BucketNotFound {
                bucket: source.clone(),
            }),
        ) {
            StorageError::BucketNotFound { bucket } => assert_eq!(bucket, source),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_conversion() {
        let dt = SdkDateTime::from_secs(1_700_000_000);
        let converted = S3StorageAdapter::to_chrono(&dt).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_grant_conversion() {
        let grant = aws_sdk_s3::types::Grant::builder()
            .grantee(
                aws_sdk_s3::types::Grantee::builder()
                    .r#type(aws_sdk_s3::types::Type::Group)
                    .uri(crate::domain::models::ALL_USERS_GROUP)
                    .build()
                    .unwrap(),
            )
            .permission(aws_sdk_s3::types::Permission::Read)
            .build();

        let converted = S3StorageAdapter::grant(&grant).unwrap();
        assert_eq!(converted.permission, Permission::Read);
        assert!(matches!(converted.grantee, Grantee::Group { .. }));
    }
}
