use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::domain::{
    errors::ValidationError,
    models::CannedAcl,
    value_objects::{BucketName, ObjectKey, VersionId},
};

/// Server-side encryption algorithm applied by the storage service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSideEncryption {
    Aes256,
    AwsKms,
}

impl ServerSideEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerSideEncryption::Aes256 => "AES256",
            ServerSideEncryption::AwsKms => "aws:kms",
        }
    }
}

impl std::str::FromStr for ServerSideEncryption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AES256" | "aes256" => Ok(ServerSideEncryption::Aes256),
            "aws:kms" => Ok(ServerSideEncryption::AwsKms),
            _ => Err(ValidationError::UnknownValue {
                field: "server-side encryption",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ServerSideEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServerSideEncryption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Storage classes for objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageClass {
    Standard,
    InfrequentAccess,
    OneZoneInfrequentAccess,
    IntelligentTiering,
    Glacier,
    DeepArchive,
    Custom(String),
}

impl StorageClass {
    pub fn as_str(&self) -> &str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::InfrequentAccess => "STANDARD_IA",
            StorageClass::OneZoneInfrequentAccess => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
            StorageClass::Custom(s) => s,
        }
    }

    /// Parse a class name reported by the service; unknown names are kept as-is
    pub fn from_service(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| StorageClass::Custom(value.to_string()))
    }
}

impl Default for StorageClass {
    fn default() -> Self {
        StorageClass::Standard
    }
}

impl std::str::FromStr for StorageClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(StorageClass::Standard),
            "STANDARD_IA" => Ok(StorageClass::InfrequentAccess),
            "ONEZONE_IA" => Ok(StorageClass::OneZoneInfrequentAccess),
            "INTELLIGENT_TIERING" => Ok(StorageClass::IntelligentTiering),
            "GLACIER" => Ok(StorageClass::Glacier),
            "DEEP_ARCHIVE" => Ok(StorageClass::DeepArchive),
            _ => Err(ValidationError::UnknownValue {
                field: "storage class",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StorageClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Extra arguments for an upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutObjectOptions {
    pub acl: Option<CannedAcl>,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub storage_class: Option<StorageClass>,
    pub content_type: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl PutObjectOptions {
    pub fn with_acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_server_side_encryption(mut self, sse: ServerSideEncryption) -> Self {
        self.server_side_encryption = Some(sse);
        self
    }

    pub fn with_storage_class(mut self, class: StorageClass) -> Self {
        self.storage_class = Some(class);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What the service reports back after an upload or copy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutObjectOutcome {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub etag: Option<String>,
    pub version_id: Option<VersionId>,
    pub server_side_encryption: Option<ServerSideEncryption>,
}

/// Object attributes returned by a HEAD request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDetails {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub version_id: Option<VersionId>,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub storage_class: StorageClass,
    pub metadata: HashMap<String, String>,
}

/// An entry of an object listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    pub key: ObjectKey,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub storage_class: StorageClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_class_round_trip_names() {
        assert_eq!(
            "STANDARD_IA".parse::<StorageClass>().unwrap(),
            StorageClass::InfrequentAccess
        );
        assert_eq!(
            "standard".parse::<StorageClass>().unwrap(),
            StorageClass::Standard
        );
        assert!("FAST".parse::<StorageClass>().is_err());
        assert_eq!(
            StorageClass::from_service("EXPRESS_ONEZONE"),
            StorageClass::Custom("EXPRESS_ONEZONE".to_string())
        );
    }

    #[test]
    fn test_encryption_names() {
        assert_eq!(
            "AES256".parse::<ServerSideEncryption>().unwrap(),
            ServerSideEncryption::Aes256
        );
        assert_eq!(ServerSideEncryption::AwsKms.as_str(), "aws:kms");
        assert_eq!(
            serde_json::to_string(&ServerSideEncryption::Aes256).unwrap(),
            "\"AES256\""
        );
    }

    #[test]
    fn test_put_options_builder() {
        let options = PutObjectOptions::default()
            .with_server_side_encryption(ServerSideEncryption::Aes256)
            .with_storage_class(StorageClass::InfrequentAccess)
            .with_metadata("origin", "walkthrough");

        assert_eq!(options.acl, None);
        assert_eq!(
            options.server_side_encryption,
            Some(ServerSideEncryption::Aes256)
        );
        assert_eq!(options.metadata.get("origin").map(String::as_str), Some("walkthrough"));
    }
}
