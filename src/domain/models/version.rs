use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::domain::{
    errors::ValidationError,
    value_objects::{ObjectKey, VersionId},
};

/// Versioning state of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
    /// Versioning was never configured on the bucket
    Unversioned,
}

impl VersioningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersioningStatus::Enabled => "Enabled",
            VersioningStatus::Suspended => "Suspended",
            VersioningStatus::Unversioned => "Unversioned",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, VersioningStatus::Enabled)
    }
}

impl std::str::FromStr for VersioningStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(VersioningStatus::Enabled),
            "suspended" => Ok(VersioningStatus::Suspended),
            "unversioned" => Ok(VersioningStatus::Unversioned),
            _ => Err(ValidationError::UnknownValue {
                field: "versioning status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for VersioningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VersioningStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of a version listing: a stored version or a delete marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectVersion {
    pub key: ObjectKey,
    pub version_id: VersionId,
    pub is_latest: bool,
    pub is_delete_marker: bool,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectVersion {
    pub fn identifier(&self) -> ObjectIdentifier {
        ObjectIdentifier {
            key: self.key.clone(),
            version_id: Some(self.version_id.clone()),
        }
    }
}

/// Addresses an object, or one specific version of it, in a batch delete
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectIdentifier {
    pub key: ObjectKey,
    pub version_id: Option<VersionId>,
}

/// Entry reported as removed by a batch delete, kept exactly as the service returned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedObject {
    pub key: String,
    pub version_id: Option<String>,
}

impl From<&ObjectIdentifier> for DeletedObject {
    fn from(object: &ObjectIdentifier) -> Self {
        Self {
            key: object.key.to_string(),
            version_id: object.version_id.as_ref().map(|v| v.to_string()),
        }
    }
}

/// Per-entry failure reported by a batch delete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteObjectError {
    pub key: Option<String>,
    pub version_id: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteObjectsOutcome {
    pub deleted: Vec<DeletedObject>,
    pub errors: Vec<DeleteObjectError>,
}

/// What a plain (unversioned) delete did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteObjectOutcome {
    pub delete_marker: bool,
    pub version_id: Option<VersionId>,
}
