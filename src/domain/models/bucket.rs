use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{errors::ValidationError, value_objects::BucketName};

/// A bucket created by this program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedBucket {
    pub name: BucketName,
    pub region: String,
}

/// An entry of the account's bucket listing.
///
/// The name is kept as a plain string: other tools may have created buckets
/// whose legacy names do not pass `BucketName` validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Object ownership control set at bucket creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOwnership {
    BucketOwnerEnforced,
    BucketOwnerPreferred,
    /// Uploader owns the object; ACLs are honoured
    ObjectWriter,
}

impl ObjectOwnership {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectOwnership::BucketOwnerEnforced => "BucketOwnerEnforced",
            ObjectOwnership::BucketOwnerPreferred => "BucketOwnerPreferred",
            ObjectOwnership::ObjectWriter => "ObjectWriter",
        }
    }

    /// Whether objects in such a bucket accept ACLs other than bucket-owner-full-control
    pub fn allows_acls(&self) -> bool {
        !matches!(self, ObjectOwnership::BucketOwnerEnforced)
    }
}

impl std::str::FromStr for ObjectOwnership {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BucketOwnerEnforced" => Ok(ObjectOwnership::BucketOwnerEnforced),
            "BucketOwnerPreferred" => Ok(ObjectOwnership::BucketOwnerPreferred),
            "ObjectWriter" => Ok(ObjectOwnership::ObjectWriter),
            _ => Err(ValidationError::UnknownValue {
                field: "object ownership",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketOptions {
    pub object_ownership: Option<ObjectOwnership>,
}

/// Summary of removing every version from a bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurgeSummary {
    pub listed: usize,
    pub deleted: usize,
    pub failed: usize,
    pub batches: usize,
}
