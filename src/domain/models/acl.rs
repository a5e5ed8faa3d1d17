use serde::{Serialize, Serializer};

use crate::domain::errors::ValidationError;

pub const ALL_USERS_GROUP: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
pub const AUTHENTICATED_USERS_GROUP: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";

/// Predefined grant sets accepted on upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::BucketOwnerRead => "bucket-owner-read",
            CannedAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }

    /// Expand the canned ACL into the grants the service would store for an
    /// object written by `owner` into a bucket owned by the same account.
    pub fn grants(&self, owner: &Owner) -> Vec<Grant> {
        let mut grants = vec![Grant {
            grantee: Grantee::CanonicalUser {
                id: owner.id.clone(),
                display_name: owner.display_name.clone(),
            },
            permission: Permission::FullControl,
        }];

        let group = |uri: &str, permission| Grant {
            grantee: Grantee::Group {
                uri: uri.to_string(),
            },
            permission,
        };

        match self {
            CannedAcl::PublicRead => grants.push(group(ALL_USERS_GROUP, Permission::Read)),
            CannedAcl::PublicReadWrite => {
                grants.push(group(ALL_USERS_GROUP, Permission::Read));
                grants.push(group(ALL_USERS_GROUP, Permission::Write));
            }
            CannedAcl::AuthenticatedRead => {
                grants.push(group(AUTHENTICATED_USERS_GROUP, Permission::Read))
            }
            CannedAcl::Private | CannedAcl::BucketOwnerRead | CannedAcl::BucketOwnerFullControl => {}
        }

        grants
    }
}

impl std::str::FromStr for CannedAcl {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(CannedAcl::Private),
            "public-read" => Ok(CannedAcl::PublicRead),
            "public-read-write" => Ok(CannedAcl::PublicReadWrite),
            "authenticated-read" => Ok(CannedAcl::AuthenticatedRead),
            "bucket-owner-read" => Ok(CannedAcl::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(CannedAcl::BucketOwnerFullControl),
            _ => Err(ValidationError::UnknownValue {
                field: "canned ACL",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CannedAcl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    FullControl,
    Read,
    Write,
    ReadAcp,
    WriteAcp,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FullControl => "FULL_CONTROL",
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::ReadAcp => "READ_ACP",
            Permission::WriteAcp => "WRITE_ACP",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL_CONTROL" => Ok(Permission::FullControl),
            "READ" => Ok(Permission::Read),
            "WRITE" => Ok(Permission::Write),
            "READ_ACP" => Ok(Permission::ReadAcp),
            "WRITE_ACP" => Ok(Permission::WriteAcp),
            _ => Err(ValidationError::UnknownValue {
                field: "permission",
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Account that owns a bucket or object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grantee {
    CanonicalUser {
        id: String,
        display_name: Option<String>,
    },
    Group {
        uri: String,
    },
    Email {
        address: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub grantee: Grantee,
    pub permission: Permission,
}

/// Access control list attached to an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectAcl {
    pub owner: Option<Owner>,
    pub grants: Vec<Grant>,
}

impl ObjectAcl {
    /// Whether anonymous users may read the object
    pub fn is_public_read(&self) -> bool {
        self.grants.iter().any(|grant| {
            grant.permission == Permission::Read
                && matches!(&grant.grantee, Grantee::Group { uri } if uri == ALL_USERS_GROUP)
        })
    }
}
