use crate::domain::errors::ValidationError;
use serde::Serialize;

/// Identifier of an object version as issued by the storage service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Version of objects written while bucket versioning is not enabled
    pub const NULL: &'static str = "null";

    /// Wrap a version id issued by the service; the content is opaque
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyVersionId);
        }

        if value.len() > 1024 {
            return Err(ValidationError::VersionIdTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        Ok(Self(value))
    }

    /// The `null` version
    pub fn null() -> Self {
        Self(Self::NULL.to_string())
    }

    /// Generate a new unique version ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn is_null(&self) -> bool {
        self.0 == Self::NULL
    }

    /// Get the version ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
