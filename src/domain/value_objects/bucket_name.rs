use crate::domain::errors::ValidationError;
use serde::Serialize;
use uuid::Uuid;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// A validated bucket name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName with S3-compatible validation rules
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.len() < MIN_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        // Must start and end with lowercase letter or number
        if !value
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if !value
            .chars()
            .last()
            .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(ValidationError::BucketNameInvalidCharacter(c));
            }
        }

        if value.contains("--") {
            return Err(ValidationError::BucketNameConsecutiveHyphens);
        }

        Ok(Self(value))
    }

    /// Generate a fresh bucket name by appending a random UUID to `prefix`.
    ///
    /// Every call yields a different name. The UUID adds 36 characters, so
    /// the prefix may be at most 27 characters long.
    pub fn generate(prefix: &str) -> Result<Self, ValidationError> {
        Self::new(format!("{}{}", prefix, Uuid::new_v4()))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BucketName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("my-bucket").is_ok());
        assert!(BucketName::new("bucket123").is_ok());
        assert!(BucketName::new("123bucket").is_ok());
        assert!(BucketName::new("my-bucket-123").is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        // Too short
        assert!(BucketName::new("ab").is_err());

        // Too long
        assert!(BucketName::new("a".repeat(64)).is_err());

        // Invalid start/end
        assert!(BucketName::new("-bucket").is_err());
        assert!(BucketName::new("bucket-").is_err());
        assert!(BucketName::new("Bucket").is_err());

        // Invalid characters
        assert!(BucketName::new("my_bucket").is_err());
        assert!(BucketName::new("my bucket").is_err());

        assert!(BucketName::new("my--bucket").is_err());
    }

    #[test]
    fn test_dotted_names_are_rejected_as_invalid_characters() {
        assert_eq!(
            BucketName::new("192.168.1.1"),
            Err(ValidationError::BucketNameInvalidCharacter('.'))
        );
        assert_eq!(
            BucketName::new("my.bucket"),
            Err(ValidationError::BucketNameInvalidCharacter('.'))
        );
    }

    #[test]
    fn test_generated_names_are_unique_and_fit() {
        let names: HashSet<BucketName> = (0..50)
            .map(|_| BucketName::generate("firstbucket-").unwrap())
            .collect();

        assert_eq!(names.len(), 50);
        for name in &names {
            assert!(name.as_str().starts_with("firstbucket-"));
            assert!((MIN_LEN..=MAX_LEN).contains(&name.as_str().len()));
        }
    }

    #[test]
    fn test_generate_rejects_long_prefix() {
        let prefix = "p".repeat(28);
        assert_eq!(
            BucketName::generate(&prefix),
            Err(ValidationError::BucketNameTooLong { actual: 64, max: 63 })
        );
        assert!(BucketName::generate(&"p".repeat(27)).is_ok());
    }

    #[test]
    fn test_generate_rejects_uppercase_prefix() {
        assert_eq!(
            BucketName::generate("First"),
            Err(ValidationError::BucketNameInvalidStart)
        );
    }
}
