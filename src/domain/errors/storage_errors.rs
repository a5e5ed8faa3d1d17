use std::path::PathBuf;

use crate::domain::{
    errors::ValidationError,
    value_objects::{BucketName, ObjectKey, VersionId},
};

/// Errors that can occur during storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Bucket does not exist
    BucketNotFound { bucket: BucketName },

    /// Bucket name is already taken, by us or by someone else
    BucketAlreadyExists { bucket: BucketName },

    /// Bucket still holds object versions or delete markers
    BucketNotEmpty { bucket: BucketName },

    /// Object not found (or its latest version is a delete marker)
    ObjectNotFound { bucket: BucketName, key: ObjectKey },

    /// Version not found
    VersionNotFound {
        bucket: BucketName,
        key: ObjectKey,
        version_id: VersionId,
    },

    /// Access denied by the service
    AccessDenied { resource: String, operation: String },

    /// Operation not supported by the backend
    UnsupportedOperation { operation: String, reason: String },

    /// Validation error
    ValidationError { message: String },

    /// Reading or writing a local file failed
    LocalFile { path: PathBuf, message: String },

    /// Storage backend error
    StorageBackendError {
        operation: String,
        code: Option<String>,
        message: String,
    },
}

impl StorageError {
    pub fn backend(operation: &str, message: impl Into<String>) -> Self {
        StorageError::StorageBackendError {
            operation: operation.to_string(),
            code: None,
            message: message.into(),
        }
    }

    pub fn local_file(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        StorageError::LocalFile {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::BucketNotFound { bucket } => {
                write!(f, "Bucket not found: {}", bucket)
            }
            StorageError::BucketAlreadyExists { bucket } => {
                write!(f, "Bucket already exists: {}", bucket)
            }
            StorageError::BucketNotEmpty { bucket } => {
                write!(f, "Bucket is not empty: {}", bucket)
            }
            StorageError::ObjectNotFound { bucket, key } => {
                write!(f, "Object not found: {}/{}", bucket, key)
            }
            StorageError::VersionNotFound {
                bucket,
                key,
                version_id,
            } => {
                write!(
                    f,
                    "Version '{}' not found for object: {}/{}",
                    version_id, bucket, key
                )
            }
            StorageError::AccessDenied {
                resource,
                operation,
            } => {
                write!(
                    f,
                    "Access denied for operation '{}' on: {}",
                    operation, resource
                )
            }
            StorageError::UnsupportedOperation { operation, reason } => {
                write!(f, "Unsupported operation '{}': {}", operation, reason)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::LocalFile { path, message } => {
                write!(f, "Local file error for {}: {}", path.display(), message)
            }
            StorageError::StorageBackendError {
                operation,
                code,
                message,
            } => match code {
                Some(code) => write!(
                    f,
                    "Storage backend error during {} ({}): {}",
                    operation, code, message
                ),
                None => write!(f, "Storage backend error during {}: {}", operation, message),
            },
        }
    }
}

impl std::error::Error for StorageError {}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
