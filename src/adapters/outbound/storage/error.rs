use crate::domain::{
    errors::StorageError,
    value_objects::{BucketName, ObjectKey, VersionId},
};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("State lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convert infrastructure StoreError to domain StorageError
impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Configuration(message) => StorageError::ValidationError { message },
            other => StorageError::StorageBackendError {
                operation: "storage".to_string(),
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// What a failing SDK call was doing, used to build a precise domain error
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorContext<'a> {
    pub operation: &'static str,
    pub bucket: Option<&'a BucketName>,
    pub key: Option<&'a ObjectKey>,
    pub version_id: Option<&'a VersionId>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            bucket: None,
            key: None,
            version_id: None,
        }
    }

    pub fn bucket(operation: &'static str, bucket: &'a BucketName) -> Self {
        Self {
            bucket: Some(bucket),
            ..Self::new(operation)
        }
    }

    pub fn object(operation: &'static str, bucket: &'a BucketName, key: &'a ObjectKey) -> Self {
        Self {
            bucket: Some(bucket),
            key: Some(key),
            ..Self::new(operation)
        }
    }

    pub fn with_version(mut self, version_id: Option<&'a VersionId>) -> Self {
        self.version_id = version_id;
        self
    }

    fn resource(&self) -> String {
        match (self.bucket, self.key) {
            (Some(bucket), Some(key)) => format!("{}/{}", bucket, key),
            (Some(bucket), None) => bucket.to_string(),
            _ => "account".to_string(),
        }
    }
}

/// Map an S3 error code and HTTP status onto a domain error.
///
/// Returns `None` when the failure has no domain meaning and should surface
/// as a backend error.
pub(crate) fn classify(
    code: Option<&str>,
    status: Option<u16>,
    ctx: &ErrorContext<'_>,
) -> Option<StorageError> {
    let error = match (code, ctx.bucket, ctx.key, ctx.version_id) {
        (Some("NoSuchBucket"), Some(bucket), _, _) => StorageError::BucketNotFound {
            bucket: bucket.clone(),
        },
        (Some("NoSuchVersion"), Some(bucket), Some(key), Some(version_id)) => {
            StorageError::VersionNotFound {
                bucket: bucket.clone(),
                key: key.clone(),
                version_id: version_id.clone(),
            }
        }
        (Some("NoSuchKey") | Some("NotFound"), Some(bucket), Some(key), _) => {
            StorageError::ObjectNotFound {
                bucket: bucket.clone(),
                key: key.clone(),
            }
        }
        // HEAD responses carry no body, so a missing key only shows up as a bare 404.
        // The bucket may be the thing that is missing; callers resolve that with HeadBucket.
        (None, Some(bucket), Some(key), _) if status == Some(404) => StorageError::ObjectNotFound {
            bucket: bucket.clone(),
            key: key.clone(),
        },
        (None | Some("NotFound"), Some(bucket), None, _) if status == Some(404) => {
            StorageError::BucketNotFound {
                bucket: bucket.clone(),
            }
        }
        (Some("BucketAlreadyExists") | Some("BucketAlreadyOwnedByYou"), Some(bucket), _, _) => {
            StorageError::BucketAlreadyExists {
                bucket: bucket.clone(),
            }
        }
        (Some("BucketNotEmpty"), Some(bucket), _, _) => StorageError::BucketNotEmpty {
            bucket: bucket.clone(),
        },
        (Some("AccessDenied"), _, _, _) => StorageError::AccessDenied {
            resource: ctx.resource(),
            operation: ctx.operation.to_string(),
        },
        _ => return None,
    };
    Some(error)
}

/// Map an AWS SDK error onto the domain error, keyed by the S3 error code
pub(crate) fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, ctx: ErrorContext<'_>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    let status = err.raw_response().map(|r| r.status().as_u16());

    classify(code.as_deref(), status, &ctx).unwrap_or_else(|| StorageError::StorageBackendError {
        operation: ctx.operation.to_string(),
        code,
        message: DisplayErrorContext(&err).to_string(),
    })
}

pub(crate) trait SdkResultExt<T> {
    fn map_sdk(self, ctx: ErrorContext<'_>) -> Result<T, StorageError>;
}

impl<T, E> SdkResultExt<T> for Result<T, SdkError<E, HttpResponse>>
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn map_sdk(self, ctx: ErrorContext<'_>) -> Result<T, StorageError> {
        self.map_err(|err| map_sdk_error(err, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_into_storage_error() {
        let err: StorageError = StoreError::Configuration("no region".to_string()).into();
        assert!(matches!(err, StorageError::ValidationError { .. }));

        let err: StorageError = StoreError::LockPoisoned("buckets".to_string()).into();
        match err {
            StorageError::StorageBackendError { message, .. } => {
                assert!(message.contains("buckets"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_context_resource() {
        let bucket = BucketName::new("my-bucket").unwrap();
        let key = ObjectKey::new("file.txt").unwrap();

        assert_eq!(
            ErrorContext::object("head_object", &bucket, &key).resource(),
            "my-bucket/file.txt"
        );
        assert_eq!(ErrorContext::bucket("delete_bucket", &bucket).resource(), "my-bucket");
        assert_eq!(ErrorContext::new("list_buckets").resource(), "account");
    }

    #[test]
    fn test_classify_error_codes() {
        let bucket = BucketName::new("my-bucket").unwrap();
        let key = ObjectKey::new("file.txt").unwrap();
        let object = ErrorContext::object("get_object", &bucket, &key);

        assert!(matches!(
            classify(Some("NoSuchKey"), Some(404), &object),
            Some(StorageError::ObjectNotFound { .. })
        ));
        assert!(matches!(
            classify(Some("NoSuchBucket"), Some(404), &object),
            Some(StorageError::BucketNotFound { .. })
        ));
        assert!(matches!(
            classify(
                Some("BucketNotEmpty"),
                Some(409),
                &ErrorContext::bucket("delete_bucket", &bucket)
            ),
            Some(StorageError::BucketNotEmpty { .. })
        ));
        assert!(classify(Some("SlowDown"), Some(503), &object).is_none());
    }

    #[test]
    fn test_classify_bare_not_found() {
        let bucket = BucketName::new("my-bucket").unwrap();
        let key = ObjectKey::new("file.txt").unwrap();

        // HeadObject: reported against the object, resolved later by the adapter
        assert!(matches!(
            classify(None, Some(404), &ErrorContext::object("head_object", &bucket, &key)),
            Some(StorageError::ObjectNotFound { .. })
        ));
        // HeadBucket: nothing else can be missing
        assert!(matches!(
            classify(None, Some(404), &ErrorContext::bucket("head_bucket", &bucket)),
            Some(StorageError::BucketNotFound { .. })
        ));
        assert!(matches!(
            classify(Some("NotFound"), Some(404), &ErrorContext::bucket("head_bucket", &bucket)),
            Some(StorageError::BucketNotFound { .. })
        ));
        assert!(classify(None, Some(500), &ErrorContext::bucket("head_bucket", &bucket)).is_none());
    }
}
