//! S3 storage adapter implementation using the AWS SDK
//!
//! This module provides the S3 adapter that implements the ObjectStore and
//! BucketStore traits against Amazon S3 or any S3-compatible endpoint.

pub mod s3_adapter;

pub use s3_adapter::S3StorageAdapter;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::adapters::outbound::storage::error::StoreError;

/// Configuration for the S3 storage backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Config {
    /// Region for new buckets and request signing; falls back to the AWS config chain
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services such as MinIO
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
}

/// Build an S3 client from configuration.
///
/// Static credentials are used when both keys are given, otherwise the
/// default credential chain (env, shared config files, instance roles).
/// Returns the client together with the resolved region.
pub async fn create_s3_client(config: &S3Config) -> Result<(Client, String), StoreError> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        let credentials = Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None, // session token
            None, // expiry
            "WalkthroughStaticCredentials",
        );
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;

    let region = sdk_config
        .region()
        .map(|r| r.as_ref().to_string())
        .ok_or_else(|| {
            StoreError::Configuration(
                "no region configured; pass --region or set AWS_REGION".to_string(),
            )
        })?;

    let mut builder =
        aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);

    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    debug!(
        region = %region,
        endpoint = ?config.endpoint,
        force_path_style = config.force_path_style,
        static_credentials = config.access_key.is_some(),
        "Creating S3 client"
    );

    Ok((Client::from_conf(builder.build()), region))
}
