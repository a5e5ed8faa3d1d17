use clap::Args;
use std::sync::Arc;
use tracing::Level;

use crate::{
    adapters::outbound::storage::{
        create_s3_client, InMemoryStorageAdapter, S3Config, S3StorageAdapter,
    },
    domain::models::{CreateBucketOptions, ObjectOwnership},
    ports::{
        services::{BucketService, ObjectService},
        storage::{BucketStore, ObjectStore},
    },
    services::{BucketServiceImpl, ObjectServiceImpl, Walkthrough, WalkthroughConfig},
};

/// Region used by the in-memory backend when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    /// Applied to every bucket the services create
    pub bucket_options: CreateBucketOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory {
                region: DEFAULT_REGION.to_string(),
            },
            // Uploads with canned ACLs need writer-owned objects
            bucket_options: CreateBucketOptions {
                object_ownership: Some(ObjectOwnership::ObjectWriter),
            },
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory { region: String },
    S3(S3Config),
}

/// Application dependencies container
pub struct AppDependencies {
    pub bucket_store: Arc<dyn BucketStore>,
    pub object_store: Arc<dyn ObjectStore>,
    pub region: String,
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub bucket_service: Arc<dyn BucketService>,
    pub object_service: Arc<dyn ObjectService>,
    pub region: String,
}

impl AppServices {
    /// Scripted walkthrough over these services
    pub fn walkthrough(&self, config: WalkthroughConfig) -> Walkthrough {
        Walkthrough::new(
            self.bucket_service.clone(),
            self.object_service.clone(),
            config,
        )
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_bucket_options(mut self, options: CreateBucketOptions) -> Self {
        self.config.bucket_options = options;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        match &self.config.storage_backend {
            StorageBackend::InMemory { region } => {
                let adapter = Arc::new(InMemoryStorageAdapter::new());
                Ok(AppDependencies {
                    bucket_store: adapter.clone(),
                    object_store: adapter,
                    region: region.clone(),
                })
            }
            StorageBackend::S3(s3_config) => {
                let (client, region) =
                    create_s3_client(s3_config)
                        .await
                        .map_err(|e| AppError::StorageInit {
                            message: e.to_string(),
                        })?;
                let adapter = Arc::new(S3StorageAdapter::new(client));
                Ok(AppDependencies {
                    bucket_store: adapter.clone(),
                    object_store: adapter,
                    region,
                })
            }
        }
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;

        let bucket_service = BucketServiceImpl::new(deps.bucket_store, deps.region.clone())
            .with_create_options(self.config.bucket_options.clone());
        let object_service = ObjectServiceImpl::new(deps.object_store);

        Ok(AppServices {
            bucket_service: Arc::new(bucket_service),
            object_service: Arc::new(object_service),
            region: deps.region,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Connection flags shared by the binaries
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Storage backend: memory or s3
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    pub backend: String,

    /// Region for new buckets; s3 falls back to the AWS config chain
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[arg(long, env = "S3_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "S3_ACCESS_KEY")]
    pub access_key: Option<String>,

    #[arg(long, env = "S3_SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Use path-style bucket addressing (MinIO)
    #[arg(long, env = "S3_FORCE_PATH_STYLE")]
    pub force_path_style: bool,

    /// Object ownership for created buckets
    #[arg(long, env = "OBJECT_OWNERSHIP", default_value = "ObjectWriter")]
    pub object_ownership: String,
}

impl BackendArgs {
    pub fn to_app_config(&self) -> Result<AppConfig, AppError> {
        let storage_backend = parse_backend(
            &self.backend,
            self.region.clone(),
            S3Config {
                region: self.region.clone(),
                endpoint: self.endpoint.clone(),
                access_key: self.access_key.clone(),
                secret_key: self.secret_key.clone(),
                force_path_style: self.force_path_style,
            },
        )?;

        let object_ownership =
            self.object_ownership
                .parse()
                .map_err(|e: crate::domain::DomainValidationError| AppError::Configuration {
                    message: e.to_string(),
                })?;

        Ok(AppConfig {
            storage_backend,
            bucket_options: CreateBucketOptions {
                object_ownership: Some(object_ownership),
            },
        })
    }
}

fn parse_backend(
    name: &str,
    region: Option<String>,
    s3: S3Config,
) -> Result<StorageBackend, AppError> {
    match name {
        "memory" => Ok(StorageBackend::InMemory {
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }),
        "s3" => Ok(StorageBackend::S3(s3)),
        other => Err(AppError::Configuration {
            message: format!("Unknown storage backend: {}", other),
        }),
    }
}

/// Install the fmt subscriber on stderr; unknown levels fall back to info
pub fn init_logging(log_level: &str) {
    let level = log_level.parse::<Level>().unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Convenience functions for common configurations
///
/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new().build().await
}

/// Create an S3-backed application
pub async fn create_s3_app(config: S3Config) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3(config))
        .build()
        .await
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    let region = std::env::var("AWS_REGION").ok();
    let s3 = S3Config {
        region: region.clone(),
        endpoint: std::env::var("S3_ENDPOINT").ok(),
        access_key: std::env::var("S3_ACCESS_KEY").ok(),
        secret_key: std::env::var("S3_SECRET_KEY").ok(),
        force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    };
    let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".to_string());

    AppBuilder::new()
        .with_storage_backend(parse_backend(&backend, region, s3)?)
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        backend: BackendArgs,
    }

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app().await.unwrap();
        assert_eq!(app.region, DEFAULT_REGION);

        let bucket = app.bucket_service.create_bucket("app-test-").await.unwrap();
        assert_eq!(app.bucket_service.list_buckets().await.unwrap().len(), 1);
        app.bucket_service.delete_bucket(&bucket.name).await.unwrap();
    }

    #[tokio::test]
    async fn test_app_builder_region() {
        let app = AppBuilder::new()
            .with_storage_backend(StorageBackend::InMemory {
                region: "eu-central-1".to_string(),
            })
            .build()
            .await
            .unwrap();

        let bucket = app.bucket_service.create_bucket("region-").await.unwrap();
        assert_eq!(bucket.region, "eu-central-1");
    }

    #[test]
    fn test_backend_args_to_config() {
        let cli = TestCli::parse_from([
            "test",
            "--backend",
            "s3",
            "--region",
            "eu-west-1",
            "--endpoint",
            "http://localhost:9000",
            "--force-path-style",
        ]);
        let config = cli.backend.to_app_config().unwrap();

        match config.storage_backend {
            StorageBackend::S3(s3) => {
                assert_eq!(s3.region.as_deref(), Some("eu-west-1"));
                assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
                assert!(s3.force_path_style);
            }
            other => panic!("unexpected backend: {other:?}"),
        }
        assert_eq!(
            config.bucket_options.object_ownership,
            Some(ObjectOwnership::ObjectWriter)
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let cli = TestCli::parse_from(["test", "--backend", "ftp"]);
        assert!(matches!(
            cli.backend.to_app_config(),
            Err(AppError::Configuration { .. })
        ));
    }
}
