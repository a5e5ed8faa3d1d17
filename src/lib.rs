pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    // Value objects
    BucketName,
    // Models
    BucketSummary,
    CannedAcl,
    CreateBucketOptions,
    CreatedBucket,
    DomainValidationError,
    ObjectAcl,
    ObjectDetails,
    ObjectKey,
    ObjectOwnership,
    ObjectSummary,
    ObjectVersion,
    PurgeSummary,
    PutObjectOptions,
    ServerSideEncryption,
    // Errors
    StorageError,
    StorageResult,
    StorageClass,
    VersionId,
    VersioningStatus,
};

// Port types - interfaces for external systems
pub use ports::{
    BucketCleanup,
    // Storage ports
    BucketStore,
    // Service ports
    BucketService,
    CleanupReport,
    ObjectService,
    ObjectStore,
};

// Service implementations - business logic
pub use services::{
    BucketServiceImpl, CleanupScope, ObjectServiceImpl, Walkthrough, WalkthroughConfig,
    WalkthroughReport,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, create_s3_app, init_logging, AppBuilder,
    AppConfig, AppDependencies, AppError, AppServices, BackendArgs, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::local_file::{create_temp_file, TempFile};
pub use adapters::outbound::storage::{InMemoryStorageAdapter, S3Config, S3StorageAdapter};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_s3_app, AppBuilder, AppServices, BucketName, BucketService,
        InMemoryStorageAdapter, ObjectKey, ObjectService, S3Config, S3StorageAdapter,
        StorageError, VersionId, Walkthrough, WalkthroughConfig,
    };
}
