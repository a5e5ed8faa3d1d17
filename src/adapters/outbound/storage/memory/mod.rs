//! In-memory emulation of the S3 bucket and object API
//!
//! Object bodies live in an Apache `object_store` InMemory store; bucket,
//! version and ACL bookkeeping is kept alongside it. Used for tests and for
//! running the walkthrough without AWS credentials.

pub mod in_memory_adapter;

pub use in_memory_adapter::InMemoryStorageAdapter;
