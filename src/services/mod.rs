mod bucket_service_impl;
mod object_service_impl;
pub mod walkthrough;

pub use bucket_service_impl::BucketServiceImpl;
pub use object_service_impl::ObjectServiceImpl;
pub use walkthrough::{
    CleanupScope, DeletionCheck, Walkthrough, WalkthroughConfig, WalkthroughReport,
};
