pub mod acl;
pub mod bucket;
pub mod object;
pub mod version;

pub use acl::*;
pub use bucket::*;
pub use object::*;
pub use version::*;
