pub mod cache;
pub mod error;
pub mod models;
pub mod reflection;
pub mod source;

// Re-export commonly used types
pub use cache::{CacheStats, DescriptorCacheManager, HostInspectResult, HostSummary};
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use reflection::{Connection, ReflectionSource};
pub use source::DescriptorSource;
