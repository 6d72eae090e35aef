pub mod closure;
pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod index;
pub mod logging;
pub mod proxy;
pub mod snapshot;
pub mod store;
pub mod util;

pub use config::{ProxyConfig, SourceMode};
pub use error::{DescacheError, Result};
pub use index::DescriptorIndex;
pub use proxy::{
    DescriptorProxy, ReflectionDescriptorSource, Resolution, get_descriptors, open_source,
};
pub use snapshot::{SnapshotConnection, SnapshotReflection};
pub use store::DescriptorStore;
