use descache_api::DescriptorSource;
use descache_core::{DescriptorProxy, ProxyConfig, SnapshotReflection};
use std::path::Path;
use tracing::info;

pub fn run(
    config: &ProxyConfig,
    host: &str,
    snapshot: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let reflection = SnapshotReflection::load(snapshot)?;
    let proxy = DescriptorProxy::with_reflection(config, host, &reflection);

    if proxy.was_refreshed() {
        info!(
            "Refreshed {} with {} reflection requests",
            host,
            reflection.calls().total()
        );
        println!("Refreshed entry for {}.", host);
    } else {
        println!("Entry for {} is fresh, nothing fetched.", host);
    }

    println!("Services:    {}", proxy.services().len());
    println!("Descriptors: {}", proxy.index().len());
    println!("Cache file:  {}", config.cache_path.display());
    Ok(())
}
