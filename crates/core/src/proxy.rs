//! Descriptor cache proxy
//!
//! Serves descriptor lookups from the local cache file, refreshing the entry
//! for a host through its reflection endpoint when the entry is missing or
//! older than the configured TTL.

use crate::config::{ProxyConfig, SourceMode};
use crate::error::Result;
use crate::fetch::repopulate;
use crate::freshness::is_valid;
use crate::index::DescriptorIndex;
use crate::store;
use crate::util::unix_now;
use descache_api::{Connection, DescriptorSource, FileDescriptorRecord, ReflectionSource};

/// Result of one [`get_descriptors`] pass.
#[derive(Debug, Default, Clone)]
pub struct Resolution {
    /// Every descriptor cached for the host.
    pub index: DescriptorIndex,
    /// Service names offered by the host.
    pub services: Vec<String>,
    /// Whether the host entry was fetched again during this pass.
    pub refreshed: bool,
}

/// Load the cache, refresh the entry for `host_address` if stale, and index it.
///
/// Cache read and write faults are logged and never abort the pass. When the
/// refresh itself fails the stale entry, if any, is used instead.
pub fn get_descriptors<R>(config: &ProxyConfig, host_address: &str, reflection: &R) -> Resolution
where
    R: ReflectionSource + ?Sized,
{
    get_descriptors_at(config, host_address, reflection, unix_now())
}

/// [`get_descriptors`] evaluated at unix time `now`.
pub fn get_descriptors_at<R>(
    config: &ProxyConfig,
    host_address: &str,
    reflection: &R,
    now: i64,
) -> Resolution
where
    R: ReflectionSource + ?Sized,
{
    let path = config.cache_path();
    let mut db = store::load(path);

    let mut refreshed = false;
    if !is_valid(&db, host_address, now, config.ttl) {
        match repopulate(host_address, reflection, now) {
            Ok(host) => {
                db.replace_host(host);
                refreshed = true;
            }
            Err(e) => tracing::error!("Failed to refresh descriptors for {}: {}", host_address, e),
        }
    } else {
        tracing::debug!("Cached descriptors for {} are fresh", host_address);
    }

    let services: Vec<String> = db
        .hosts_for(host_address)
        .flat_map(|h| h.service_names.iter().cloned())
        .collect();

    let mut index = DescriptorIndex::new();
    if let Some(host) = db.first_host(host_address) {
        let stats = index.merge_host(host);
        tracing::debug!(
            "Indexed {} descriptor files for {} ({} duplicates, {} corrupt)",
            stats.added,
            host_address,
            stats.duplicates,
            stats.corrupt
        );
    }

    if let Err(e) = store::persist(path, &db) {
        tracing::error!("Failed to write descriptor cache {}: {}", path.display(), e);
    }

    Resolution {
        index,
        services,
        refreshed,
    }
}

/// Cache-backed [`DescriptorSource`] for one host.
#[derive(Debug, Clone)]
pub struct DescriptorProxy {
    host_address: String,
    resolution: Resolution,
}

impl DescriptorProxy {
    /// Open the connection's reflection capability and run a full
    /// [`get_descriptors`] pass.
    ///
    /// Only a failure to open the reflection capability is an error.
    pub fn connect(
        config: &ProxyConfig,
        host_address: &str,
        connection: &dyn Connection,
    ) -> Result<Self> {
        let reflection = connection.open_reflection()?;
        Ok(Self::with_reflection(config, host_address, reflection.as_ref()))
    }

    pub fn with_reflection<R>(config: &ProxyConfig, host_address: &str, reflection: &R) -> Self
    where
        R: ReflectionSource + ?Sized,
    {
        let resolution = get_descriptors(config, host_address, reflection);
        Self::from_resolution(host_address, resolution)
    }

    pub fn from_resolution(host_address: &str, resolution: Resolution) -> Self {
        Self {
            host_address: host_address.to_string(),
            resolution,
        }
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    pub fn index(&self) -> &DescriptorIndex {
        &self.resolution.index
    }

    pub fn was_refreshed(&self) -> bool {
        self.resolution.refreshed
    }

    pub fn find_all_extension_numbers(&self, containing_type: &str) -> Vec<i32> {
        self.resolution.index.find_all_extension_numbers(containing_type)
    }
}

impl DescriptorSource for DescriptorProxy {
    fn find_file_by_name(&self, filename: &str) -> Option<FileDescriptorRecord> {
        self.resolution.index.find_file_by_name(filename).cloned()
    }

    fn find_file_containing_symbol(&self, symbol_name: &str) -> Option<FileDescriptorRecord> {
        self.resolution
            .index
            .find_file_containing_symbol(symbol_name)
            .cloned()
    }

    fn find_file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> Option<FileDescriptorRecord> {
        self.resolution
            .index
            .find_file_containing_extension(containing_type, field_number)
            .cloned()
    }

    fn services(&self) -> Vec<String> {
        self.resolution.services.clone()
    }
}

/// [`DescriptorSource`] that forwards every lookup to a reflection endpoint.
pub struct ReflectionDescriptorSource<R> {
    reflection: R,
}

impl<R: ReflectionSource> ReflectionDescriptorSource<R> {
    pub fn new(reflection: R) -> Self {
        Self { reflection }
    }

    pub fn into_inner(self) -> R {
        self.reflection
    }
}

fn found_or_log(
    what: &str,
    result: descache_api::ApiResult<Option<FileDescriptorRecord>>,
) -> Option<FileDescriptorRecord> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Reflection lookup for {} failed: {}", what, e);
        None
    })
}

impl<R: ReflectionSource> DescriptorSource for ReflectionDescriptorSource<R> {
    fn find_file_by_name(&self, filename: &str) -> Option<FileDescriptorRecord> {
        found_or_log(filename, self.reflection.file_by_filename(filename))
    }

    fn find_file_containing_symbol(&self, symbol_name: &str) -> Option<FileDescriptorRecord> {
        found_or_log(symbol_name, self.reflection.file_containing_symbol(symbol_name))
    }

    fn find_file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> Option<FileDescriptorRecord> {
        found_or_log(
            containing_type,
            self.reflection
                .file_containing_extension(containing_type, field_number),
        )
    }

    fn services(&self) -> Vec<String> {
        self.reflection.list_services().unwrap_or_else(|e| {
            tracing::warn!("Failed to list services: {}", e);
            Vec::new()
        })
    }
}

/// Build the lookup surface selected by `config.mode`.
pub fn open_source(
    config: &ProxyConfig,
    host_address: &str,
    connection: &dyn Connection,
) -> Result<Box<dyn DescriptorSource>> {
    match config.mode {
        SourceMode::Cache => Ok(Box::new(DescriptorProxy::connect(
            config,
            host_address,
            connection,
        )?)),
        SourceMode::Reflection => Ok(Box::new(ReflectionDescriptorSource::new(
            connection.open_reflection()?,
        ))),
    }
}
