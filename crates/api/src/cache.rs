use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one cached host entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSummary {
    pub address: String,
    pub last_update: i64,
    pub service_count: usize,
    pub descriptor_count: usize,
    pub payload_bytes: usize,
    /// xxh3 over all descriptor blobs, hex encoded
    pub fingerprint: String,
}

/// Detailed inspection result for a cached host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInspectResult {
    pub summary: HostSummary,
    pub services: Vec<String>,
    pub files: Vec<String>,
    /// Blobs that could not be decoded
    pub corrupt_blobs: usize,
}

/// Statistics for a descriptor cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_path: PathBuf,
    pub size_bytes: u64,
    pub version: u32,
    pub total_hosts: usize,
    pub total_descriptors: usize,
}

/// Service interface for managing a descriptor cache file
pub trait DescriptorCacheManager {
    /// Get cache statistics
    fn stats(&self) -> CacheStats;

    /// Summaries of every host entry in file order
    fn scan_hosts(&self) -> Vec<HostSummary>;

    /// Inspect the entry for a host address
    fn inspect_host(&self, address: &str) -> Option<HostInspectResult>;

    /// Remove the cache file
    fn clear(&self) -> Result<(), String>;
}
