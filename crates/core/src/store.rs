//! On-disk descriptor cache
//!
//! A single MessagePack file holding a [`DescriptorDb`]. Loading never fails:
//! a missing, empty, corrupt or outdated file yields an empty database and the
//! entries are fetched again.

use crate::codec::{decode_db, decode_record, encode_db};
use crate::error::Result;
use descache_api::models::CURRENT_VERSION;
use descache_api::{
    CacheStats, DescriptorCacheManager, DescriptorDb, Host, HostInspectResult, HostSummary,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// Read the cache at `path`, degrading to an empty database on any fault.
pub fn load(path: &Path) -> DescriptorDb {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No descriptor cache at {}", path.display());
            return DescriptorDb::new();
        }
        Err(e) => {
            tracing::warn!("Failed to read descriptor cache {}: {}", path.display(), e);
            return DescriptorDb::new();
        }
    };

    if bytes.is_empty() {
        tracing::debug!("Descriptor cache {} is empty", path.display());
        return DescriptorDb::new();
    }

    let mut db = match decode_db(&bytes) {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!(
                "Failed to parse descriptor cache {}: {}. Starting empty.",
                path.display(),
                e
            );
            return DescriptorDb::new();
        }
    };

    if db.version != CURRENT_VERSION {
        tracing::warn!(
            "Descriptor cache version mismatch at {} (found {}, expected {}). Starting empty.",
            path.display(),
            db.version,
            CURRENT_VERSION
        );
        return DescriptorDb::new();
    }

    let dropped = db.dedup_hosts();
    if dropped > 0 {
        tracing::warn!(
            "Dropped {} duplicate host entries from {}",
            dropped,
            path.display()
        );
    }

    tracing::debug!("Loaded {} host entries from {}", db.hosts.len(), path.display());
    db
}

/// Overwrite the cache at `path` with `db`.
///
/// The data goes to a sibling temp file first and is renamed into place, so
/// a failed write leaves the previous cache intact.
pub fn persist(path: &Path, db: &DescriptorDb) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = encode_db(db)?;

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, bytes)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    tracing::debug!("Saved {} host entries to {}", db.hosts.len(), path.display());
    Ok(())
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn fingerprint(host: &Host) -> String {
    let mut hasher = Xxh3::new();
    for blob in &host.descriptor_blobs {
        hasher.update(blob);
    }
    format!("{:016x}", hasher.digest())
}

pub fn summarize(host: &Host) -> HostSummary {
    HostSummary {
        address: host.address.clone(),
        last_update: host.last_update,
        service_count: host.service_names.len(),
        descriptor_count: host.descriptor_blobs.len(),
        payload_bytes: host.payload_bytes(),
        fingerprint: fingerprint(host),
    }
}

/// Handle on a cache file for inspection and maintenance.
#[derive(Debug, Clone)]
pub struct DescriptorStore {
    path: PathBuf,
}

impl DescriptorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> DescriptorDb {
        load(&self.path)
    }

    pub fn persist(&self, db: &DescriptorDb) -> Result<()> {
        persist(&self.path, db)
    }
}

impl DescriptorCacheManager for DescriptorStore {
    fn stats(&self) -> CacheStats {
        let db = self.load();
        CacheStats {
            cache_path: self.path.clone(),
            size_bytes: fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
            version: db.version,
            total_hosts: db.hosts.len(),
            total_descriptors: db.hosts.iter().map(|h| h.descriptor_blobs.len()).sum(),
        }
    }

    fn scan_hosts(&self) -> Vec<HostSummary> {
        self.load().hosts.iter().map(summarize).collect()
    }

    fn inspect_host(&self, address: &str) -> Option<HostInspectResult> {
        let db = self.load();
        let host = db.first_host(address)?;

        let mut files = Vec::new();
        let mut corrupt_blobs = 0;
        for blob in &host.descriptor_blobs {
            match decode_record(blob) {
                Ok(record) => files.push(record.name),
                Err(_) => corrupt_blobs += 1,
            }
        }
        files.sort();

        Some(HostInspectResult {
            summary: summarize(host),
            services: host.service_names.clone(),
            files,
            corrupt_blobs,
        })
    }

    fn clear(&self) -> std::result::Result<(), String> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_bytes::ByteBuf;
    use tempfile::TempDir;

    fn sample_db() -> DescriptorDb {
        let mut db = DescriptorDb::new();
        let mut a = Host::new("a:1", 100);
        a.service_names = vec!["pkg.A".into()];
        a.descriptor_blobs = vec![ByteBuf::from(vec![1u8, 2, 3])];
        db.hosts.push(a);
        db.hosts.push(Host::new("b:1", 200));
        db
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("cache.db");

        let db = sample_db();
        persist(&path, &db).unwrap();

        assert_eq!(load(&path).hosts, db.hosts);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_missing_empty_and_corrupt_load_empty() {
        let temp = TempDir::new().unwrap();

        let missing = temp.path().join("missing.db");
        assert!(load(&missing).hosts.is_empty());

        let empty = temp.path().join("empty.db");
        fs::write(&empty, b"").unwrap();
        assert!(load(&empty).hosts.is_empty());

        let corrupt = temp.path().join("corrupt.db");
        fs::write(&corrupt, b"\xc1 not a cache").unwrap();
        assert!(load(&corrupt).hosts.is_empty());
    }

    #[test]
    fn test_version_mismatch_loads_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.db");

        let mut db = sample_db();
        db.version = CURRENT_VERSION + 1;
        persist(&path, &db).unwrap();

        assert!(load(&path).hosts.is_empty());
    }

    #[test]
    fn test_load_collapses_duplicate_hosts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dups.db");

        let mut db = sample_db();
        db.hosts.push(Host::new("a:1", 300));
        persist(&path, &db).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.hosts.len(), 2);
        assert_eq!(loaded.first_host("a:1").unwrap().last_update, 300);
    }

    #[test]
    fn test_temp_path_never_aliases_cache() {
        let path = Path::new("/var/cache/descriptors.tmp");
        assert_eq!(temp_path_for(path), Path::new("/var/cache/descriptors.tmp.tmp"));
        assert_eq!(
            temp_path_for(Path::new("cache.db")),
            Path::new("cache.db.tmp")
        );
    }

    #[test]
    fn test_persist_to_tmp_named_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("descriptors.tmp");

        persist(&path, &sample_db()).unwrap();

        assert_eq!(load(&path).hosts, sample_db().hosts);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_persist_overwrites_previous_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache.db");

        persist(&path, &sample_db()).unwrap();
        persist(&path, &DescriptorDb::new()).unwrap();

        assert!(load(&path).hosts.is_empty());
    }

    #[test]
    fn test_store_stats_and_clear() {
        let temp = TempDir::new().unwrap();
        let store = DescriptorStore::new(temp.path().join("cache.db"));
        store.persist(&sample_db()).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_hosts, 2);
        assert_eq!(stats.total_descriptors, 1);
        assert!(stats.size_bytes > 0);

        let hosts = store.scan_hosts();
        assert_eq!(hosts[0].address, "a:1");
        assert_eq!(hosts[0].payload_bytes, 3);
        assert_eq!(hosts[0].fingerprint.len(), 16);

        let inspected = store.inspect_host("a:1").unwrap();
        assert_eq!(inspected.corrupt_blobs, 1);
        assert!(store.inspect_host("zzz:1").is_none());

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
