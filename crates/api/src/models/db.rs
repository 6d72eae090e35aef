use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

/// Current on-disk format of [`DescriptorDb`].
pub const CURRENT_VERSION: u32 = 1;

/// Cached reflection results for one remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    /// Unix timestamp (seconds) of the last successful repopulation.
    pub last_update: i64,
    pub service_names: Vec<String>,
    /// Serialized [`FileDescriptorRecord`](super::FileDescriptorRecord)s.
    pub descriptor_blobs: Vec<ByteBuf>,
}

impl Host {
    pub fn new(address: impl Into<String>, last_update: i64) -> Self {
        Self {
            address: address.into(),
            last_update,
            service_names: Vec::new(),
            descriptor_blobs: Vec::new(),
        }
    }

    pub fn payload_bytes(&self) -> usize {
        self.descriptor_blobs.iter().map(|b| b.len()).sum()
    }
}

/// Root record of the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorDb {
    pub version: u32,
    pub hosts: Vec<Host>,
}

impl Default for DescriptorDb {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            hosts: Vec::new(),
        }
    }
}

impl DescriptorDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries for `address`, in file order.
    pub fn hosts_for<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a Host> + 'a {
        self.hosts.iter().filter(move |h| h.address == address)
    }

    pub fn first_host(&self, address: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.address == address)
    }

    /// Install `host` as the only entry for its address.
    ///
    /// Entries for other addresses keep their relative order; the new entry
    /// is appended at the end.
    pub fn replace_host(&mut self, host: Host) {
        self.hosts.retain(|h| h.address != host.address);
        self.hosts.push(host);
    }

    /// Collapse repeated addresses, keeping the last entry written for each.
    ///
    /// Returns the number of entries dropped.
    pub fn dedup_hosts(&mut self) -> usize {
        let before = self.hosts.len();
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<Host> = Vec::with_capacity(before);
        for host in std::mem::take(&mut self.hosts).into_iter().rev() {
            if seen.insert(host.address.clone()) {
                kept.push(host);
            }
        }
        kept.reverse();
        self.hosts = kept;
        before - self.hosts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(address: &str, last_update: i64, service: &str) -> Host {
        let mut h = Host::new(address, last_update);
        h.service_names.push(service.to_string());
        h
    }

    #[test]
    fn test_replace_host_keeps_other_addresses() {
        let mut db = DescriptorDb::new();
        db.hosts.push(host("a:1", 10, "A"));
        db.hosts.push(host("b:1", 10, "B"));

        db.replace_host(host("a:1", 20, "A2"));

        assert_eq!(db.hosts.len(), 2);
        assert_eq!(db.hosts[0].address, "b:1");
        assert_eq!(db.hosts[1].service_names, vec!["A2"]);
    }

    #[test]
    fn test_dedup_keeps_last_entry() {
        let mut db = DescriptorDb::new();
        db.hosts.push(host("a:1", 10, "old"));
        db.hosts.push(host("b:1", 10, "B"));
        db.hosts.push(host("a:1", 30, "new"));

        assert_eq!(db.dedup_hosts(), 1);
        assert_eq!(db.hosts.len(), 2);
        assert_eq!(db.hosts[0].address, "b:1");
        assert_eq!(db.first_host("a:1").unwrap().service_names, vec!["new"]);
    }
}
