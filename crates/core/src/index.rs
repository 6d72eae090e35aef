//! In-memory descriptor index
//!
//! Files are keyed by name and never replaced once present; symbol and
//! extension tables point back at the owning file.

use crate::codec::decode_record;
use crate::error::Result;
use descache_api::{FileDescriptorRecord, Host};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct DescriptorIndex {
    files: HashMap<String, FileDescriptorRecord>,
    symbols: HashMap<String, String>,
    extensions: HashMap<(String, i32), String>,
}

/// Counters reported by [`DescriptorIndex::merge_host`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub duplicates: usize,
    pub corrupt: usize,
}

fn normalize(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}

impl DescriptorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sorted names of all indexed files.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Insert `record` unless a file with the same name is already indexed.
    ///
    /// Returns whether the record was inserted.
    pub fn add(&mut self, record: FileDescriptorRecord) -> bool {
        if self.files.contains_key(&record.name) {
            return false;
        }

        for symbol in record.declared_symbols() {
            if let Some(owner) = self.symbols.get(&symbol) {
                tracing::debug!(
                    "Symbol {} from {} already declared by {}",
                    symbol,
                    record.name,
                    owner
                );
                continue;
            }
            self.symbols.insert(symbol, record.name.clone());
        }
        for ext in &record.extensions {
            self.extensions
                .entry((normalize(&ext.extendee).to_string(), ext.number))
                .or_insert_with(|| record.name.clone());
        }

        self.files.insert(record.name.clone(), record);
        true
    }

    /// Decode a serialized record and [`add`](Self::add) it.
    pub fn add_blob(&mut self, blob: &[u8]) -> Result<bool> {
        Ok(self.add(decode_record(blob)?))
    }

    /// Merge every descriptor blob of `host`.
    ///
    /// Already-indexed files are skipped; blobs that fail to decode are
    /// logged and skipped.
    pub fn merge_host(&mut self, host: &Host) -> MergeStats {
        let mut stats = MergeStats::default();
        for blob in &host.descriptor_blobs {
            match self.add_blob(blob) {
                Ok(true) => stats.added += 1,
                Ok(false) => stats.duplicates += 1,
                Err(e) => {
                    tracing::warn!("Skipping corrupt descriptor blob for {}: {}", host.address, e);
                    stats.corrupt += 1;
                }
            }
        }
        stats
    }

    pub fn find_file_by_name(&self, filename: &str) -> Option<&FileDescriptorRecord> {
        self.files.get(filename)
    }

    /// Exact symbol match first, then the closest enclosing declaration, so
    /// `pkg.Greeter.SayHello` resolves to the file declaring `pkg.Greeter`.
    pub fn find_file_containing_symbol(&self, symbol_name: &str) -> Option<&FileDescriptorRecord> {
        let mut candidate = normalize(symbol_name);
        loop {
            if let Some(file) = self.symbols.get(candidate) {
                return self.files.get(file);
            }
            match candidate.rsplit_once('.') {
                Some((parent, _)) => candidate = parent,
                None => return None,
            }
        }
    }

    pub fn find_file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> Option<&FileDescriptorRecord> {
        self.extensions
            .get(&(normalize(containing_type).to_string(), field_number))
            .and_then(|file| self.files.get(file))
    }

    /// Sorted field numbers of all known extensions of `containing_type`.
    pub fn find_all_extension_numbers(&self, containing_type: &str) -> Vec<i32> {
        let target = normalize(containing_type);
        let mut numbers: Vec<i32> = self
            .extensions
            .keys()
            .filter(|(extendee, _)| extendee == target)
            .map(|(_, number)| *number)
            .collect();
        numbers.sort_unstable();
        numbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_record;
    use descache_api::{ExtensionRecord, MessageRecord, MethodRecord, ServiceRecord};
    use serde_bytes::ByteBuf;

    fn greeter_file() -> FileDescriptorRecord {
        let mut file = FileDescriptorRecord::new("greeter.proto", "demo");
        file.dependencies.push("common.proto".into());
        file.messages.push(MessageRecord {
            name: "HelloRequest".into(),
            ..Default::default()
        });
        file.services.push(ServiceRecord {
            name: "Greeter".into(),
            methods: vec![MethodRecord {
                name: "SayHello".into(),
                input_type: "demo.HelloRequest".into(),
                output_type: "demo.HelloRequest".into(),
                client_streaming: false,
                server_streaming: false,
            }],
        });
        file.extensions.push(ExtensionRecord {
            name: "tag".into(),
            extendee: "google.protobuf.MessageOptions".into(),
            number: 50001,
        });
        file
    }

    fn host_with(records: &[FileDescriptorRecord]) -> Host {
        let mut host = Host::new("h:1", 0);
        host.descriptor_blobs = records
            .iter()
            .map(|r| ByteBuf::from(encode_record(r).unwrap()))
            .collect();
        host
    }

    #[test]
    fn test_add_is_idempotent_by_name() {
        let mut index = DescriptorIndex::new();
        assert!(index.add(greeter_file()));

        let mut other = FileDescriptorRecord::new("greeter.proto", "changed");
        other.dependencies.push("x.proto".into());
        assert!(!index.add(other));

        assert_eq!(index.len(), 1);
        assert_eq!(index.find_file_by_name("greeter.proto").unwrap().package, "demo");
    }

    #[test]
    fn test_merge_twice_keeps_size() {
        let host = host_with(&[greeter_file(), FileDescriptorRecord::new("common.proto", "demo")]);
        let mut index = DescriptorIndex::new();

        let first = index.merge_host(&host);
        assert_eq!(first.added, 2);

        let second = index.merge_host(&host);
        assert_eq!(second, MergeStats { added: 0, duplicates: 2, corrupt: 0 });
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_corrupt_blob_is_skipped() {
        let mut host = host_with(&[greeter_file()]);
        host.descriptor_blobs.insert(0, ByteBuf::from(vec![0xc1u8]));

        let mut index = DescriptorIndex::new();
        let stats = index.merge_host(&host);
        assert_eq!(stats.corrupt, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_symbol_lookup_resolves_members() {
        let mut index = DescriptorIndex::new();
        index.add(greeter_file());

        for symbol in ["demo.Greeter", ".demo.Greeter", "demo.Greeter.SayHello", "demo.HelloRequest"] {
            assert_eq!(
                index.find_file_containing_symbol(symbol).map(|f| f.name.as_str()),
                Some("greeter.proto"),
                "{symbol}"
            );
        }
        assert!(index.find_file_containing_symbol("demo.Missing").is_none());
        assert!(index.find_file_containing_symbol("other").is_none());
    }

    #[test]
    fn test_extension_lookup() {
        let mut index = DescriptorIndex::new();
        index.add(greeter_file());

        assert!(index
            .find_file_containing_extension(".google.protobuf.MessageOptions", 50001)
            .is_some());
        assert!(index
            .find_file_containing_extension("google.protobuf.MessageOptions", 1)
            .is_none());
        assert_eq!(
            index.find_all_extension_numbers("google.protobuf.MessageOptions"),
            vec![50001]
        );
    }
}
