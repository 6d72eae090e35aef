//! Fetching descriptor closures through a reflection endpoint

use crate::closure::closure;
use crate::codec::encode_record;
use crate::error::Result;
use descache_api::{FileDescriptorRecord, Host, ReflectionSource};
use serde_bytes::ByteBuf;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Outcome of a fetch pass.
#[derive(Debug, Default, Clone)]
pub struct Fetched {
    /// Declaring files of the resolved services plus their transitive dependencies.
    pub file_names: BTreeSet<String>,
    /// Serialized records, keyed by file name. Files the endpoint could not
    /// resolve are absent.
    pub blobs: BTreeMap<String, Vec<u8>>,
}

/// Per-pass memo so each file is requested from the endpoint at most once.
struct RecordMemo<'a, R: ReflectionSource + ?Sized> {
    reflection: &'a R,
    records: HashMap<String, Option<FileDescriptorRecord>>,
}

impl<'a, R: ReflectionSource + ?Sized> RecordMemo<'a, R> {
    fn new(reflection: &'a R) -> Self {
        Self {
            reflection,
            records: HashMap::new(),
        }
    }

    fn insert(&mut self, record: FileDescriptorRecord) {
        self.records.insert(record.name.clone(), Some(record));
    }

    fn resolve(&mut self, filename: &str) -> Option<&FileDescriptorRecord> {
        if !self.records.contains_key(filename) {
            let fetched = match self.reflection.file_by_filename(filename) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Failed to fetch descriptor file {}: {}", filename, e);
                    None
                }
            };
            self.records.insert(filename.to_string(), fetched);
        }
        self.records.get(filename).and_then(|r| r.as_ref())
    }

    fn dependencies_of(&mut self, filename: &str) -> Vec<String> {
        self.resolve(filename)
            .map(|r| r.dependencies.clone())
            .unwrap_or_default()
    }
}

fn declares_service(file: &FileDescriptorRecord, service: &str) -> bool {
    let service = service.strip_prefix('.').unwrap_or(service);
    file.service_names().any(|name| name == service)
}

/// Resolve every service's declaring file and its dependency closure.
///
/// Services the endpoint does not know are skipped.
pub fn fetch_all<R>(service_names: &[String], reflection: &R) -> Result<Fetched>
where
    R: ReflectionSource + ?Sized,
{
    let mut memo = RecordMemo::new(reflection);
    let mut fetched = Fetched::default();

    for service in service_names {
        let file = match reflection.file_containing_symbol(service) {
            Ok(Some(file)) if declares_service(&file, service) => file,
            Ok(Some(file)) => {
                tracing::debug!(
                    "Service {} resolved to {} which does not declare it, skipping",
                    service,
                    file.name
                );
                continue;
            }
            Ok(None) => {
                tracing::debug!("Service {} has no descriptor, skipping", service);
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to resolve service {}: {}", service, e);
                continue;
            }
        };

        // Already covered through an earlier service, closure included.
        if !fetched.file_names.insert(file.name.clone()) {
            continue;
        }

        let root_dependencies = file.dependencies.clone();
        memo.insert(file);
        let dependencies = closure(&root_dependencies, |name| memo.dependencies_of(name));
        fetched.file_names.extend(dependencies);
    }

    for name in &fetched.file_names {
        match memo.resolve(name) {
            Some(record) => {
                fetched.blobs.insert(name.clone(), encode_record(record)?);
            }
            None => tracing::warn!("Descriptor file {} could not be resolved, omitting", name),
        }
    }

    tracing::debug!(
        "Fetched {} descriptor files for {} services",
        fetched.blobs.len(),
        service_names.len()
    );
    Ok(fetched)
}

/// Build a brand-new host entry for `address` from the endpoint's current state.
pub fn repopulate<R>(address: &str, reflection: &R, now: i64) -> Result<Host>
where
    R: ReflectionSource + ?Sized,
{
    let service_names = reflection.list_services()?;
    let fetched = fetch_all(&service_names, reflection)?;

    let mut host = Host::new(address, now);
    host.service_names = service_names;
    host.descriptor_blobs = fetched.blobs.into_values().map(ByteBuf::from).collect();

    tracing::info!(
        "Repopulated {}: {} services, {} descriptor files",
        address,
        host.service_names.len(),
        host.descriptor_blobs.len()
    );
    Ok(host)
}
