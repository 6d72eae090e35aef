//! In-memory reflection endpoint
//!
//! Replays a fixed set of descriptor files as if they were served by a remote
//! reflection endpoint. Snapshots are written as JSON:
//!
//! ```json
//! { "services": ["demo.Greeter"], "files": [{ "name": "greeter.proto", ... }] }
//! ```
//!
//! When `services` is omitted, every service declared in `files` is listed.

use crate::error::Result;
use crate::index::DescriptorIndex;
use descache_api::{
    ApiError, ApiResult, Connection, FileDescriptorRecord, ReflectionSource,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Serialized form of a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectionSnapshot {
    #[serde(default)]
    pub services: Option<Vec<String>>,
    #[serde(default)]
    pub files: Vec<FileDescriptorRecord>,
}

/// Number of requests served, per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_services: usize,
    pub file_by_filename: usize,
    pub file_containing_symbol: usize,
    pub file_containing_extension: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_services
            + self.file_by_filename
            + self.file_containing_symbol
            + self.file_containing_extension
    }
}

#[derive(Debug, Default)]
struct Counters {
    list_services: AtomicUsize,
    file_by_filename: AtomicUsize,
    file_containing_symbol: AtomicUsize,
    file_containing_extension: AtomicUsize,
}

#[derive(Debug)]
struct Inner {
    services: Vec<String>,
    index: DescriptorIndex,
    counters: Counters,
    offline: AtomicBool,
}

/// Reflection endpoint backed by a [`ReflectionSnapshot`].
///
/// Clones share call counters, so a test can keep a handle while the proxy
/// owns another.
#[derive(Debug, Clone)]
pub struct SnapshotReflection {
    inner: Arc<Inner>,
}

impl SnapshotReflection {
    pub fn new(snapshot: ReflectionSnapshot) -> Self {
        let mut index = DescriptorIndex::new();
        let mut declared = Vec::new();
        for file in snapshot.files {
            declared.extend(file.service_names());
            if !index.add(file) {
                tracing::warn!("Snapshot lists a descriptor file twice, keeping the first");
            }
        }

        Self {
            inner: Arc::new(Inner {
                services: snapshot.services.unwrap_or(declared),
                index,
                counters: Counters::default(),
                offline: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_files(files: Vec<FileDescriptorRecord>) -> Self {
        Self::new(ReflectionSnapshot {
            services: None,
            files,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// While offline, every request fails as if the endpoint were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.inner.counters;
        CallCounts {
            list_services: c.list_services.load(Ordering::SeqCst),
            file_by_filename: c.file_by_filename.load(Ordering::SeqCst),
            file_containing_symbol: c.file_containing_symbol.load(Ordering::SeqCst),
            file_containing_extension: c.file_containing_extension.load(Ordering::SeqCst),
        }
    }

    fn serve(&self, counter: &AtomicUsize) -> ApiResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("snapshot endpoint is offline".into()));
        }
        Ok(())
    }
}

impl ReflectionSource for SnapshotReflection {
    fn list_services(&self) -> ApiResult<Vec<String>> {
        self.serve(&self.inner.counters.list_services)?;
        Ok(self.inner.services.clone())
    }

    fn file_by_filename(&self, filename: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        self.serve(&self.inner.counters.file_by_filename)?;
        Ok(self.inner.index.find_file_by_name(filename).cloned())
    }

    fn file_containing_symbol(&self, symbol: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        self.serve(&self.inner.counters.file_containing_symbol)?;
        Ok(self.inner.index.find_file_containing_symbol(symbol).cloned())
    }

    fn file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> ApiResult<Option<FileDescriptorRecord>> {
        self.serve(&self.inner.counters.file_containing_extension)?;
        Ok(self
            .inner
            .index
            .find_file_containing_extension(containing_type, field_number)
            .cloned())
    }
}

/// Connection handing out clones of a snapshot endpoint, or failing to open
/// when none is configured.
#[derive(Debug, Clone, Default)]
pub struct SnapshotConnection {
    reflection: Option<SnapshotReflection>,
}

impl SnapshotConnection {
    pub fn new(reflection: SnapshotReflection) -> Self {
        Self {
            reflection: Some(reflection),
        }
    }

    /// A connection whose reflection capability cannot be opened.
    pub fn refused() -> Self {
        Self { reflection: None }
    }
}

impl Connection for SnapshotConnection {
    fn open_reflection(&self) -> ApiResult<Box<dyn ReflectionSource>> {
        match &self.reflection {
            Some(r) => Ok(Box::new(r.clone())),
            None => Err(ApiError::Unavailable(
                "reflection is not enabled on this connection".into(),
            )),
        }
    }
}
