//! Proxy configuration
//!
//! Defaults can be overridden through `DESCACHE_DB` (cache file path),
//! `DESCACHE_TTL_SECS` (freshness window) and `DESCACHE_LOG_DIR`.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_DIR: &str = ".descache";
pub const DEFAULT_DB_FILE: &str = "descriptors.db";

/// Freshness window applied to cached host entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

pub const ENV_DB_PATH: &str = "DESCACHE_DB";
pub const ENV_TTL_SECS: &str = "DESCACHE_TTL_SECS";
pub const ENV_LOG_DIR: &str = "DESCACHE_LOG_DIR";

/// Where lookups are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Serve from the local cache, refreshing it through reflection when stale.
    #[default]
    Cache,
    /// Forward every lookup to the reflection endpoint.
    Reflection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub cache_path: PathBuf,
    pub ttl: Duration,
    pub mode: SourceMode,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            ttl: DEFAULT_TTL,
            mode: SourceMode::Cache,
        }
    }
}

impl ProxyConfig {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            ..Self::default()
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            config.cache_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var(ENV_TTL_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.ttl = Duration::from_secs(secs),
                Err(_) => tracing::warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    ENV_TTL_SECS,
                    raw,
                    DEFAULT_TTL.as_secs()
                ),
            }
        }
        config
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

/// `~/.descache`, or `./.descache` when no home directory is known.
pub fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_BASE_DIR)
}

pub fn default_cache_path() -> PathBuf {
    base_dir().join(DEFAULT_DB_FILE)
}

/// Log directory: `DESCACHE_LOG_DIR`, else `logs/` next to a `DESCACHE_DB`
/// cache, else `~/.descache/logs`.
pub fn log_dir() -> PathBuf {
    resolve_log_dir(
        std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        std::env::var_os(ENV_DB_PATH).map(PathBuf::from),
    )
}

fn resolve_log_dir(explicit: Option<PathBuf>, cache_path: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    cache_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| base_dir().join("logs"))
}
