/*!
 * Runtime Settings
 * Defaults overlaid with environment variables, then command-line flags
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::core::limits::{CACHE_EVICTION_SLACK, DEFAULT_RULES_PATH};

/// Rules document location
pub const ENV_RULES: &str = "NXFS_RULES";
/// Fixed cache budget in bytes instead of free system memory
pub const ENV_CACHE_LIMIT: &str = "NXFS_CACHE_LIMIT";
/// Eviction slack in bytes
pub const ENV_CACHE_SLACK: &str = "NXFS_CACHE_SLACK";
/// `1` or `true` switches logs to JSON
pub const ENV_TRACE_JSON: &str = "NXFS_TRACE_JSON";

/// Content cache tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Eviction stops once the remaining deficit is at or below this
    pub eviction_slack: u64,
    /// Fixed budget; `None` probes free system memory
    pub memory_limit: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            eviction_slack: CACHE_EVICTION_SLACK,
            memory_limit: None,
        }
    }
}

/// Everything needed to build and serve one virtual tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NxfsConfig {
    pub source_path: Option<PathBuf>,
    pub rules_path: PathBuf,
    pub mount_point: Option<PathBuf>,
    pub cache: CacheConfig,
    pub trace_json: bool,
}

impl Default for NxfsConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            rules_path: PathBuf::from(DEFAULT_RULES_PATH),
            mount_point: None,
            cache: CacheConfig::default(),
            trace_json: false,
        }
    }
}

impl NxfsConfig {
    /// Defaults overlaid with `NXFS_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values produced by `lookup`; unparsable numbers are logged and ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rules) = lookup(ENV_RULES).filter(|v| !v.is_empty()) {
            self.rules_path = PathBuf::from(rules);
        }
        if let Some(limit) = parse_bytes(ENV_CACHE_LIMIT, lookup(ENV_CACHE_LIMIT)) {
            self.cache.memory_limit = Some(limit);
        }
        if let Some(slack) = parse_bytes(ENV_CACHE_SLACK, lookup(ENV_CACHE_SLACK)) {
            self.cache.eviction_slack = slack;
        }
        if let Some(json) = lookup(ENV_TRACE_JSON) {
            self.trace_json = json == "1" || json == "true";
        }
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = path.into();
        self
    }

    pub fn with_mount_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_point = Some(path.into());
        self
    }
}

fn parse_bytes(key: &str, value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse() {
        Ok(bytes) => Some(bytes),
        Err(_) => {
            warn!(variable = key, value = %value, "Ignoring non-numeric setting");
            None
        }
    }
}
