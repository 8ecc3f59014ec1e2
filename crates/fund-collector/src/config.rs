//! Configuration loading and resolution.

use crate::http::client::DEFAULT_USER_AGENT;
use crate::http::RetryPolicy;
use crate::sources::{SourceConfig, SourceKind};
use crate::types::{FundError, FundResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "FUND_COLLECTOR_CONFIG";

/// Config file picked up from the working directory when present.
pub const LOCAL_CONFIG: &str = "fund-collector.json";

/// Collector-wide settings plus per-source overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Per-request timeout.
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Maximum number of sources fetched at once.
    pub max_concurrency: usize,
    /// Retry policy for sources without their own.
    pub retry: RetryPolicy,
    pub sources: BTreeMap<SourceKind, SourceOverride>,
}

/// Optional per-source settings layered over the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOverride {
    pub base_url: Option<String>,
    pub detail_url: Option<String>,
    pub retry: Option<RetryPolicy>,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrency: 4,
            retry: RetryPolicy::default(),
            sources: BTreeMap::new(),
        }
    }
}

impl CollectorConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> FundResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| FundError::Config(format!("{}: {e}", path.display())))
    }

    /// Load from the resolved path, or fall back to defaults.
    pub fn resolve(explicit: Option<&str>) -> FundResult<Self> {
        match resolve_config_path(explicit) {
            Some(path) => {
                tracing::info!("loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Effective configuration for one source.
    pub fn source(&self, kind: SourceKind) -> SourceConfig {
        let mut config = SourceConfig::defaults_for(kind);
        config.retry = self.retry;

        if let Some(o) = self.sources.get(&kind) {
            if let Some(url) = &o.base_url {
                config.base_url = url.clone();
            }
            if o.detail_url.is_some() {
                config.detail_url = o.detail_url.clone();
            }
            if let Some(retry) = o.retry {
                config.retry = retry;
            }
            if let Some(page_size) = o.page_size {
                config.page_size = page_size;
            }
            if let Some(max_pages) = o.max_pages {
                config.max_pages = max_pages;
            }
        }
        config
    }

    /// Point one source at a different base URL.
    pub fn with_base_url(mut self, kind: SourceKind, url: impl Into<String>) -> Self {
        self.sources.entry(kind).or_default().base_url = Some(url.into());
        self
    }
}

/// Resolve the config file path.
///
/// Explicit path first, then [`CONFIG_ENV`], then [`LOCAL_CONFIG`] in the
/// working directory. `None` means built-in defaults.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    local.exists().then_some(local)
}
