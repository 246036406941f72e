//! Discovery settings.
//!
//! Each value resolves from, in order:
//! - its `SKILLSWAP_*` environment variable
//! - the settings file (`$SKILLSWAP_SETTINGS` or `~/.skillswap/discovery.toml`)
//! - the built-in default

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::env;

pub const DEFAULT_LOW_WATERMARK: usize = 3;
pub const DEFAULT_RECENCY_CAP: usize = 30;
pub const DEFAULT_REQUEST_EXPIRY: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Tunables for one discovery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// Replenish in the background once this many candidates remain queued.
    pub low_watermark: usize,
    /// Recency window size when the eligible total is unknown or adaptive
    /// sizing is off.
    pub recency_cap: usize,
    /// Size the recency window to `max(1, eligible - 2)` once a load has
    /// revealed how many candidates are eligible.
    pub adaptive_recency: bool,
    /// How long a pending connection request keeps excluding a candidate.
    pub request_expiry: Duration,
    /// Length of the "suggested for you" list.
    pub suggestion_limit: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            low_watermark: DEFAULT_LOW_WATERMARK,
            recency_cap: DEFAULT_RECENCY_CAP,
            adaptive_recency: true,
            request_expiry: DEFAULT_REQUEST_EXPIRY,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// Settings file contents. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub low_watermark: Option<usize>,
    #[serde(default)]
    pub recency_cap: Option<usize>,
    #[serde(default)]
    pub adaptive_recency: Option<bool>,
    #[serde(default)]
    pub request_expiry_secs: Option<u64>,
    #[serde(default)]
    pub suggestion_limit: Option<usize>,
}

/// Parse a settings file. A missing file yields empty settings.
pub fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Load the settings file from its default location, logging and ignoring
/// anything unreadable.
pub fn load_settings_file() -> SettingsFile {
    let Some(path) = env::settings_file() else {
        return SettingsFile::default();
    };
    match read_settings_file(&path) {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to load discovery settings"
            );
            SettingsFile::default()
        }
    }
}

impl DiscoverySettings {
    /// Resolve settings from the environment, the settings file and defaults.
    pub fn load() -> Self {
        Self::resolve(&load_settings_file())
    }

    /// Resolve settings against an already-parsed file.
    pub fn resolve(file: &SettingsFile) -> Self {
        let defaults = Self::default();
        Self {
            low_watermark: env::env_low_watermark()
                .or(file.low_watermark)
                .unwrap_or(defaults.low_watermark),
            recency_cap: env::env_recency_cap()
                .or(file.recency_cap)
                .unwrap_or(defaults.recency_cap),
            adaptive_recency: env::env_adaptive_recency()
                .or(file.adaptive_recency)
                .unwrap_or(defaults.adaptive_recency),
            request_expiry: env::env_request_expiry()
                .or(file.request_expiry_secs.map(Duration::from_secs))
                .unwrap_or(defaults.request_expiry),
            suggestion_limit: env::env_suggestion_limit()
                .or(file.suggestion_limit)
                .unwrap_or(defaults.suggestion_limit),
        }
        .normalized()
    }

    /// Clamp values that would stall the queue: the recency window always
    /// holds at least one id.
    pub fn normalized(mut self) -> Self {
        self.recency_cap = self.recency_cap.max(1);
        self
    }

    pub fn with_low_watermark(mut self, low_watermark: usize) -> Self {
        self.low_watermark = low_watermark;
        self
    }

    pub fn with_recency_cap(mut self, recency_cap: usize) -> Self {
        self.recency_cap = recency_cap.max(1);
        self
    }

    pub fn with_adaptive_recency(mut self, adaptive: bool) -> Self {
        self.adaptive_recency = adaptive;
        self
    }

    pub fn with_request_expiry(mut self, expiry: Duration) -> Self {
        self.request_expiry = expiry;
        self
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }
}
