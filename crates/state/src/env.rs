use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV: &str = "SKILLSWAP_SETTINGS";
pub const LOW_WATERMARK_ENV: &str = "SKILLSWAP_LOW_WATERMARK";
pub const RECENCY_CAP_ENV: &str = "SKILLSWAP_RECENCY_CAP";
pub const ADAPTIVE_RECENCY_ENV: &str = "SKILLSWAP_ADAPTIVE_RECENCY";
pub const REQUEST_EXPIRY_ENV: &str = "SKILLSWAP_REQUEST_EXPIRY_SECS";
pub const SUGGESTION_LIMIT_ENV: &str = "SKILLSWAP_SUGGESTION_LIMIT";

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Returns the path to the discovery settings file.
///
/// `SKILLSWAP_SETTINGS` wins; otherwise `~/.skillswap/discovery.toml`.
pub fn settings_file() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var(SETTINGS_ENV) {
        return Some(PathBuf::from(custom));
    }
    home_dir()
        .ok()
        .map(|h| h.join(".skillswap/discovery.toml"))
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Returns the queue low watermark from `SKILLSWAP_LOW_WATERMARK`.
pub fn env_low_watermark() -> Option<usize> {
    env_usize(LOW_WATERMARK_ENV)
}

/// Returns the fixed recency window size from `SKILLSWAP_RECENCY_CAP`.
pub fn env_recency_cap() -> Option<usize> {
    env_usize(RECENCY_CAP_ENV)
}

/// Returns the `SKILLSWAP_ADAPTIVE_RECENCY` flag if set.
///
/// Only `1`/`true` and `0`/`false` are recognised.
pub fn env_adaptive_recency() -> Option<bool> {
    let raw = std::env::var(ADAPTIVE_RECENCY_ENV).ok()?;
    let raw = raw.trim();
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Returns the pending-request expiry from `SKILLSWAP_REQUEST_EXPIRY_SECS`.
pub fn env_request_expiry() -> Option<Duration> {
    std::env::var(REQUEST_EXPIRY_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Returns the suggestion list length from `SKILLSWAP_SUGGESTION_LIMIT`.
pub fn env_suggestion_limit() -> Option<usize> {
    env_usize(SUGGESTION_LIMIT_ENV)
}
