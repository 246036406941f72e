//! Shared test utilities for skillswap crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the skillswap workspace.

use std::sync::{LazyLock, Mutex, MutexGuard};

use skillswap_matching::{CandidateProfile, RawCandidate};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = skillswap_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Build a rated profile offering `skills`.
pub fn profile(id: &str, skills: &[&str], rating: f64, rating_count: u32) -> CandidateProfile {
    CandidateProfile::new(id, skills.iter().map(|s| s.to_string()).collect())
        .with_rating(rating, rating_count)
}

/// Build an unrated profile with no skills; ranks purely by fetch order.
pub fn plain(id: &str) -> CandidateProfile {
    CandidateProfile::new(id, Vec::new())
}

/// Convert a validated profile back into the backend document shape.
pub fn raw(profile: &CandidateProfile) -> RawCandidate {
    RawCandidate {
        id: Some(profile.id.to_string()),
        name: Some(profile.name.clone()),
        skills: Some(profile.skills.clone()),
        rating: Some(profile.rating),
        rating_count: Some(profile.rating_count),
    }
}

/// Backend documents for `count` plain profiles named `{prefix}0..`.
pub fn raw_pool(prefix: &str, count: usize) -> Vec<RawCandidate> {
    (0..count)
        .map(|i| raw(&plain(&format!("{prefix}{i}"))))
        .collect()
}
