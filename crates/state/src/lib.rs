//! Manages discovery configuration.
//!
//! This crate provides utilities for:
//! - Reading `SKILLSWAP_*` environment variables.
//! - Loading the optional discovery settings file.
//! - Resolving both against built-in defaults.

pub mod env;
pub mod settings;

pub use env::{home_dir, settings_file};
pub use settings::{
    load_settings_file, read_settings_file, DiscoverySettings, SettingsFile,
    DEFAULT_LOW_WATERMARK, DEFAULT_RECENCY_CAP, DEFAULT_REQUEST_EXPIRY, DEFAULT_SUGGESTION_LIMIT,
};
