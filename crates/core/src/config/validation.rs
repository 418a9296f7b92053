//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` or `cdn_origin` is not an http(s) URL
    /// - `cache_prefix` or `cache_version` is empty
    /// - `manifest` is empty
    /// - a shell path, source prefix, icon prefix or the fallback path is not absolute
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("origin", &self.origin), ("cdn_origin", &self.cdn_origin)] {
            let url = Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(field, "must be an http or https URL"));
            }
        }

        if self.cache_prefix.is_empty() {
            return Err(invalid("cache_prefix", "must not be empty"));
        }
        if self.cache_version.is_empty() {
            return Err(invalid("cache_version", "must not be empty"));
        }

        if self.manifest.is_empty() {
            return Err(invalid("manifest", "must list at least one resource"));
        }

        for path in &self.shell_paths {
            if !path.starts_with('/') {
                return Err(invalid("shell_paths", format!("{path:?} must start with '/'")));
            }
        }
        for prefix in &self.source_prefixes {
            if !prefix.starts_with('/') {
                return Err(invalid("source_prefixes", format!("{prefix:?} must start with '/'")));
            }
        }
        if !self.icon_prefix.starts_with('/') {
            return Err(invalid("icon_prefix", "must start with '/'"));
        }
        if !self.fallback_path.starts_with('/') {
            return Err(invalid("fallback_path", "must start with '/'"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !self.manifest.iter().any(|entry| entry == &self.fallback_path) {
            tracing::warn!(
                fallback_path = %self.fallback_path,
                "fallback_path is not in the manifest; offline fallback only works once it has been cached"
            );
        }

        Ok(())
    }
}
