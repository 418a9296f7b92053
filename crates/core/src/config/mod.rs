//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (INFOVAULT_*)
//! 2. TOML config file (if INFOVAULT_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is injected into the worker at construction; nothing
//! reads ambient globals afterwards.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (INFOVAULT_*)
/// 2. TOML config file (if INFOVAULT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the hosted application is served from. Relative request
    /// paths and manifest entries resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Generation name prefix.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag baked into both active generation names. Bumping it
    /// makes activation drop every older generation.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Resources that must be in the static generation after install.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Paths answered from the static generation first (the app shell).
    #[serde(default = "default_shell_paths")]
    pub shell_paths: Vec<String>,

    /// Shell document served when a cache-first fetch fails outright.
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,

    /// Path prefixes of source and component files.
    #[serde(default = "default_source_prefixes")]
    pub source_prefixes: Vec<String>,

    /// Path prefix of icon assets.
    #[serde(default = "default_icon_prefix")]
    pub icon_prefix: String,

    /// External CDN origin whose resources are treated as static.
    #[serde(default = "default_cdn_origin")]
    pub cdn_origin: String,

    /// Title used for push notifications without one.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Sync tag that triggers the background-sync broadcast.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network layer timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://localhost:5173".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./infovault-cache.sqlite")
}

fn default_cache_prefix() -> String {
    "infovault".into()
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/src/main.js",
        "/src/App.vue",
        "/src/style.css",
        "/src/components/TabBar.vue",
        "/src/components/SearchBar.vue",
        "/src/components/InfoCard.vue",
        "/src/components/EmptyState.vue",
        "/src/components/AddInfoModal.vue",
        "/src/components/ViewInfoModal.vue",
        "/src/components/Toast.vue",
        "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_shell_paths() -> Vec<String> {
    vec!["/".into(), "/index.html".into()]
}

fn default_fallback_path() -> String {
    "/index.html".into()
}

fn default_source_prefixes() -> Vec<String> {
    vec!["/src/".into(), "/components/".into()]
}

fn default_icon_prefix() -> String {
    "/icons/".into()
}

fn default_cdn_origin() -> String {
    "https://cdnjs.cloudflare.com".into()
}

fn default_app_name() -> String {
    "InfoVault".into()
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_user_agent() -> String {
    "infovault-worker/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            manifest: default_manifest(),
            shell_paths: default_shell_paths(),
            fallback_path: default_fallback_path(),
            source_prefixes: default_source_prefixes(),
            icon_prefix: default_icon_prefix(),
            cdn_origin: default_cdn_origin(),
            app_name: default_app_name(),
            sync_tag: default_sync_tag(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Name of the active static generation, e.g. `infovault-static-v1.0.0`.
    pub fn static_generation(&self) -> String {
        format!("{}-static-{}", self.cache_prefix, self.cache_version)
    }

    /// Name of the active dynamic generation, e.g. `infovault-dynamic-v1.0.0`.
    pub fn dynamic_generation(&self) -> String {
        format!("{}-dynamic-{}", self.cache_prefix, self.cache_version)
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The application origin as a parsed URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `INFOVAULT_`
    /// 2. TOML file from `INFOVAULT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("INFOVAULT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("INFOVAULT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://localhost:5173");
        assert_eq!(config.db_path, PathBuf::from("./infovault-cache.sqlite"));
        assert_eq!(config.manifest.len(), 13);
        assert_eq!(config.shell_paths, vec!["/", "/index.html"]);
        assert_eq!(config.fallback_path, "/index.html");
        assert_eq!(config.cdn_origin, "https://cdnjs.cloudflare.com");
        assert_eq!(config.sync_tag, "background-sync");
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_generation_names() {
        let config = AppConfig::default();
        assert_eq!(config.static_generation(), "infovault-static-v1.0.0");
        assert_eq!(config.dynamic_generation(), "infovault-dynamic-v1.0.0");
    }

    #[test]
    fn test_version_bump_renames_generations() {
        let config = AppConfig { cache_version: "v1.0.1".into(), ..Default::default() };
        assert_eq!(config.static_generation(), "infovault-static-v1.0.1");
        assert_eq!(config.dynamic_generation(), "infovault-dynamic-v1.0.1");
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_origin_url() {
        let config = AppConfig::default();
        assert_eq!(config.origin_url().unwrap().as_str(), "http://localhost:5173/");

        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("worker.toml", "cache_version = \"v2\"\napp_name = \"Vault\"")?;
            jail.set_env("INFOVAULT_CONFIG_FILE", "worker.toml");
            jail.set_env("INFOVAULT_APP_NAME", "EnvVault");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_version, "v2");
            assert_eq!(config.app_name, "EnvVault");
            assert_eq!(config.static_generation(), "infovault-static-v2");
            Ok(())
        });
    }
}
