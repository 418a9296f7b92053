//! Request classification.
//!
//! Rules are checked in order and the first match wins:
//! 1. shell document paths -> cache-first, static
//! 2. source/component prefixes -> cache-first, static
//! 3. icon prefix -> cache-first, static
//! 4. CDN origin -> cache-first, static
//! 5. anything else -> network-first, dynamic
//!
//! Path rules match on the path alone, whatever the origin.

use infovault_core::{AppConfig, ConfigError, Request};
use serde::Serialize;
use url::{Origin, Url};

use crate::strategy::Strategy;

/// Which classification rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRule {
    Shell,
    Source,
    Icon,
    Cdn,
    Dynamic,
}

/// A strategy bound to a target generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub strategy: Strategy,
    pub generation: String,
    pub rule: RouteRule,
}

#[derive(Debug, Clone)]
pub struct Router {
    shell_paths: Vec<String>,
    source_prefixes: Vec<String>,
    icon_prefix: String,
    cdn_origin: Origin,
    static_generation: String,
    dynamic_generation: String,
}

impl Router {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let cdn = Url::parse(&config.cdn_origin)
            .map_err(|e| ConfigError::Invalid { field: "cdn_origin".into(), reason: e.to_string() })?;

        Ok(Self {
            shell_paths: config.shell_paths.clone(),
            source_prefixes: config.source_prefixes.clone(),
            icon_prefix: config.icon_prefix.clone(),
            cdn_origin: cdn.origin(),
            static_generation: config.static_generation(),
            dynamic_generation: config.dynamic_generation(),
        })
    }

    /// Classify a request. `None` means the engine declines it (non-GET) and
    /// the caller passes it through to the network untouched.
    pub fn classify(&self, request: &Request) -> Option<Route> {
        if !request.is_get() {
            return None;
        }

        let path = request.url.path();
        let rule = if self.shell_paths.iter().any(|p| p == path) {
            RouteRule::Shell
        } else if self.source_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            RouteRule::Source
        } else if path.starts_with(self.icon_prefix.as_str()) {
            RouteRule::Icon
        } else if request.url.origin() == self.cdn_origin {
            RouteRule::Cdn
        } else {
            RouteRule::Dynamic
        };

        let route = match rule {
            RouteRule::Dynamic => Route {
                strategy: Strategy::NetworkFirst,
                generation: self.dynamic_generation.clone(),
                rule,
            },
            _ => Route { strategy: Strategy::CacheFirst, generation: self.static_generation.clone(), rule },
        };
        Some(route)
    }
}
