//! Request/response model and resource identity.
//!
//! ### URL Canonicalization
//! - Trim whitespace; resolve relative paths against the application origin
//! - Lowercase host, remove fragments
//! - Preserve query string

use bytes::Bytes;
use url::Url;

use crate::cache::hash::compute_cache_key;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for crate::Error {
    fn from(err: UrlError) -> Self {
        crate::Error::InvalidUrl(err.to_string())
    }
}

/// Canonicalize a URL string relative to the application origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve against `base` unless the input is absolute
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.contains("://") {
        Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
    } else {
        base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// An outgoing resource request issued by the hosted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
}

impl Request {
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Build a request from raw host input, canonicalizing the URL.
    pub fn parse(method: &str, input: &str, base: &Url) -> Result<Self, UrlError> {
        Ok(Self::new(method, canonicalize(input, base)?))
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn identity(&self) -> ResourceId {
        ResourceId { method: self.method.clone(), url: self.url.to_string() }
    }
}

/// The (method, normalized URL) pair used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub method: String,
    pub url: String,
}

impl ResourceId {
    /// Store key for this identity.
    pub fn key(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response, either fresh from the network or replayed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The URL the response was produced for
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Bytes,
}

impl Response {
    /// Mirrors the fetch `ok` flag: 200..=299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:5173").unwrap()
    }

    #[test]
    fn test_canonicalize_relative_path() {
        let url = canonicalize("/src/main.js", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5173/src/main.js");
    }

    #[test]
    fn test_canonicalize_root() {
        let url = canonicalize("/", &origin()).unwrap();
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_canonicalize_absolute_keeps_origin() {
        let url = canonicalize("https://CDNJS.cloudflare.com/ajax/libs/x.css", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("cdnjs.cloudflare.com"));
        assert_eq!(url.path(), "/ajax/libs/x.css");
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("/index.html#top", &origin()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("/api/data?b=2&a=1", &origin()).unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   ", &origin()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_request_method_normalized() {
        let req = Request::parse("get", "/", &origin()).unwrap();
        assert!(req.is_get());
        let req = Request::parse("post", "/api/data", &origin()).unwrap();
        assert!(!req.is_get());
        assert_eq!(req.method, "POST");
    }

    #[test]
    fn test_identity_ignores_fragment() {
        let a = Request::parse("GET", "/index.html", &origin()).unwrap();
        let b = Request::parse("GET", "/index.html#section", &origin()).unwrap();
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.identity().key(), b.identity().key());
    }

    #[test]
    fn test_response_success_range() {
        let mut resp = Response { url: "http://x/".into(), status: 200, headers: vec![], body: Bytes::new() };
        assert!(resp.is_success());
        resp.status = 299;
        assert!(resp.is_success());
        resp.status = 304;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }
}
