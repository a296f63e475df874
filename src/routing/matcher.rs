//! Location matching conditions.
//!
//! Conditions see a [`RequestTarget`], the host and path pulled out of the
//! request once, rather than the request itself.
//!
//! # Design Decisions
//! - Host comparison is case-insensitive and ignores any port
//! - Path comparison is a case-sensitive prefix
//! - A location's conditions must all hold

use axum::http::{header::HOST, Request};

/// The parts of a request that locations match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    /// Lowercased host without port, from `Host` or the absolute URI.
    pub host: Option<String>,
    pub path: &'a str,
}

impl<'a> RequestTarget<'a> {
    pub fn of<B>(req: &'a Request<B>) -> Self {
        let host = req
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().host())
            .map(strip_port)
            .map(str::to_ascii_lowercase);

        Self {
            host,
            path: req.uri().path(),
        }
    }
}

fn strip_port(authority: &str) -> &str {
    // Bracketed IPv6 literals carry colons of their own.
    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    authority.split(':').next().unwrap_or(authority)
}

/// One condition a request must satisfy.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    fn matches(&self, target: &RequestTarget<'_>) -> bool;
}

#[derive(Debug, Clone)]
pub struct HostMatcher {
    host: String,
}

impl HostMatcher {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        target.host.as_deref() == Some(self.host.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix length, used to prefer the most specific location.
    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        target.path.starts_with(&self.prefix)
    }
}

/// All conditions of a location.
#[derive(Debug, Default)]
pub struct AllOf {
    conditions: Vec<Box<dyn Matcher>>,
}

impl AllOf {
    pub fn new(conditions: Vec<Box<dyn Matcher>>) -> Self {
        Self { conditions }
    }
}

impl Matcher for AllOf {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, host: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header("host", host);
        }
        builder.body(()).unwrap()
    }

    fn host_of(uri: &str, host: Option<&str>) -> Option<String> {
        RequestTarget::of(&request(uri, host)).host
    }

    fn check(matcher: &dyn Matcher, uri: &str, host: Option<&str>) -> bool {
        matcher.matches(&RequestTarget::of(&request(uri, host)))
    }

    #[test]
    fn test_target_normalizes_host() {
        assert_eq!(host_of("/v1", Some("Inference.Local:8080")).as_deref(), Some("inference.local"));
        assert_eq!(host_of("http://pool.local/v1", None).as_deref(), Some("pool.local"));
        assert_eq!(host_of("/v1", Some("[::1]:8080")).as_deref(), Some("::1"));
        assert_eq!(host_of("/v1", None), None);
    }

    #[test]
    fn test_host_matcher() {
        let matcher = HostMatcher::new("Inference.Local");
        assert!(check(&matcher, "/v1", Some("inference.local:8080")));
        assert!(!check(&matcher, "/v1", Some("other.local")));
        assert!(!check(&matcher, "/v1", None));
    }

    #[test]
    fn test_all_of() {
        let matcher = AllOf::new(vec![
            Box::new(PathPrefixMatcher::new("/v1/")),
            Box::new(HostMatcher::new("inference.local")),
        ]);
        assert!(check(&matcher, "http://inference.local/v1/completions", None));
        assert!(!check(&matcher, "http://inference.local/V1/completions", None));
        assert!(!check(&matcher, "http://other.local/v1/completions", None));
        assert!(check(&AllOf::default(), "/anything", None));
    }
}
