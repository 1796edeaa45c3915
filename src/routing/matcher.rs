//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method against an allowed set
//! - Match path prefix on whole segments of the decoded path (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Empty AND = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{Method, Request};

use crate::routing::path::DecodedPath;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches when the request method is one of a fixed set.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.methods.contains(req.method())
    }
}

/// Matches the request path prefix on segment boundaries.
///
/// `/api` matches `/api` and `/api/users` but not `/apiary`. The path is
/// percent-decoded first, so `/%61pi/users` matches too.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        has_segment_prefix(&DecodedPath::of(req), &self.prefix)
    }
}

/// True when `path` is `prefix` or continues it with a `/`.
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new([Method::GET, Method::POST]);
        assert!(matcher.matches(&request(Method::GET, "/")));
        assert!(matcher.matches(&request(Method::POST, "/")));
        assert!(!matcher.matches(&request(Method::PATCH, "/")));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");

        assert!(matcher.matches(&request(Method::GET, "http://example.com/api/v1")));
        assert!(matcher.matches(&request(Method::GET, "/api")));
        assert!(matcher.matches(&request(Method::GET, "/api/")));
        assert!(matcher.matches(&request(Method::GET, "/api?x=1")));
        assert!(!matcher.matches(&request(Method::GET, "/apiary")));
        assert!(!matcher.matches(&request(Method::GET, "/images")));
        assert!(!matcher.matches(&request(Method::GET, "/API/users")));
    }

    #[test]
    fn test_path_matcher_sees_encoded_prefix() {
        let matcher = PathPrefixMatcher::new("/api");

        assert!(matcher.matches(&request(Method::GET, "/%61pi/secret.txt")));
        assert!(matcher.matches(&request(Method::GET, "/%61%70%69")));
        assert!(matcher.matches(&request(Method::GET, "/api%2Fusers")));
        assert!(!matcher.matches(&request(Method::GET, "/%61piary")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::new([Method::OPTIONS])),
            Box::new(PathPrefixMatcher::new("/api")),
        ]);
        assert!(matcher.matches(&request(Method::OPTIONS, "/api/users")));
        assert!(!matcher.matches(&request(Method::GET, "/api/users")));
        assert!(!matcher.matches(&request(Method::OPTIONS, "/users")));

        let empty = AndMatcher::new(Vec::new());
        assert!(empty.matches(&request(Method::DELETE, "/anything")));
    }
}
