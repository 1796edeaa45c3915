//! Route lookup and dispatch.
//!
//! Routes are an ordered list of predicates evaluated first-match-wins. The
//! table always ends in a default target, so every request resolves to
//! exactly one handler.

use axum::body::Body;
use axum::http::{Method, Request};

use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, PathPrefixMatcher};

/// Handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Answer a CORS preflight locally.
    Preflight,
    /// Forward to the upstream.
    Proxy,
    /// Serve from the static root.
    Static,
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging.
    pub name: &'static str,
    matcher: Box<dyn Matcher>,
    pub target: Target,
}

impl Route {
    pub fn new(name: &'static str, matcher: Box<dyn Matcher>, target: Target) -> Self {
        Self {
            name,
            matcher,
            target,
        }
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    fallback: Target,
}

impl Router {
    pub fn new(routes: Vec<Route>, fallback: Target) -> Self {
        Self { routes, fallback }
    }

    /// The edge route table:
    ///
    /// | method                  | path          | target    |
    /// |-------------------------|---------------|-----------|
    /// | OPTIONS                 | `{prefix}/*`  | Preflight |
    /// | GET, POST, PUT, DELETE  | `{prefix}/*`  | Proxy     |
    /// | anything else           |               | Static    |
    pub fn edge(api_prefix: &str) -> Self {
        let preflight = AndMatcher::new(vec![
            Box::new(MethodMatcher::new([Method::OPTIONS])),
            Box::new(PathPrefixMatcher::new(api_prefix)),
        ]);
        let proxy = AndMatcher::new(vec![
            Box::new(MethodMatcher::new([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
            ])),
            Box::new(PathPrefixMatcher::new(api_prefix)),
        ]);

        Self::new(
            vec![
                Route::new("api-preflight", Box::new(preflight), Target::Preflight),
                Route::new("api-proxy", Box::new(proxy), Target::Proxy),
            ],
            Target::Static,
        )
    }

    /// Find the target for a request. Never fails: unmatched requests get
    /// the fallback target.
    pub fn match_request(&self, req: &Request<Body>) -> Target {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(req))
            .map(|route| {
                tracing::trace!(route = route.name, "Route matched");
                route.target
            })
            .unwrap_or(self.fallback)
    }
}
