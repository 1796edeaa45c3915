//! CORS handling.
//!
//! Two independent layers, both always active:
//!
//! 1. The global [`CorsLayer`], built from the validated allow-lists, runs on
//!    every request except `OPTIONS` under the API prefix. It answers every
//!    other `OPTIONS` itself and sets `Access-Control-Allow-Origin: *` on all
//!    actual responses.
//! 2. The fixed API header set ([`apply_api_cors_headers`]) is written on
//!    every proxied response and on every API preflight. It overwrites what
//!    the upstream sent.
//!
//! The two layers advertise different method lists
//! (`GET, POST, OPTIONS` vs. the global list). Both are kept as-is.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower::{Layer, ServiceExt};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ValidatedCors;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

pub const API_ALLOW_ORIGIN: &str = "*";
pub const API_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const API_ALLOW_HEADERS: &str =
    "DNT,User-Agent,X-Requested-With,If-Modified-Since,Cache-Control,Content-Type,Range";

/// Overwrite the fixed API CORS headers.
pub fn apply_api_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(API_ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(API_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(API_ALLOW_HEADERS),
    );
}

/// Local answer to `OPTIONS` under the API prefix. Never forwarded.
pub fn preflight_response() -> Response {
    let mut response = StatusCode::OK.into_response();
    apply_api_cors_headers(response.headers_mut());
    response
}

/// Global CORS policy plus the API prefix whose preflights bypass it.
#[derive(Debug, Clone)]
pub struct EdgeCors {
    layer: CorsLayer,
    api: PathPrefixMatcher,
}

impl EdgeCors {
    pub fn new(config: &ValidatedCors, api_prefix: &str) -> Self {
        let layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(config.allow_methods.clone())
            .allow_headers(config.allow_headers.clone())
            .max_age(config.max_age);
        Self {
            layer,
            api: PathPrefixMatcher::new(api_prefix),
        }
    }
}

/// Global CORS middleware.
pub async fn cors_middleware(
    State(cors): State<Arc<EdgeCors>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // API preflights belong to the preflight responder.
    if req.method() == Method::OPTIONS && cors.api.matches(&req) {
        return next.run(req).await;
    }

    cors.layer
        .layer(next)
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {})
}
