//! Forwarding of API requests to the single upstream.
//!
//! One attempt per request. Transport failures surface immediately as
//! `502 Bad Gateway`; there is no retry, no circuit breaking and no timeout.
//! Upstream connections are not pooled: each request opens its own.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::Upstream;
use crate::proxy::transform::{rewrite_request, rewrite_response};

/// Forwards requests to the configured upstream.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream: Arc<Upstream>,
}

impl Forwarder {
    pub fn new(upstream: Upstream) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());
        Self {
            client,
            upstream: Arc::new(upstream),
        }
    }

    /// Forward one request and relay the upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let client_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let outbound = match rewrite_request(request, &self.upstream, client_addr) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to build upstream request");
                return gateway_error(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        tracing::debug!(
            method = %method,
            path = %path,
            upstream_uri = %outbound.uri(),
            "Proxying request"
        );

        match self.client.request(outbound).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                rewrite_response(Response::from_parts(parts, Body::new(body)))
            }
            Err(e) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    upstream = %self.upstream,
                    error = %e,
                    "Upstream error"
                );
                gateway_error(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

fn gateway_error(status: StatusCode) -> Response {
    rewrite_response(status.into_response())
}
