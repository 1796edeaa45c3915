//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single dispatch handler
//! - Wire up middleware (tracing, request ID, CORS)
//! - Dispatch each request to exactly one of: preflight, proxy, static
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::from_fn_with_state,
    response::Response,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate, ConfigError, EdgeConfig, ValidatedConfig};
use crate::http::cors::{cors_middleware, preflight_response, EdgeCors};
use crate::http::static_files::StaticFiles;
use crate::proxy::Forwarder;
use crate::routing::{DecodedPath, Router as RouteTable, Target};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
    pub static_files: StaticFiles,
}

/// HTTP server for the edge process.
pub struct HttpServer {
    router: Router,
    config: ValidatedConfig,
}

impl HttpServer {
    /// Validate the configuration and build the server.
    pub fn new(config: EdgeConfig) -> Result<Self, ConfigError> {
        let config = validate(&config)?;
        Ok(Self::from_validated(config))
    }

    pub fn from_validated(config: ValidatedConfig) -> Self {
        let api_prefix = config.upstream.api_prefix.clone();
        let state = AppState {
            routes: Arc::new(RouteTable::edge(&api_prefix)),
            forwarder: Forwarder::new(config.upstream.clone()),
            static_files: StaticFiles::new(&config.static_files, api_prefix.as_str()),
        };
        let cors = Arc::new(EdgeCors::new(&config.cors, &api_prefix));

        let router = Self::build_router(state, cors);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, cors: Arc<EdgeCors>) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(from_fn_with_state(cors, cors_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream,
            static_root = %self.config.static_files.root.display(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    DecodedPath::attach(&mut request);
    match state.routes.match_request(&request) {
        Target::Preflight => preflight_response(),
        Target::Proxy => state.forwarder.forward(request).await,
        Target::Static => state.static_files.serve(request).await,
    }
}
