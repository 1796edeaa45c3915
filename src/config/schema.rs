//! Configuration schema definitions.
//!
//! Every field defaults to the value the edge process ships with. The binary
//! never overrides them; tests build configs in code with other ports and
//! directories.

use std::path::PathBuf;

/// Root configuration for the edge process.
#[derive(Debug, Clone, Default)]
pub struct EdgeConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Backend that receives `/api` traffic.
    pub upstream: UpstreamConfig,

    /// Frontend bundle served for everything else.
    pub static_files: StaticFilesConfig,

    /// Global CORS middleware policy.
    pub cors: CorsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (backend) configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Origin of the backend service.
    pub url: String,

    /// Path prefix that selects proxied requests. Stripped before forwarding.
    pub api_prefix: String,

    /// Value sent upstream in `X-Forwarded-Proto`.
    pub forwarded_proto: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7869".to_string(),
            api_prefix: "/api".to_string(),
            forwarded_proto: "http".to_string(),
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone)]
pub struct StaticFilesConfig {
    /// Directory holding the built frontend.
    pub root: PathBuf,

    /// Document returned for `/`, relative to `root`.
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./frontend"),
            index: "index.html".to_string(),
        }
    }
}

impl StaticFilesConfig {
    /// Full path of the index document.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index)
    }
}

/// CORS middleware policy applied to every request.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed methods advertised on preflight.
    pub allow_methods: Vec<String>,

    /// Allowed request headers advertised on preflight.
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_headers: [
                "Origin",
                "Content-Type",
                "Accept",
                "Authorization",
                "X-Requested-With",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_age_secs: 12 * 60 * 60,
        }
    }
}
