//! Edge proxy library.
//!
//! Reverse-proxies `/api` traffic to a fixed backend and serves the static
//! frontend bundle for everything else.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
