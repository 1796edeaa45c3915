//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, CORS middleware)
//!     → routing (pick Preflight | Proxy | Static)
//!     → cors.rs (preflight) / proxy (forwarder) / static_files.rs
//!     → Send to client
//! ```

pub mod cors;
pub mod server;
pub mod static_files;

pub use server::HttpServer;
