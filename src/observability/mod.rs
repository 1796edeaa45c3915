//! Observability subsystem.
//!
//! - Structured logging via `tracing` (logging.rs)
//! - Per-request spans from `tower_http::trace::TraceLayer`
//! - `x-request-id` on every request and response for correlation

pub mod logging;
