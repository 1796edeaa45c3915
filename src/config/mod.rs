//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! EdgeConfig::default() (fixed constants)
//!     → validation.rs (parse upstream URL and bind address)
//!     → ValidatedConfig (immutable)
//!     → shared via Arc with the forwarder and static responder
//! ```
//!
//! # Design Decisions
//! - The upstream target is resolved once at startup and never changes
//! - Validation reports every problem at once, not just the first
//! - Any validation error is fatal: the process does not start

pub mod schema;
pub mod validation;

pub use schema::{CorsConfig, EdgeConfig, ListenerConfig, StaticFilesConfig, UpstreamConfig};
pub use validation::{
    validate, ConfigError, Upstream, ValidatedConfig, ValidatedCors, ValidationError,
};
