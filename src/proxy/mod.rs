//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! API request
//!     → transform.rs (strip prefix, re-target URI, forwarding headers)
//!     → forwarder.rs (single attempt via hyper-util client)
//!     → transform.rs (hop-by-hop cleanup, fixed CORS headers)
//!     → client
//! ```

pub mod forwarder;
pub mod transform;

pub use forwarder::Forwarder;
