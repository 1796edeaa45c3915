//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → path.rs (percent-decode the path once)
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Target (Preflight | Proxy | Static)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins; the table ends in a default target

pub mod matcher;
pub mod path;
pub mod router;

pub use path::DecodedPath;
pub use router::{Router, Target};
