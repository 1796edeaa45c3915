//! Edge proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 EDGE PROXY                   │
//!     Client Request     │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!     ───────────────────┼─▶│ request  │──▶│   CORS   │──▶│ routing  │  │
//!                        │  │ id/trace │   │middleware│   │  table   │  │
//!                        │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                        │          ┌──────────────┬───────────┤        │
//!                        │          ▼              ▼           ▼        │
//!                        │   ┌───────────┐  ┌───────────┐ ┌─────────┐   │
//!                        │   │ preflight │  │   proxy   │ │ static  │   │
//!                        │   │ responder │  │ forwarder │ │  files  │   │
//!                        │   └───────────┘  └─────┬─────┘ └────┬────┘   │
//!                        └────────────────────────┼────────────┼────────┘
//!                                                 ▼            ▼
//!                                        127.0.0.1:7869   ./frontend
//! ```

use std::process::ExitCode;

use edge_proxy::config::EdgeConfig;
use edge_proxy::lifecycle::startup;
use edge_proxy::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("edge-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(EdgeConfig::default()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}
