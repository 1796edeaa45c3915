//! Static frontend responder.
//!
//! - `/` always returns the index document
//! - Paths under the API prefix are refused with 404 and never touch disk.
//!   The check runs on the percent-decoded path, so `/%61pi/...` is refused too
//! - Everything else resolves against the static root via `ServeDir`, which
//!   rejects `..` traversal
//! - Missing files are 404; a file that exists but cannot be read is 500
//!
//! `ServeDir` reports permission errors as 404. When it answers 404 the target
//! is opened once more to tell a genuine miss from an unreadable file.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;
use crate::routing::DecodedPath;

/// Serves the frontend bundle.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_path: PathBuf,
    index_file: String,
    dir: ServeDir,
    index: ServeFile,
    api_prefix: String,
}

impl StaticFiles {
    pub fn new(config: &StaticFilesConfig, api_prefix: impl Into<String>) -> Self {
        Self {
            root: config.root.clone(),
            index_path: config.index_path(),
            index_file: config.index.clone(),
            dir: ServeDir::new(&config.root),
            index: ServeFile::new(config.index_path()),
            api_prefix: api_prefix.into(),
        }
    }

    pub async fn serve(&self, req: Request<Body>) -> Response {
        let path = DecodedPath::of(&req).into_owned();

        if path.starts_with(&self.api_prefix) {
            tracing::debug!(path = %path, "Unrouted API path");
            return StatusCode::NOT_FOUND.into_response();
        }

        let (result, target) = if path == "/" {
            let result = self.index.clone().try_call(req).await;
            (result, Some(self.index_path.clone()))
        } else {
            let result = self.dir.clone().try_call(req).await;
            (result, self.resolve(&path))
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => return self.read_failed(&path, e),
        };

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(target) = target {
                if let Err(e) = check_readable(&target, &self.index_file).await {
                    return self.read_failed(&path, e);
                }
            }
        } else if response.status().is_server_error() {
            tracing::error!(
                path = %path,
                root = %self.root.display(),
                status = %response.status(),
                "Static file read failed"
            );
        }

        response.map(Body::new)
    }

    /// File under the root for a decoded request path. `None` for paths
    /// that could never name a file there.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut target = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(target)
    }

    fn read_failed(&self, path: &str, error: io::Error) -> Response {
        tracing::error!(
            path = %path,
            root = %self.root.display(),
            error = %error,
            "Static file read failed"
        );
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// `Ok` when `target` is missing or readable, `Err` when it exists but
/// cannot be opened. Directories are checked through their index document.
async fn check_readable(target: &Path, index_file: &str) -> io::Result<()> {
    let result = match tokio::fs::metadata(target).await {
        Ok(meta) if meta.is_dir() => tokio::fs::File::open(target.join(index_file))
            .await
            .map(drop),
        Ok(_) => tokio::fs::File::open(target).await.map(drop),
        Err(e) => Err(e),
    };

    match result {
        Err(e) if !is_missing(&e) => Err(e),
        _ => Ok(()),
    }
}

fn is_missing(error: &io::Error) -> bool {
    // 20 = ENOTDIR
    #[cfg(unix)]
    let not_a_directory = error.raw_os_error() == Some(20);
    #[cfg(not(unix))]
    let not_a_directory = false;

    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput
    ) || not_a_directory
}
