//! Percent-decoded request paths.
//!
//! Route matching, the static API refusal and the prefix strip all look at
//! the decoded path, the same form `ServeDir` resolves against disk. The
//! dispatcher decodes once and attaches the result to the request.

use std::borrow::Cow;

use axum::http::{Request, Uri};
use percent_encoding::percent_decode_str;

/// Decoded request path, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath(String);

impl DecodedPath {
    pub fn from_uri(uri: &Uri) -> Self {
        Self(decode(uri.path()).into_owned())
    }

    /// Attach the decoded path to a request.
    pub fn attach<B>(req: &mut Request<B>) {
        let decoded = Self::from_uri(req.uri());
        req.extensions_mut().insert(decoded);
    }

    /// Decoded path of a request, reusing an attached one when present.
    pub fn of<B>(req: &Request<B>) -> Cow<'_, str> {
        match req.extensions().get::<DecodedPath>() {
            Some(path) => Cow::Borrowed(path.as_str()),
            None => decode(req.uri().path()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Percent-decode a raw path. Invalid UTF-8 becomes U+FFFD.
pub fn decode(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}
