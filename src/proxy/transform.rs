//! Request and response rewriting around the forwarding call.
//!
//! Both transforms are plain functions so they can be exercised without
//! any network I/O:
//!
//! ```text
//! inbound Request ── rewrite_request ──▶ upstream ── rewrite_response ──▶ client
//! ```
//!
//! # Request side
//! - Strip the API prefix and re-target the URI at the upstream origin. A
//!   prefix that only appears after percent-decoding is stripped as well;
//!   the remainder is then re-encoded for the outbound path.
//! - Drop hop-by-hop headers
//! - Append the client IP to `X-Forwarded-For`, set `X-Forwarded-Proto`
//!
//! # Response side
//! - Drop hop-by-hop headers
//! - Overwrite the fixed API CORS header set

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::uri::PathAndQuery;
use axum::http::{Request, Response, Uri, Version};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::Upstream;
use crate::http::cors::apply_api_cors_headers;
use crate::routing::matcher::has_segment_prefix;
use crate::routing::path::decode;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Headers that apply to a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove `prefix` from the start of `path`. Paths without the prefix are
/// returned unchanged; an empty remainder becomes `/`.
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.strip_prefix(prefix) {
        Some("") => "/",
        Some(rest) => rest,
        None => path,
    }
}

/// Bytes escaped when a decoded path goes back on the wire.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path sent upstream for a raw inbound path.
///
/// A literal prefix is stripped from the raw path, leaving its encoding
/// untouched. When the prefix only matches after decoding (`/%61pi/users`),
/// the decoded remainder is stripped and re-encoded.
pub fn forward_path<'a>(raw: &'a str, prefix: &str) -> Cow<'a, str> {
    if has_segment_prefix(raw, prefix) {
        return Cow::Borrowed(strip_prefix(raw, prefix));
    }

    let decoded = decode(raw);
    if !has_segment_prefix(&decoded, prefix) {
        return Cow::Borrowed(raw);
    }
    let rest = strip_prefix(&decoded, prefix);
    Cow::Owned(utf8_percent_encode(rest, PATH).to_string())
}

/// Build the upstream URI for an inbound URI.
pub fn outbound_uri(uri: &Uri, upstream: &Upstream) -> Result<Uri, axum::http::Error> {
    let path = forward_path(uri.path(), &upstream.api_prefix);
    let path_and_query = match uri.query() {
        Some(query) => format!("{}{}?{}", upstream.base_path, path, query),
        None => format!("{}{}", upstream.base_path, path),
    };

    Uri::builder()
        .scheme(upstream.scheme.clone())
        .authority(upstream.authority.clone())
        .path_and_query(path_and_query.parse::<PathAndQuery>()?)
        .build()
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append the client IP to `X-Forwarded-For`, keeping earlier hops.
pub fn append_forwarded_for(headers: &mut HeaderMap, client: SocketAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let ip = client.ip().to_string();
    let value = if prior.is_empty() {
        ip
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Rewrite an inbound request into the request sent upstream.
pub fn rewrite_request(
    request: Request<Body>,
    upstream: &Upstream,
    client: Option<SocketAddr>,
) -> Result<Request<Body>, axum::http::Error> {
    let (mut parts, body) = request.into_parts();

    parts.uri = outbound_uri(&parts.uri, upstream)?;
    parts.version = Version::HTTP_11;

    remove_hop_by_hop(&mut parts.headers);
    if let Some(client) = client {
        append_forwarded_for(&mut parts.headers, client);
    }
    parts
        .headers
        .insert(X_FORWARDED_PROTO, upstream.forwarded_proto.clone());

    Ok(Request::from_parts(parts, body))
}

/// Rewrite an upstream response before it goes back to the client.
pub fn rewrite_response<B>(mut response: Response<B>) -> Response<B> {
    remove_hop_by_hop(response.headers_mut());
    apply_api_cors_headers(response.headers_mut());
    response
}
