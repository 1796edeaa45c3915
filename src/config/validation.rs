//! Configuration validation.
//!
//! Turns an [`EdgeConfig`] into a [`ValidatedConfig`]: the upstream URL is
//! parsed into the scheme/authority pair used on every forwarded request, and
//! the bind address into a `SocketAddr`, the CORS allow-lists into methods
//! and header names. Returns all validation errors, not just the first.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;
use url::Url;

use crate::config::schema::{CorsConfig, EdgeConfig, StaticFilesConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid upstream url {url:?}: {source}")]
    UpstreamUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported upstream scheme {0:?} (only http is supported)")]
    UpstreamScheme(String),

    #[error("upstream url {0:?} has no host")]
    UpstreamHost(String),

    #[error("upstream authority {0:?} is not valid")]
    UpstreamAuthority(String),

    #[error("invalid bind address {address:?}: {source}")]
    BindAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("api prefix {0:?} must start with '/' and must not end with '/'")]
    ApiPrefix(String),

    #[error("forwarded proto {0:?} is not a valid header value")]
    ForwardedProto(String),

    #[error("cors allow-method {0:?} is not a valid HTTP method")]
    CorsMethod(String),

    #[error("cors allow-header {0:?} is not a valid header name")]
    CorsHeader(String),
}

/// Error type for configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The resolved upstream target.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub scheme: Scheme,
    pub authority: Authority,
    /// Path of the upstream URL without a trailing slash ("" for a bare origin).
    pub base_path: String,
    /// Prefix removed from inbound paths before forwarding.
    pub api_prefix: String,
    pub forwarded_proto: HeaderValue,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// CORS allow-lists in typed form.
#[derive(Debug, Clone)]
pub struct ValidatedCors {
    pub allow_methods: Vec<Method>,
    /// Lowercased by `HeaderName` parsing.
    pub allow_headers: Vec<HeaderName>,
    pub max_age: Duration,
}

/// Configuration after validation. Immutable for the life of the process.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub bind_address: SocketAddr,
    pub upstream: Upstream,
    pub static_files: StaticFilesConfig,
    pub cors: ValidatedCors,
}

/// Validate a configuration.
pub fn validate(config: &EdgeConfig) -> Result<ValidatedConfig, ConfigError> {
    let mut errors = Vec::new();

    let bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
        Ok(addr) => Some(addr),
        Err(source) => {
            errors.push(ValidationError::BindAddress {
                address: config.listener.bind_address.clone(),
                source,
            });
            None
        }
    };

    let prefix = &config.upstream.api_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::ApiPrefix(prefix.clone()));
    }

    let forwarded_proto = match HeaderValue::from_str(&config.upstream.forwarded_proto) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(ValidationError::ForwardedProto(
                config.upstream.forwarded_proto.clone(),
            ));
            None
        }
    };

    let target = match parse_upstream(&config.upstream.url) {
        Ok(target) => Some(target),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let cors = validate_cors(&config.cors, &mut errors);

    match (bind_address, forwarded_proto, target) {
        (Some(bind_address), Some(forwarded_proto), Some((scheme, authority, base_path)))
            if errors.is_empty() =>
        {
            Ok(ValidatedConfig {
                bind_address,
                upstream: Upstream {
                    scheme,
                    authority,
                    base_path,
                    api_prefix: prefix.clone(),
                    forwarded_proto,
                },
                static_files: config.static_files.clone(),
                cors,
            })
        }
        _ => Err(ConfigError::Validation(errors)),
    }
}

fn validate_cors(config: &CorsConfig, errors: &mut Vec<ValidationError>) -> ValidatedCors {
    let mut allow_methods = Vec::with_capacity(config.allow_methods.len());
    for raw in &config.allow_methods {
        match Method::from_bytes(raw.as_bytes()) {
            Ok(method) => allow_methods.push(method),
            Err(_) => errors.push(ValidationError::CorsMethod(raw.clone())),
        }
    }

    let mut allow_headers = Vec::with_capacity(config.allow_headers.len());
    for raw in &config.allow_headers {
        match HeaderName::from_bytes(raw.as_bytes()) {
            Ok(name) => allow_headers.push(name),
            Err(_) => errors.push(ValidationError::CorsHeader(raw.clone())),
        }
    }

    ValidatedCors {
        allow_methods,
        allow_headers,
        max_age: Duration::from_secs(config.max_age_secs),
    }
}

fn parse_upstream(raw: &str) -> Result<(Scheme, Authority, String), ValidationError> {
    let url = Url::parse(raw).map_err(|source| ValidationError::UpstreamUrl {
        url: raw.to_string(),
        source,
    })?;

    if url.scheme() != "http" {
        return Err(ValidationError::UpstreamScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ValidationError::UpstreamHost(raw.to_string()))?;
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let authority = authority
        .parse::<Authority>()
        .map_err(|_| ValidationError::UpstreamAuthority(authority.clone()))?;

    let base_path = url.path().trim_end_matches('/').to_string();

    Ok((Scheme::HTTP, authority, base_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let validated = validate(&EdgeConfig::default()).unwrap();
        assert_eq!(validated.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(validated.upstream.authority.as_str(), "127.0.0.1:7869");
        assert_eq!(validated.upstream.base_path, "");
        assert_eq!(validated.upstream.api_prefix, "/api");
        assert_eq!(validated.upstream.to_string(), "http://127.0.0.1:7869");
        assert_eq!(validated.cors.allow_methods.len(), 5);
        assert_eq!(validated.cors.allow_headers[0], "origin");
        assert_eq!(validated.cors.max_age, Duration::from_secs(43200));
    }

    #[test]
    fn test_upstream_base_path_kept() {
        let mut config = EdgeConfig::default();
        config.upstream.url = "http://backend.local:9000/v1/".into();
        let validated = validate(&config).unwrap();
        assert_eq!(validated.upstream.authority.as_str(), "backend.local:9000");
        assert_eq!(validated.upstream.base_path, "/v1");
    }

    #[test]
    fn test_bad_upstream_url_rejected() {
        let mut config = EdgeConfig::default();
        config.upstream.url = "not a url".into();
        let err = validate(&config).unwrap_err();
        let ConfigError::Validation(errors) = err;
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::UpstreamUrl { .. }));
    }

    #[test]
    fn test_https_upstream_rejected() {
        let mut config = EdgeConfig::default();
        config.upstream.url = "https://127.0.0.1:7869".into();
        let ConfigError::Validation(errors) = validate(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UpstreamScheme(ref s) if s == "https"));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.upstream.url = "::".into();
        config.upstream.api_prefix = "api/".into();
        let err = validate(&config).unwrap_err();
        let ConfigError::Validation(ref errors) = err;
        assert_eq!(errors.len(), 3);
        assert!(err.to_string().starts_with("validation failed: "));
    }

    #[test]
    fn test_bad_cors_entries_rejected() {
        let mut config = EdgeConfig::default();
        config.cors.allow_methods.push("GET POST".into());
        config.cors.allow_headers.push("X Bad".into());
        config.cors.allow_headers.push(String::new());

        let ConfigError::Validation(errors) = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::CorsMethod(ref m) if m == "GET POST"));
        assert!(matches!(errors[1], ValidationError::CorsHeader(ref h) if h == "X Bad"));
        assert!(matches!(errors[2], ValidationError::CorsHeader(ref h) if h.is_empty()));
    }
}
