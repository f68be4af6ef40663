//! Per-service request forwarding.
//!
//! # Responsibilities
//! - Rewrite the request URI to target the configured backend
//! - Optionally strip the service base path from the forwarded path
//! - Set forwarding headers and rewrite Host to the backend authority
//! - Tag backend responses with the gateway identification header
//!
//! # Design Decisions
//! - The backend authority and its header value are computed once at
//!   construction, so the per-request path is allocation-light
//! - Base-path stripping is boundary-safe: a path that does not extend the
//!   base path is forwarded untouched
//! - Response bodies stream through without buffering

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, Request, Response, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;
use crate::config::validation::parse_target_url;
use crate::proxy::registry::RegistryError;

/// Original Host header of the inbound request.
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Authority the request was forwarded to.
const X_ORIGIN_HOST: HeaderName = HeaderName::from_static("x-origin-host");

/// Marks responses that passed through the gateway.
const X_PROXY: HeaderName = HeaderName::from_static("x-proxy");

/// Forwarding failures for a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("backend did not respond within {limit:?}")]
    Timeout { limit: Duration },

    #[error("invalid outbound path '{path}': {detail}")]
    Path { path: String, detail: String },

    #[error("invalid outbound uri: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),
}

/// A forwarding proxy bound to one backend service.
#[derive(Debug)]
pub struct ServiceProxy {
    name: String,
    base_path: String,
    target: Url,
    authority: Authority,
    authority_value: HeaderValue,
    client: Client<HttpConnector, Body>,
}

impl ServiceProxy {
    /// Build a proxy for one service, validating its target URL.
    pub fn new(
        service: &ServiceConfig,
        client: Client<HttpConnector, Body>,
    ) -> Result<Self, RegistryError> {
        let target = parse_target_url(&service.target_url).map_err(|detail| RegistryError {
            service: service.name.clone(),
            detail,
        })?;

        // parse_target_url guarantees a non-empty host
        let host = target.host_str().unwrap_or_default();
        let authority_str = match target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority =
            Authority::try_from(authority_str.as_str()).map_err(|e| RegistryError {
                service: service.name.clone(),
                detail: format!("invalid target authority '{authority_str}': {e}"),
            })?;
        let authority_value =
            HeaderValue::from_str(authority.as_str()).map_err(|e| RegistryError {
                service: service.name.clone(),
                detail: format!("target authority is not a valid header value: {e}"),
            })?;

        // Trailing slashes would defeat boundary-safe stripping.
        let base_path = if service.base_path == "/" {
            service.base_path.clone()
        } else {
            service.base_path.trim_end_matches('/').to_string()
        };

        Ok(Self {
            name: service.name.clone(),
            base_path,
            target,
            authority,
            authority_value,
            client,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend target URL, for logging.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward a request to the backend and return its response.
    ///
    /// The inbound request is consumed; its method, headers, version and
    /// body carry over to the outbound request. Only the URI and the
    /// forwarding headers change.
    pub async fn forward(
        &self,
        request: Request<Body>,
        strip_path: bool,
    ) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        // Inbound authority: Host header for HTTP/1, URI authority for HTTP/2.
        let original_host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));

        let path_and_query = self.outbound_path_and_query(&parts.uri, strip_path)?;
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        uri_parts.path_and_query = Some(path_and_query);
        parts.uri = Uri::from_parts(uri_parts)?;

        if let Some(host) = original_host {
            if let Ok(value) = HeaderValue::from_str(&host) {
                parts.headers.insert(X_FORWARDED_HOST, value);
            }
        }
        parts.headers.insert(X_ORIGIN_HOST, self.authority_value.clone());
        parts.headers.insert(header::HOST, self.authority_value.clone());

        let outbound = Request::from_parts(parts, body);
        let upstream = self
            .client
            .request(outbound)
            .await
            .map_err(|source| ProxyError::Transport {
                target: self.target.to_string(),
                source,
            })?;

        let (parts, body) = upstream.into_parts();
        let mut response = Response::from_parts(parts, Body::new(body));
        response
            .headers_mut()
            .insert(X_PROXY, HeaderValue::from_static(env!("CARGO_PKG_NAME")));
        Ok(response)
    }

    /// Rebuild the outbound path, stripping the base path if asked and
    /// carrying the query string over unchanged.
    fn outbound_path_and_query(
        &self,
        uri: &Uri,
        strip_path: bool,
    ) -> Result<PathAndQuery, ProxyError> {
        let path = uri.path();
        let effective = if strip_path {
            strip_base_path(path, &self.base_path)
        } else {
            path
        };
        let rewritten = match uri.query() {
            Some(query) => format!("{effective}?{query}"),
            None => effective.to_string(),
        };
        PathAndQuery::try_from(rewritten.as_str()).map_err(|e| ProxyError::Path {
            path: rewritten.clone(),
            detail: e.to_string(),
        })
    }
}

/// Remove `base_path` from the front of `path`.
///
/// Stripping the whole path yields "/". A path that does not start with the
/// base path at a segment boundary comes back unchanged.
fn strip_base_path<'a>(path: &'a str, base_path: &str) -> &'a str {
    if base_path == "/" {
        return path;
    }
    match path.strip_prefix(base_path) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}
