//! HTTP method tokens and group aliases.
//!
//! Route configs name methods as strings. A token is either a single verb
//! ("GET", "POST", ...) or a group alias that expands to several verbs:
//!
//! - `CRUD`: GET, POST, PUT, PATCH, DELETE
//! - `RO`:   GET, HEAD
//! - `RW`:   GET, POST, PUT, PATCH
//! - `FULL`: every verb, including OPTIONS, TRACE and CONNECT
//!
//! Tokens are case-insensitive. Resolution preserves first-occurrence order
//! and drops duplicates, so `["RW", "GET"]` resolves to the same method set
//! as `["RW"]`.

use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

/// A method token that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP method '{token}'")]
pub struct MethodError {
    pub token: String,
}

/// A parsed method token: either a single verb or a group alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodToken {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
    Crud,
    ReadOnly,
    ReadWrite,
    Full,
}

impl FromStr for MethodToken {
    type Err = MethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            "CRUD" => Ok(Self::Crud),
            "RO" => Ok(Self::ReadOnly),
            "RW" => Ok(Self::ReadWrite),
            "FULL" => Ok(Self::Full),
            _ => Err(MethodError { token: s.to_string() }),
        }
    }
}

impl MethodToken {
    /// Expand the token into concrete verbs, group aliases in a fixed order.
    pub fn expand(self) -> Vec<Method> {
        match self {
            Self::Get => vec![Method::GET],
            Self::Post => vec![Method::POST],
            Self::Put => vec![Method::PUT],
            Self::Delete => vec![Method::DELETE],
            Self::Patch => vec![Method::PATCH],
            Self::Head => vec![Method::HEAD],
            Self::Options => vec![Method::OPTIONS],
            Self::Trace => vec![Method::TRACE],
            Self::Connect => vec![Method::CONNECT],
            Self::Crud => vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ],
            Self::ReadOnly => vec![Method::GET, Method::HEAD],
            Self::ReadWrite => vec![Method::GET, Method::POST, Method::PUT, Method::PATCH],
            Self::Full => vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::HEAD,
                Method::OPTIONS,
                Method::TRACE,
                Method::CONNECT,
            ],
        }
    }
}

/// Resolve a list of raw tokens into a deduplicated list of verbs.
///
/// Fails on the first unrecognized token; callers attach service/route
/// context to the error.
pub fn resolve_methods(tokens: &[String]) -> Result<Vec<Method>, MethodError> {
    let mut methods: Vec<Method> = Vec::new();
    for token in tokens {
        let parsed: MethodToken = token.parse()?;
        for method in parsed.expand() {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
    }
    Ok(methods)
}
