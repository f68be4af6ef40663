//! Route path compilation.
//!
//! A matchable pattern is formed by joining a service base path with a route
//! path using exactly one slash, regardless of how many trailing/leading
//! slashes the two sides carry at the junction. Segments are then validated:
//!
//! - `{name}` declares a named parameter segment
//! - a bare `*` as the final segment becomes the `{*path}` catch-all
//! - any other use of `{`, `}` or `*` inside a segment is malformed
//!
//! Trailing slashes are preserved, so base `/api` with route `/` compiles to
//! `/api/` and only matches requests with the trailing slash.

use thiserror::Error;

/// Pattern syntax errors found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path '{path}' must start with '/'")]
    NotAbsolute { path: String },

    #[error("path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("catch-all '*' must be the final segment in '{path}'")]
    WildcardNotLast { path: String },

    #[error("malformed parameter segment '{segment}'")]
    BadParam { segment: String },

    #[error("segment '{segment}' misuses a reserved character")]
    BadSegment { segment: String },
}

/// Join a base path and a route path into a validated matchable pattern.
pub fn compile_path(base_path: &str, route_path: &str) -> Result<String, PathError> {
    if !base_path.starts_with('/') {
        return Err(PathError::NotAbsolute {
            path: base_path.to_string(),
        });
    }
    if !route_path.starts_with('/') {
        return Err(PathError::NotAbsolute {
            path: route_path.to_string(),
        });
    }

    // Exactly one slash at the junction.
    let joined = format!(
        "{}/{}",
        base_path.trim_end_matches('/'),
        route_path.trim_start_matches('/')
    );
    if joined == "/" {
        return Ok(joined);
    }

    let raw: Vec<&str> = joined[1..].split('/').collect();
    let mut segments: Vec<String> = Vec::with_capacity(raw.len());
    for (i, segment) in raw.iter().enumerate() {
        let last = i == raw.len() - 1;
        if segment.is_empty() {
            // A single trailing empty segment is a trailing slash.
            if last {
                segments.push(String::new());
                continue;
            }
            return Err(PathError::EmptySegment { path: joined });
        }
        if *segment == "*" {
            if !last {
                return Err(PathError::WildcardNotLast { path: joined });
            }
            segments.push("{*path}".to_string());
            continue;
        }
        if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 1 {
            let name = &segment[1..segment.len() - 1];
            if name.is_empty() || name.contains(['{', '}', '*']) {
                return Err(PathError::BadParam {
                    segment: segment.to_string(),
                });
            }
            segments.push(segment.to_string());
            continue;
        }
        if segment.contains(['{', '}', '*']) {
            return Err(PathError::BadSegment {
                segment: segment.to_string(),
            });
        }
        segments.push(segment.to_string());
    }

    Ok(format!("/{}", segments.join("/")))
}
