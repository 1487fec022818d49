//! Route gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request passes through [`gate`] before routing. The path decides
//! one of three outcomes:
//! - backend API (`/api/...` outside `/api/auth`): rewritten onto the
//!   backend origin and forwarded, response relayed untouched
//! - auth API (`/api/auth/...`): handled by the local auth routes
//! - page: protected patterns need a live session, otherwise 307 to sign-in
//!
//! Classification runs on a normalized copy of the path so `//`, `.`, `..`
//! and percent-encoded spellings cannot dodge a protected pattern. A path
//! that does not normalize is still forwarded when its clean leading
//! segments put it under the backend API; anything else gets 400. The
//! forwarded request keeps its original path and query.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::uri::{PathAndQuery, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use reqwest::Url;

use super::auth::SESSION_COOKIE;
use super::proxy::{self, ProxyError};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Local session endpoints under the auth prefix.
    AuthApi,
    /// Backend API, proxied to the backend origin.
    Api,
    Page,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("malformed request path: {0}")]
    MalformedPath(String),
    #[error("cannot build backend target: {0}")]
    BadTarget(String),
    #[error("rewritten target leaves the backend origin: {0}")]
    OriginEscape(String),
}

pub fn gate_error_to_status(err: &GateError) -> StatusCode {
    match err {
        GateError::MalformedPath(_) | GateError::BadTarget(_) | GateError::OriginEscape(_) => StatusCode::BAD_REQUEST,
    }
}

pub fn proxy_error_to_status(err: &ProxyError) -> StatusCode {
    match err {
        ProxyError::Body => StatusCode::PAYLOAD_TOO_LARGE,
        ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// PATH MATCHING
// =============================================================================

/// True when `path` equals `prefix` or sits below it on a segment boundary.
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

#[must_use]
pub fn classify(api_prefix: &str, auth_prefix: &str, path: &str) -> RouteClass {
    if is_under(path, auth_prefix) {
        RouteClass::AuthApi
    } else if is_under(path, api_prefix) {
        RouteClass::Api
    } else {
        RouteClass::Page
    }
}

/// Match `path` against protected patterns.
///
/// `/dashboard` covers the path itself and everything below it;
/// `/accounts/*` covers only what is below `/accounts`.
#[must_use]
pub fn is_protected(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| match pattern.strip_suffix("/*") {
        Some(base) => {
            let below = if base.is_empty() { Some(path) } else { path.strip_prefix(base) };
            below.is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
        }
        None => is_under(path, pattern),
    })
}

/// Canonical form of a request path used for classification.
///
/// # Errors
///
/// Fails on escapes that are not UTF-8, encoded separators, and `..` above
/// root. Escapes that are not valid hex stay literal.
pub fn normalize_request_path(path: &str) -> Result<String, GateError> {
    if !path.starts_with('/') {
        return Err(GateError::MalformedPath(path.to_owned()));
    }

    let mut segments: Vec<String> = Vec::new();
    for raw in path.split('/') {
        let segment = urlencoding::decode(raw).map_err(|_| GateError::MalformedPath(path.to_owned()))?;
        if segment.contains(['/', '\\']) {
            return Err(GateError::MalformedPath(path.to_owned()));
        }
        match segment.as_ref() {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(GateError::MalformedPath(path.to_owned()));
                }
            }
            _ => segments.push(segment.into_owned()),
        }
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// True when a path that failed [`normalize_request_path`] still belongs to
/// the backend API.
///
/// Only the leading segments that decode cleanly are read. They must reach
/// below `api_prefix` and must not lead into `auth_prefix`; any `..` rules
/// the path out. The rest of the path is forwarded untouched.
#[must_use]
pub fn is_opaque_api_path(api_prefix: &str, auth_prefix: &str, path: &str) -> bool {
    if !path.starts_with('/') || path.split('/').any(|raw| urlencoding::decode(raw).is_ok_and(|s| s == "..")) {
        return false;
    }

    let mut prefix = String::with_capacity(path.len());
    for raw in path.split('/') {
        let Ok(segment) = urlencoding::decode(raw) else { break };
        if segment.contains(['/', '\\']) {
            break;
        }
        if !matches!(segment.as_ref(), "" | ".") {
            prefix.push('/');
            prefix.push_str(&segment);
        }
    }

    prefix.len() > api_prefix.len()
        && is_under(&prefix, api_prefix)
        && !is_under(&prefix, auth_prefix)
        && !is_under(auth_prefix, &prefix)
}

/// Rewrite `uri` onto the backend origin, keeping path and query.
///
/// # Errors
///
/// Fails if the join is invalid or would leave the backend origin.
pub fn rewrite_target(origin: &Url, uri: &Uri) -> Result<Url, GateError> {
    let path_and_query = uri.path_and_query().map_or_else(|| uri.path(), PathAndQuery::as_str);
    let target = origin
        .join(path_and_query)
        .map_err(|e| GateError::BadTarget(format!("{path_and_query}: {e}")))?;
    if target.origin() != origin.origin() {
        return Err(GateError::OriginEscape(path_and_query.to_owned()));
    }
    Ok(target)
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Axum middleware implementing the route gate. Install over the whole router
/// with `axum::middleware::from_fn_with_state`.
pub async fn gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let config = &state.config;

    let (class, path) = match normalize_request_path(req.uri().path()) {
        Ok(path) => (classify(&config.api_prefix, &config.auth_prefix, &path), path),
        Err(_) if is_opaque_api_path(&config.api_prefix, &config.auth_prefix, req.uri().path()) => {
            (RouteClass::Api, req.uri().path().to_owned())
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejecting request");
            return gate_error_to_status(&e).into_response();
        }
    };

    match class {
        RouteClass::AuthApi => next.run(req).await,
        RouteClass::Api => {
            let target = match rewrite_target(&config.backend_origin, req.uri()) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!(error = %e, %path, "api rewrite failed");
                    return gate_error_to_status(&e).into_response();
                }
            };
            match proxy::forward(&state.http, target, req).await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(error = %e, %path, "api proxy failed");
                    proxy_error_to_status(&e).into_response()
                }
            }
        }
        RouteClass::Page => {
            if path == config.sign_in_path || !is_protected(&config.protected_paths, &path) {
                return next.run(req).await;
            }

            let jar = CookieJar::from_headers(req.headers());
            let token = jar.get(SESSION_COOKIE).map(Cookie::value).unwrap_or_default();
            match state.sessions.validate(token).await {
                Ok(Some(_)) => next.run(req).await,
                Ok(None) => {
                    tracing::debug!(%path, "protected page without session");
                    Redirect::temporary(&config.sign_in_path).into_response()
                }
                Err(e) => {
                    tracing::error!(error = %e, %path, "session validation failed");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
