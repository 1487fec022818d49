//! Backend forwarding for rewritten API requests.
//!
//! Bodies are buffered in both directions (bounded by
//! [`MAX_PROXY_BODY_BYTES`] on the way in). Hop-by-hop headers are dropped;
//! everything else, cookies included, passes through unchanged.

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::Response;
use reqwest::Url;

use crate::config::BackendTimeouts;

pub const MAX_PROXY_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("request body unreadable or larger than 10 MiB")]
    Body,
    #[error("backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Build the client used for forwarded requests. Redirects are relayed to the
/// browser rather than followed.
///
/// # Errors
///
/// Returns an error if the TLS backend fails to initialize.
pub fn build_backend_client(timeouts: BackendTimeouts) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeouts.request)
        .connect_timeout(timeouts.connect)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

pub(crate) fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy `headers` without hop-by-hop entries or a stale `content-length`.
pub(crate) fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Send `req` to `target` and relay the backend's answer verbatim.
pub async fn forward(client: &reqwest::Client, target: Url, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_PROXY_BODY_BYTES)
        .await
        .map_err(|_| ProxyError::Body)?;

    let mut headers = end_to_end_headers(&parts.headers);
    if let Some(host) = headers.remove(header::HOST) {
        headers.insert(HeaderName::from_static("x-forwarded-host"), host);
    }

    let upstream = client
        .request(parts.method, target)
        .headers(headers)
        .body(bytes)
        .send()
        .await?;

    let status = upstream.status();
    let resp_headers = end_to_end_headers(upstream.headers());
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = resp_headers;
    Ok(response)
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
