//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The route gate wraps the whole router, so it sees every request before
//! routing. Backend API calls never reach the routes below. Auth endpoints
//! are nested under the configured auth prefix. Everything else falls back
//! to the static client bundle, with `index.html` for client-side routes.

pub mod auth;
pub mod gate;
pub mod proxy;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::state::AppState;

/// Local session endpoints, mounted under the auth prefix.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/providers", get(auth::providers))
        .route("/signin/{provider}", get(auth::signin))
        .route(
            "/callback/{provider}",
            get(auth::callback_oauth).post(auth::callback_credentials),
        )
        .route("/session", get(auth::current_session))
        .route("/signout", post(auth::signout))
        .fallback(not_found)
}

/// Full gateway router: route gate, auth routes, static pages.
pub fn app(state: AppState) -> Router {
    let site_dir = state.config.site_dir.clone();
    let pages = ServeDir::new(&site_dir).fallback(ServeFile::new(site_dir.join("index.html")));

    Router::new()
        .nest(&state.config.auth_prefix, auth_routes())
        .route("/healthz", get(healthz))
        .fallback_service(pages)
        .layer(middleware::from_fn_with_state(state.clone(), gate::gate))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Request span carrying the method and path only. Query strings hold
/// usernames on the existence check and stay out of the logs.
fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
