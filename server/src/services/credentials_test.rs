use super::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;

use crate::state::test_helpers::{closed_addr, spawn_router};

fn timeouts() -> BackendTimeouts {
    BackendTimeouts { request: Duration::from_millis(300), connect: Duration::from_millis(200) }
}

fn creds(username: &str, password: &str) -> Credentials {
    Credentials { username: username.to_owned(), password: password.to_owned() }
}

/// Backend whose login endpoint always answers with `status`.
async fn backend_with_status(status: StatusCode) -> Url {
    let router = Router::new().route("/api/auth/login", post(move || async move { status }));
    let addr = spawn_router(router).await;
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn authorizer_for(origin: &Url) -> CredentialAuthorizer {
    CredentialAuthorizer::new(origin, "/api/auth/login", timeouts()).unwrap()
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

#[tokio::test]
async fn ok_status_grants() {
    let origin = backend_with_status(StatusCode::OK).await;
    let result = authorizer_for(&origin).authorize(&creds("user", "pw")).await;
    assert_eq!(result, Authorization::granted());
}

#[tokio::test]
async fn any_2xx_grants() {
    let origin = backend_with_status(StatusCode::NO_CONTENT).await;
    let result = authorizer_for(&origin).authorize(&creds("user", "pw")).await;
    assert!(result.granted);
}

#[tokio::test]
async fn non_success_statuses_deny() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR] {
        let origin = backend_with_status(status).await;
        let result = authorizer_for(&origin).authorize(&creds("user", "pw")).await;
        assert!(!result.granted, "expected denial for {status}");
        let reason = result.reason.expect("denial carries a reason");
        assert!(reason.contains(status.as_str()), "reason {reason:?} should name {status}");
    }
}

#[tokio::test]
async fn unreachable_backend_denies() {
    let addr = closed_addr().await;
    let origin = Url::parse(&format!("http://{addr}")).unwrap();
    let result = authorizer_for(&origin).authorize(&creds("user", "pw")).await;
    assert_eq!(result, Authorization::denied("login request failed"));
}

#[tokio::test]
async fn slow_backend_times_out_as_denial() {
    let router = Router::new().route(
        "/api/auth/login",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK
        }),
    );
    let addr = spawn_router(router).await;
    let origin = Url::parse(&format!("http://{addr}")).unwrap();
    let result = authorizer_for(&origin).authorize(&creds("user", "pw")).await;
    assert!(!result.granted);
}

// =============================================================================
// REQUEST SHAPE
// =============================================================================

#[tokio::test]
async fn posts_json_username_and_password() {
    let seen: Arc<Mutex<Option<serde_json::Value>>> = Arc::new(Mutex::new(None));
    let seen_in_handler = seen.clone();
    let router = Router::new().route(
        "/api/auth/login",
        post(move |Json(body): Json<serde_json::Value>| {
            let seen = seen_in_handler.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                StatusCode::OK
            }
        }),
    );
    let addr = spawn_router(router).await;
    let origin = Url::parse(&format!("http://{addr}")).unwrap();

    let result = authorizer_for(&origin).authorize(&creds("real", "right")).await;
    assert!(result.granted);
    let body = seen.lock().unwrap().clone().expect("backend saw a body");
    assert_eq!(body, serde_json::json!({"username": "real", "password": "right"}));
}

#[tokio::test]
async fn login_url_joins_path_onto_origin() {
    let origin = Url::parse("http://localhost:5000").unwrap();
    let authorizer = CredentialAuthorizer::new(&origin, "/api/auth/login", timeouts()).unwrap();
    assert_eq!(authorizer.login_url().as_str(), "http://localhost:5000/api/auth/login");
}

// =============================================================================
// REDACTION
// =============================================================================

#[test]
fn credentials_debug_redacts_both_fields() {
    let debug = format!("{:?}", creds("alice", "hunter22"));
    assert!(!debug.contains("alice"));
    assert!(!debug.contains("hunter22"));
    assert!(debug.contains("redacted"));
}

#[test]
fn authorization_constructors() {
    assert_eq!(Authorization::granted(), Authorization { granted: true, reason: None });
    let denied = Authorization::denied("nope");
    assert!(!denied.granted);
    assert_eq!(denied.reason.as_deref(), Some("nope"));
}
