//! REST helpers for the sign-in flow and session view.
//!
//! Browser (`csr`): real HTTP calls via `gloo-net`. Native builds (tests)
//! get stubs, since these calls only make sense against the gateway.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Option`/`Result`/`LoginOutcome` values instead of panics so a
//! failed call turns into a field error rather than a broken page.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

#[cfg(any(test, feature = "csr"))]
use super::types::LoginReply;
use super::types::SessionUser;
use crate::state::signin::LoginOutcome;

#[cfg(any(test, feature = "csr"))]
const USERS_EXISTS_ENDPOINT: &str = "/api/users/exists";
#[cfg(any(test, feature = "csr"))]
const CREDENTIALS_CALLBACK_ENDPOINT: &str = "/api/auth/callback/credentials";
#[cfg(any(test, feature = "csr"))]
const SIGNOUT_ENDPOINT: &str = "/api/auth/signout";

#[cfg(any(test, feature = "csr"))]
fn exists_failed_message(status: u16) -> String {
    format!("existence check failed: {status}")
}

/// Map the credentials callback answer onto a login outcome. A reply that
/// says `auth: false` wins over a success status.
#[cfg(any(test, feature = "csr"))]
fn login_outcome(status: u16, reply: Option<LoginReply>) -> LoginOutcome {
    match status {
        200..=299 if reply.as_ref().is_none_or(|r| r.auth) => LoginOutcome::Granted,
        200..=299 | 401 | 403 => LoginOutcome::Denied,
        other => LoginOutcome::Failed(
            reply
                .and_then(|r| r.reason)
                .unwrap_or_else(|| format!("unexpected status {other}")),
        ),
    }
}

#[cfg(any(test, feature = "csr"))]
fn sign_out_result(status: u16) -> Result<(), String> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(format!("sign-out failed: {status}"))
    }
}

/// Ask the backend whether `username` exists via `GET /api/users/exists`.
///
/// # Errors
///
/// Returns an error string if the request fails or the answer is not OK.
pub async fn username_exists(username: &str) -> Result<bool, String> {
    #[cfg(feature = "csr")]
    {
        let resp = gloo_net::http::Request::get(USERS_EXISTS_ENDPOINT)
            .query([("username", username)])
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(exists_failed_message(resp.status()));
        }
        let body: super::types::ExistsResponse = resp.json().await.map_err(|e| e.to_string())?;
        Ok(body.exists)
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = username;
        Err("not available outside the browser".to_owned())
    }
}

/// Submit credentials to `POST /api/auth/callback/credentials`.
pub async fn login(username: &str, password: &str) -> LoginOutcome {
    #[cfg(feature = "csr")]
    {
        let body = super::types::LoginBody { username, password };
        let request = match gloo_net::http::Request::post(CREDENTIALS_CALLBACK_ENDPOINT).json(&body) {
            Ok(request) => request,
            Err(e) => return LoginOutcome::Failed(e.to_string()),
        };
        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                login_outcome(status, resp.json::<LoginReply>().await.ok())
            }
            Err(e) => LoginOutcome::Failed(e.to_string()),
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (username, password);
        LoginOutcome::Failed("not available outside the browser".to_owned())
    }
}

/// Fetch the signed-in user from `/api/auth/session`.
/// Returns `None` if not signed in or outside the browser.
pub async fn fetch_session() -> Option<SessionUser> {
    #[cfg(feature = "csr")]
    {
        let resp = gloo_net::http::Request::get("/api/auth/session")
            .send()
            .await
            .ok()?;
        if !resp.ok() {
            return None;
        }
        resp.json::<SessionUser>().await.ok()
    }
    #[cfg(not(feature = "csr"))]
    {
        None
    }
}

/// End the session via `POST /api/auth/signout`.
///
/// # Errors
///
/// Returns an error string if the request fails or the gateway does not
/// confirm; the session cookie may then still be live.
pub async fn sign_out() -> Result<(), String> {
    #[cfg(feature = "csr")]
    {
        let resp = gloo_net::http::Request::post(SIGNOUT_ENDPOINT)
            .send()
            .await
            .map_err(|e| format!("sign-out failed: {e}"))?;
        sign_out_result(resp.status())
    }
    #[cfg(not(feature = "csr"))]
    {
        Err("not available outside the browser".to_owned())
    }
}
