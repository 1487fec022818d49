//! Auth routes: provider sign-in, callbacks, session lookup, sign-out.
//!
//! Everything here lives under the auth prefix, which the route gate
//! handles locally instead of proxying to the backend.

use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::services::credentials::Credentials;
use crate::services::{github, session};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";
const OAUTH_STATE_COOKIE: &str = "oauth_state";

// =============================================================================
// PROVIDERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Credentials,
    GitHub,
}

impl ProviderKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "credentials" => Some(Self::Credentials),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::GitHub => "github",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// `"credentials"` or `"oauth"`.
    pub kind: &'static str,
}

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(token: String, secure: bool, ttl: std::time::Duration) -> Cookie<'static> {
    let max_age = Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn cleared_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = app_state
            .sessions
            .validate(token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Body of the credentials callback answer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /api/auth/providers`: list configured providers.
pub async fn providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let mut list = vec![ProviderInfo { id: "credentials", name: "Finnance", kind: "credentials" }];
    if state.github.is_some() {
        list.push(ProviderInfo { id: "github", name: "GitHub", kind: "oauth" });
    }
    Json(list)
}

/// `GET /api/auth/signin/{provider}`: start a provider flow.
///
/// Credentials sign-in is a page, so that provider redirects to the sign-in
/// page; OAuth providers redirect to the identity provider.
pub async fn signin(State(state): State<AppState>, Path(provider): Path<String>) -> Response {
    match ProviderKind::parse(&provider) {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(ProviderKind::Credentials) => Redirect::to(&state.config.sign_in_path).into_response(),
        Some(ProviderKind::GitHub) => github_redirect(&state),
    }
}

fn github_redirect(state: &AppState) -> Response {
    let Some(config) = &state.github else {
        return (StatusCode::SERVICE_UNAVAILABLE, "GitHub OAuth not configured").into_response();
    };

    let oauth_state = session::generate_token();
    let authorize_url = match config.authorize_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "github authorize url failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, oauth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&authorize_url)).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `POST /api/auth/callback/{provider}`: credentials exchange.
///
/// Answers `200 {"auth":true}` with a session cookie when the backend grants
/// the login, `401 {"auth":false,"reason":..}` otherwise.
pub async fn callback_credentials(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(provider): Path<String>,
    Json(credentials): Json<Credentials>,
) -> Response {
    match ProviderKind::parse(&provider) {
        None => return StatusCode::NOT_FOUND.into_response(),
        Some(ProviderKind::GitHub) => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
        Some(ProviderKind::Credentials) => {}
    }

    let authorization = state.authorizer.authorize(&credentials).await;
    if !authorization.granted {
        let body = LoginResponse { auth: false, reason: authorization.reason };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let user = session::SessionUser::new(credentials.username, ProviderKind::Credentials.id());
    let token = match state.sessions.issue(user).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };

    let jar = jar.add(session_cookie(token, state.config.cookie_secure, state.config.session_ttl));
    (jar, Json(LoginResponse { auth: true, reason: None })).into_response()
}

/// `GET /api/auth/callback/{provider}`: OAuth code exchange, then redirect to `/`.
pub async fn callback_oauth(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(provider): Path<String>,
    Query(params): Query<CallbackQuery>,
) -> Response {
    match ProviderKind::parse(&provider) {
        None => return StatusCode::NOT_FOUND.into_response(),
        Some(ProviderKind::Credentials) => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
        Some(ProviderKind::GitHub) => {}
    }
    let Some(config) = &state.github else {
        return (StatusCode::SERVICE_UNAVAILABLE, "GitHub OAuth not configured").into_response();
    };
    let secure = state.config.cookie_secure;

    // Verify OAuth CSRF state from cookie.
    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing oauth state").into_response();
    };
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(Cookie::value)
        .unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    let access_token = match github::exchange_code(&state.http, config, &params.code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return (StatusCode::BAD_GATEWAY, "OAuth code exchange failed").into_response();
        }
    };

    let gh_user = match github::fetch_github_user(&state.http, &access_token).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "github user fetch failed");
            return (StatusCode::BAD_GATEWAY, "Failed to fetch GitHub profile").into_response();
        }
    };
    tracing::info!(github_id = gh_user.id, "github sign-in");

    let user = session::SessionUser::new(gh_user.login, ProviderKind::GitHub.id());
    let token = match state.sessions.issue(user).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };

    let jar = jar
        .add(session_cookie(token, secure, state.config.session_ttl))
        .add(cleared_cookie(OAUTH_STATE_COOKIE, secure));
    (jar, Redirect::temporary("/")).into_response()
}

/// `GET /api/auth/session`: return current user.
pub async fn current_session(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/signout`: delete session, clear cookie.
pub async fn signout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = state.sessions.destroy(&auth.token).await {
        tracing::warn!(error = %e, "session delete failed");
    }

    let jar = CookieJar::new().add(cleared_cookie(SESSION_COOKIE, state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
