//! GitHub OAuth provider: authorize URL, code exchange, profile fetch.

use reqwest::Url;

const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const USER_ENDPOINT: &str = "https://api.github.com/user";

/// GitHub OAuth configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GitHubConfig {
    /// Load from `GITHUB_ID`, `GITHUB_SECRET`, `GITHUB_REDIRECT_URI`.
    /// Returns `None` if any are missing (provider will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let client_id = present("GITHUB_ID")?;
        let client_secret = present("GITHUB_SECRET")?;
        let redirect_uri = present("GITHUB_REDIRECT_URI")?;
        Some(Self { client_id, client_secret, redirect_uri })
    }

    /// Build the GitHub authorization URL carrying the CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters cannot form a valid URL.
    pub fn authorize_url(&self, state: &str) -> Result<String, GitHubAuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", "read:user"),
            ("state", state),
        ];
        Url::parse_with_params(AUTHORIZE_ENDPOINT, &params)
            .map(String::from)
            .map_err(|e| GitHubAuthError::AuthorizeUrl(e.to_string()))
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GitHubAuthError {
    #[error("github authorize url invalid: {0}")]
    AuthorizeUrl(String),
    #[error("github token exchange failed: {0}")]
    TokenExchange(String),
    #[error("github api error: {0}")]
    GitHubApi(String),
}

/// Exchange an OAuth code for an access token.
pub async fn exchange_code(client: &reqwest::Client, config: &GitHubConfig, code: &str) -> Result<String, GitHubAuthError> {
    let resp = client
        .post(TOKEN_ENDPOINT)
        .header("Accept", "application/json")
        .json(&serde_json::json!({
            "client_id": config.client_id,
            "client_secret": config.client_secret,
            "code": code,
            "redirect_uri": config.redirect_uri,
        }))
        .send()
        .await
        .map_err(|e| GitHubAuthError::TokenExchange(e.to_string()))?;

    let body = resp
        .text()
        .await
        .map_err(|e| GitHubAuthError::TokenExchange(e.to_string()))?;
    parse_token_response(&body)
}

fn parse_token_response(body: &str) -> Result<String, GitHubAuthError> {
    let token_resp: TokenResponse = serde_json::from_str(body)
        .map_err(|_| GitHubAuthError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the authenticated GitHub user's profile.
pub async fn fetch_github_user(client: &reqwest::Client, access_token: &str) -> Result<GitHubUser, GitHubAuthError> {
    let resp = client
        .get(USER_ENDPOINT)
        .header("Authorization", format!("Bearer {access_token}"))
        .header("User-Agent", "finnance-gateway")
        .send()
        .await
        .map_err(|e| GitHubAuthError::GitHubApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(GitHubAuthError::GitHubApi(format!("{status}: {body}")));
    }

    resp.json::<GitHubUser>()
        .await
        .map_err(|e| GitHubAuthError::GitHubApi(e.to_string()))
}

#[cfg(test)]
#[path = "github_test.rs"]
mod tests;
