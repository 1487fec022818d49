//! Credential strategy: username/password exchange against the backend.
//!
//! The backend login endpoint is the only authority. Any 2xx grants, anything
//! else denies, and transport failures deny as well. The response body is not
//! inspected.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::BackendTimeouts;

/// A username/password pair for a single authorization attempt.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub granted: bool,
    /// Denial reason; always `None` when granted.
    pub reason: Option<String>,
}

impl Authorization {
    #[must_use]
    pub fn granted() -> Self {
        Self { granted: true, reason: None }
    }

    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self { granted: false, reason: Some(reason.into()) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialSetupError {
    #[error("invalid login endpoint {path:?}: {message}")]
    InvalidEndpoint { path: String, message: String },
    #[error("http client build failed: {0}")]
    Client(String),
}

/// Posts credentials to the backend login endpoint.
#[derive(Debug, Clone)]
pub struct CredentialAuthorizer {
    client: reqwest::Client,
    login_url: Url,
}

impl CredentialAuthorizer {
    /// # Errors
    ///
    /// Returns an error if the login path cannot be joined onto the origin or
    /// the HTTP client fails to build.
    pub fn new(backend_origin: &Url, login_path: &str, timeouts: BackendTimeouts) -> Result<Self, CredentialSetupError> {
        let login_url = backend_origin
            .join(login_path)
            .map_err(|e| CredentialSetupError::InvalidEndpoint { path: login_path.to_owned(), message: e.to_string() })?;
        let client = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| CredentialSetupError::Client(e.to_string()))?;
        Ok(Self { client, login_url })
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Submit `credentials` to the backend and report whether it accepted them.
    pub async fn authorize(&self, credentials: &Credentials) -> Authorization {
        let resp = match self
            .client
            .post(self.login_url.clone())
            .json(credentials)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    "credential login request failed"
                );
                return Authorization::denied("login request failed");
            }
        };

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(%status, "credential login granted");
            Authorization::granted()
        } else {
            tracing::info!(%status, "credential login denied");
            Authorization::denied(format!("login rejected with status {status}"))
        }
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
