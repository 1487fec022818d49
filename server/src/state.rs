//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and the route gate via the
//! `State` extractor. Every member is cheap to clone: config and the session
//! store sit behind `Arc`, and `reqwest::Client` is internally ref-counted.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::routes::proxy;
use crate::services::credentials::{CredentialAuthorizer, CredentialSetupError};
use crate::services::github::GitHubConfig;
use crate::services::session::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Credentials(#[from] CredentialSetupError),
    #[error("backend http client build failed: {0}")]
    BackendClient(#[from] reqwest::Error),
}

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub authorizer: CredentialAuthorizer,
    /// GitHub provider. `None` if its env vars are not configured.
    pub github: Option<GitHubConfig>,
    /// Outbound client for proxied API calls and provider exchanges.
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the login endpoint is malformed or an HTTP client
    /// cannot be built.
    pub fn new(
        config: GatewayConfig,
        sessions: Arc<dyn SessionStore>,
        github: Option<GitHubConfig>,
    ) -> Result<Self, StateError> {
        let authorizer = CredentialAuthorizer::new(&config.backend_origin, &config.backend_login_path, config.timeouts)?;
        let http = proxy::build_backend_client(config.timeouts)?;
        Ok(Self { config: Arc::new(config), sessions, authorizer, github, http })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
