//! Gateway configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Parsing goes through a lookup closure so tests can feed a fixed map
//! instead of mutating process-global environment. `from_env` is the only
//! caller that touches `std::env`.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";
pub const DEFAULT_PROTECTED_PATHS: &str = "/dashboard";
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/signin";
pub const DEFAULT_BACKEND_LOGIN_PATH: &str = "/api/auth/login";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Ten years.
pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SITE_DIR: &str = "./site";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BACKEND_ORIGIN is required")]
    MissingBackendOrigin,
    #[error("BACKEND_ORIGIN is not a valid origin: {0}")]
    InvalidBackendOrigin(String),
    #[error("{var} must be an absolute path starting with '/': {value:?}")]
    InvalidPath { var: &'static str, value: String },
    #[error("{var} is not a valid number: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("SESSION_TTL_SECS must not exceed {max} seconds, got {value}")]
    SessionTtlTooLong { value: u64, max: u64 },
    #[error("AUTH_PREFIX {auth:?} must sit under API_PREFIX {api:?}")]
    AuthPrefixOutsideApi { api: String, auth: String },
}

/// Outbound HTTP timeouts for calls made to the backend origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

/// Typed gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    /// Origin every non-auth API request is rewritten to.
    pub backend_origin: Url,
    pub api_prefix: String,
    pub auth_prefix: String,
    /// Page patterns that require a session.
    pub protected_paths: Vec<String>,
    pub sign_in_path: String,
    /// Credential check endpoint on the backend origin.
    pub backend_login_path: String,
    pub session_ttl: Duration,
    pub timeouts: BackendTimeouts,
    pub site_dir: PathBuf,
    pub cookie_secure: bool,
}

impl GatewayConfig {
    /// Build config from process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when `BACKEND_ORIGIN` is absent or malformed, or when
    /// any optional variable is present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Required:
    /// - `BACKEND_ORIGIN`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `API_PREFIX` / `AUTH_PREFIX`: `/api` and `/api/auth`
    /// - `PROTECTED_PATHS`: comma-separated, default `/dashboard`
    /// - `SIGN_IN_PATH`: `/auth/signin`
    /// - `BACKEND_LOGIN_PATH`: `/api/auth/login`
    /// - `SESSION_TTL_SECS`: 7 days, at most ten years
    /// - `BACKEND_REQUEST_TIMEOUT_SECS` / `BACKEND_CONNECT_TIMEOUT_SECS`: 30 / 5
    /// - `SITE_DIR`: `./site`
    /// - `COOKIE_SECURE`: inferred from an https `GITHUB_REDIRECT_URI`
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_origin = parse_backend_origin(lookup("BACKEND_ORIGIN").as_deref())?;

        let api_prefix = parse_path("API_PREFIX", lookup("API_PREFIX"), DEFAULT_API_PREFIX)?;
        let auth_prefix = parse_path("AUTH_PREFIX", lookup("AUTH_PREFIX"), DEFAULT_AUTH_PREFIX)?;
        if auth_prefix == "/" {
            return Err(ConfigError::InvalidPath { var: "AUTH_PREFIX", value: auth_prefix });
        }
        if !crate::routes::gate::is_under(&auth_prefix, &api_prefix) {
            return Err(ConfigError::AuthPrefixOutsideApi { api: api_prefix, auth: auth_prefix });
        }

        let protected_paths = parse_protected_paths(lookup("PROTECTED_PATHS").as_deref())?;
        let sign_in_path = parse_path("SIGN_IN_PATH", lookup("SIGN_IN_PATH"), DEFAULT_SIGN_IN_PATH)?;
        let backend_login_path =
            parse_path("BACKEND_LOGIN_PATH", lookup("BACKEND_LOGIN_PATH"), DEFAULT_BACKEND_LOGIN_PATH)?;

        let port = parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let session_ttl_secs = parse_number("SESSION_TTL_SECS", lookup("SESSION_TTL_SECS"), DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::SessionTtlTooLong { value: session_ttl_secs, max: MAX_SESSION_TTL_SECS });
        }
        let session_ttl = Duration::from_secs(session_ttl_secs);
        let timeouts = BackendTimeouts {
            request: Duration::from_secs(parse_number(
                "BACKEND_REQUEST_TIMEOUT_SECS",
                lookup("BACKEND_REQUEST_TIMEOUT_SECS"),
                DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
            )?),
            connect: Duration::from_secs(parse_number(
                "BACKEND_CONNECT_TIMEOUT_SECS",
                lookup("BACKEND_CONNECT_TIMEOUT_SECS"),
                DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
            )?),
        };

        let site_dir = lookup("SITE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SITE_DIR), PathBuf::from);

        let cookie_secure = match lookup("COOKIE_SECURE").as_deref().and_then(parse_bool) {
            Some(value) => value,
            None => lookup("GITHUB_REDIRECT_URI").is_some_and(|uri| uri.starts_with("https://")),
        };

        Ok(Self {
            port,
            backend_origin,
            api_prefix,
            auth_prefix,
            protected_paths,
            sign_in_path,
            backend_login_path,
            session_ttl,
            timeouts,
            site_dir,
            cookie_secure,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_backend_origin(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ConfigError::MissingBackendOrigin);
    }

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBackendOrigin(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBackendOrigin(format!("{raw}: scheme must be http or https")));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidBackendOrigin(format!("{raw}: missing host")));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidBackendOrigin(format!("{raw}: must not carry a path, query or fragment")));
    }
    Ok(url)
}

fn parse_path(var: &'static str, raw: Option<String>, default: &str) -> Result<String, ConfigError> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(default.to_owned());
    };
    normalize_path(raw.trim()).ok_or(ConfigError::InvalidPath { var, value: raw })
}

/// Trim trailing slashes; the root path stays `/`.
fn normalize_path(raw: &str) -> Option<String> {
    if !raw.starts_with('/') || raw.starts_with("//") {
        return None;
    }
    let trimmed = raw.trim_end_matches('/');
    Some(if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() })
}

fn parse_protected_paths(raw: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let raw = raw.filter(|v| !v.trim().is_empty()).unwrap_or(DEFAULT_PROTECTED_PATHS);
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (base, subtree_only) = match entry.strip_suffix("/*") {
                Some(base) => (base, true),
                None => (entry, false),
            };
            let base = normalize_path(if base.is_empty() { "/" } else { base })
                .ok_or_else(|| ConfigError::InvalidPath { var: "PROTECTED_PATHS", value: entry.to_owned() })?;
            Ok(if subtree_only { format!("{}/*", base.trim_end_matches('/')) } else { base })
        })
        .collect()
}

fn parse_number<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw.filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
