use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

fn minimal() -> Vec<(&'static str, &'static str)> {
    vec![("BACKEND_ORIGIN", "http://localhost:5000")]
}

// =============================================================================
// BACKEND_ORIGIN
// =============================================================================

#[test]
fn missing_backend_origin_is_fatal() {
    let err = GatewayConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::MissingBackendOrigin);
}

#[test]
fn blank_backend_origin_is_fatal() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BACKEND_ORIGIN", "   ")])).unwrap_err();
    assert_eq!(err, ConfigError::MissingBackendOrigin);
}

#[test]
fn unparsable_backend_origin_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BACKEND_ORIGIN", "not a url")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackendOrigin(_)));
}

#[test]
fn non_http_backend_origin_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BACKEND_ORIGIN", "ftp://files.example.com")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackendOrigin(_)));
}

#[test]
fn backend_origin_with_path_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BACKEND_ORIGIN", "http://localhost:5000/v1")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBackendOrigin(_)));
}

#[test]
fn backend_origin_trailing_slash_is_accepted() {
    let config = GatewayConfig::from_lookup(lookup_from(&[("BACKEND_ORIGIN", "http://localhost:5000/")])).unwrap();
    assert_eq!(config.backend_origin.as_str(), "http://localhost:5000/");
}

#[test]
fn config_error_display_names_variable() {
    assert!(ConfigError::MissingBackendOrigin.to_string().contains("BACKEND_ORIGIN"));
}

// =============================================================================
// DEFAULTS
// =============================================================================

#[test]
fn defaults_apply_when_only_origin_is_set() {
    let config = GatewayConfig::from_lookup(lookup_from(&minimal())).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.api_prefix, "/api");
    assert_eq!(config.auth_prefix, "/api/auth");
    assert_eq!(config.protected_paths, vec!["/dashboard".to_owned()]);
    assert_eq!(config.sign_in_path, "/auth/signin");
    assert_eq!(config.backend_login_path, "/api/auth/login");
    assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
    assert_eq!(config.timeouts.request, Duration::from_secs(30));
    assert_eq!(config.timeouts.connect, Duration::from_secs(5));
    assert_eq!(config.site_dir, PathBuf::from("./site"));
    assert!(!config.cookie_secure);
}

// =============================================================================
// OVERRIDES
// =============================================================================

#[test]
fn protected_paths_are_split_and_trimmed() {
    let mut pairs = minimal();
    pairs.push(("PROTECTED_PATHS", " /dashboard , /accounts/ ,, /flows/* "));
    let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(config.protected_paths, vec!["/dashboard", "/accounts", "/flows/*"]);
}

#[test]
fn protected_path_without_leading_slash_is_rejected() {
    let mut pairs = minimal();
    pairs.push(("PROTECTED_PATHS", "dashboard"));
    let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPath { var: "PROTECTED_PATHS", .. }));
}

#[test]
fn invalid_port_is_rejected() {
    let mut pairs = minimal();
    pairs.push(("PORT", "eighty"));
    let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidNumber { var: "PORT", .. }));
}

#[test]
fn oversized_session_ttl_is_rejected_at_startup() {
    let mut pairs = minimal();
    pairs.push(("SESSION_TTL_SECS", "18446744073709551615"));
    let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(
        err,
        ConfigError::SessionTtlTooLong { value: u64::MAX, max: MAX_SESSION_TTL_SECS }
    );
}

#[test]
fn session_ttl_at_the_ceiling_is_accepted() {
    let ceiling = MAX_SESSION_TTL_SECS.to_string();
    let pairs = [("BACKEND_ORIGIN", "http://localhost:5000"), ("SESSION_TTL_SECS", ceiling.as_str())];
    let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(config.session_ttl, Duration::from_secs(MAX_SESSION_TTL_SECS));
}

#[test]
fn auth_prefix_must_sit_under_api_prefix() {
    let mut pairs = minimal();
    pairs.push(("AUTH_PREFIX", "/auth"));
    let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(matches!(err, ConfigError::AuthPrefixOutsideApi { .. }));
}

#[test]
fn prefix_trailing_slash_is_normalized() {
    let mut pairs = minimal();
    pairs.push(("API_PREFIX", "/backend/"));
    pairs.push(("AUTH_PREFIX", "/backend/session/"));
    let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(config.api_prefix, "/backend");
    assert_eq!(config.auth_prefix, "/backend/session");
}

#[test]
fn cookie_secure_explicit_value_wins() {
    let mut pairs = minimal();
    pairs.push(("COOKIE_SECURE", "off"));
    pairs.push(("GITHUB_REDIRECT_URI", "https://finnance.example.com/api/auth/callback/github"));
    let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert!(!config.cookie_secure);
}

#[test]
fn cookie_secure_inferred_from_https_redirect() {
    let mut pairs = minimal();
    pairs.push(("GITHUB_REDIRECT_URI", "https://finnance.example.com/api/auth/callback/github"));
    let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert!(config.cookie_secure);
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "  On  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}
