//! Request authentication configuration.
//!
//! The transport names (`X-User-Data`, `accessToken`, `userId`) are part of
//! the contract with the front-end and the API gateway, so they are constants
//! rather than settings.

use std::env;
use std::time::Duration;

/// Header carrying the identity payload injected by the trusted gateway.
pub const TRUSTED_HEADER: &str = "x-user-data";
/// Cookie holding the signed access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Query parameter holding a bare user identifier.
pub const USER_ID_PARAM: &str = "userId";

pub const DEFAULT_UNAUTHORIZED_MESSAGE: &str = "No se encontraron credenciales válidas";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Message returned in the 401 body when no credential could be resolved.
    pub unauthorized_message: String,
    /// Upper bound on the single store round-trip of the identifier lookup.
    pub store_timeout: Duration,
    /// Whether the unsigned `userId` query parameter is accepted at all.
    pub user_id_fallback_enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            unauthorized_message: DEFAULT_UNAUTHORIZED_MESSAGE.to_string(),
            store_timeout: Duration::from_millis(5000),
            user_id_fallback_enabled: true,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            unauthorized_message: env::var("AUTH_UNAUTHORIZED_MESSAGE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.unauthorized_message),
            store_timeout: env::var("AUTH_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            user_id_fallback_enabled: env::var("AUTH_USER_ID_FALLBACK_ENABLED")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.user_id_fallback_enabled),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn test_defaults_keep_fallback_enabled() {
        let config = AuthConfig::default();
        assert!(config.user_id_fallback_enabled);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.unauthorized_message, DEFAULT_UNAUTHORIZED_MESSAGE);
    }
}
