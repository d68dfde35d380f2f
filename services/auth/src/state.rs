use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::AuthError;
use crate::rate_limiter::{LoginThrottle, LoginThrottleConfig};

/// Minimum length of the cookie signing secret
pub const MIN_SECRET_LEN: usize = 64;

fn default_secure_cookie() -> bool {
    true
}

/// Authentication settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Usernames admitted by the session gate
    #[serde(default)]
    pub allowed_users: Vec<String>,
    /// Argon2 PHC string of the admin password
    pub password_hash: Option<String>,
    /// Secret used to sign session cookies
    pub cookie_secret: Option<String>,
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
    #[serde(default)]
    pub login_throttle: LoginThrottleConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_users: Vec::new(),
            password_hash: None,
            cookie_secret: None,
            secure_cookie: default_secure_cookie(),
            login_throttle: LoginThrottleConfig::default(),
        }
    }
}

/// State shared by the login routes and the session gate
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    key: Key,
    throttle: LoginThrottle,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let key = match config.cookie_secret.as_deref() {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Key::try_from(secret.as_bytes())
                .map_err(|e| AuthError::Configuration(format!("Invalid cookie secret: {}", e)))?,
            Some(_) => {
                return Err(AuthError::Configuration(format!(
                    "cookie_secret must be at least {} bytes",
                    MIN_SECRET_LEN
                )));
            }
            None => {
                warn!("No cookie secret configured, sessions will not survive a restart");
                Key::generate()
            }
        };

        if config.password_hash.is_none() {
            warn!("No admin password hash configured, every login will be rejected");
        }

        let throttle = LoginThrottle::new(config.login_throttle.clone());

        Ok(Self {
            config: Arc::new(config),
            key,
            throttle,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn throttle(&self) -> &LoginThrottle {
        &self.throttle
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_is_rejected() {
        let config = AuthConfig {
            cookie_secret: Some("too short".to_string()),
            ..AuthConfig::default()
        };
        assert!(matches!(
            AuthState::new(config),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_secret_generates_a_key() {
        assert!(AuthState::new(AuthConfig::default()).is_ok());
    }

    #[test]
    fn test_defaults_from_partial_config() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"allowed_users": ["admin"], "password_hash": null}"#).unwrap();

        assert_eq!(config.allowed_users, vec!["admin".to_string()]);
        assert!(config.secure_cookie);
        assert_eq!(config.login_throttle.max_failures, 5);
    }
}
