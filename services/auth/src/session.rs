//! The admin session and the signed cookie that carries it

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use cookie::time::Duration;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "admin_session";

/// Lifetime of a session cookie
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Session stored as JSON in the `admin_session` cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub username: String,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            username: username.into(),
        }
    }

    /// Read the session from a jar; tampered or malformed cookies yield `None`
    pub fn from_jar(jar: &SignedCookieJar) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        serde_json::from_str(cookie.value()).ok()
    }

    /// Whether this session may use the admin endpoints
    pub fn is_admitted(&self, allowed_users: &[String]) -> bool {
        self.authenticated && allowed_users.iter().any(|user| user == &self.username)
    }

    pub fn to_cookie(&self, secure: bool) -> Result<Cookie<'static>, serde_json::Error> {
        let value = serde_json::to_string(self)?;
        Ok(Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
            .secure(secure)
            .build())
    }
}

/// Cookie matching the session cookie's path, for removal
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
