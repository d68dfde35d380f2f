//! Authentication errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, invalid or unknown session, or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Too many failed logins for this username
    #[error("Too many failed login attempts, try again later")]
    LockedOut,

    /// Invalid authentication settings
    #[error("Invalid auth configuration: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    pub fn unauthorized() -> Self {
        AuthError::Unauthorized("Authentication required".to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AuthError::Unauthorized(_) | AuthError::LockedOut => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::Configuration(_) | AuthError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(serde_json::json!({
            "error": error,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
