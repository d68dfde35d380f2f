//! Login, logout and session routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    error::AuthError,
    middleware::require_session,
    password::verify_password,
    session::{Session, removal_cookie},
    state::AuthState,
    validation::validate_username,
};

/// Request for admin login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for admin login
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
}

/// Response describing the current session
#[derive(Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub username: String,
}

/// Create the authentication routes; logout and session sit behind the gate
pub fn router<S>(state: AuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let gated = Router::new()
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/session", get(session))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/api/admin/login", post(login))
        .merge(gated)
        .with_state(state)
}

/// Admin login endpoint
pub async fn login(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for user: {}", payload.username);

    let rejected = || AuthError::Unauthorized("Invalid username or password".to_string());

    validate_username(&payload.username).map_err(|_| rejected())?;

    if state.throttle().is_locked(&payload.username).await {
        warn!("Login for locked out user {}", payload.username);
        return Err(AuthError::LockedOut);
    }

    let config = state.config();
    let password_hash = config.password_hash.as_deref().ok_or_else(rejected)?;

    let allowed = config.allowed_users.contains(&payload.username);
    let valid = verify_password(&payload.password, password_hash).map_err(|e| {
        error!("Failed to verify password: {}", e);
        AuthError::InternalServerError
    })?;

    if !(allowed && valid) {
        state.throttle().record_failure(&payload.username).await;
        warn!("Rejected login for {}", payload.username);
        return Err(rejected());
    }

    state.throttle().clear(&payload.username).await;

    let cookie = Session::new(payload.username.clone())
        .to_cookie(config.secure_cookie)
        .map_err(|e| {
            error!("Failed to encode session: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} logged in", payload.username);

    Ok((
        StatusCode::OK,
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            username: payload.username,
        }),
    ))
}

/// Logout endpoint
pub async fn logout(
    Extension(session): Extension<Session>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    info!("User {} logged out", session.username);

    (
        jar.remove(removal_cookie()),
        Json(serde_json::json!({"success": true})),
    )
}

/// Current session endpoint
pub async fn session(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(SessionResponse {
        authenticated: session.authenticated,
        username: session.username,
    })
}
