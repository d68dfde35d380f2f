//! Session gate in front of the admin endpoints

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::warn;

use crate::{error::AuthError, session::Session, state::AuthState};

/// Reject requests without an admitted session before the handler runs.
///
/// The session is made available to handlers as a request extension.
pub async fn require_session(
    State(state): State<AuthState>,
    jar: SignedCookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let session = Session::from_jar(&jar).ok_or_else(AuthError::unauthorized)?;

    if !session.is_admitted(&state.config().allowed_users) {
        warn!(
            "Rejected session for {} on {}",
            session.username,
            req.uri().path()
        );
        return Err(AuthError::unauthorized());
    }

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
