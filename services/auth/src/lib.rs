//! Cookie session authentication for the portfolio admin
//!
//! A single admin password (Argon2) and an allow-list of usernames. A
//! successful login stores a signed `admin_session` cookie; the session gate
//! admits requests whose cookie names an allowed user.

pub mod error;
pub mod middleware;
pub mod password;
pub mod rate_limiter;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use error::AuthError;
pub use middleware::require_session;
pub use password::{hash_password, verify_password};
pub use session::{SESSION_COOKIE, Session};
pub use state::{AuthConfig, AuthState};
