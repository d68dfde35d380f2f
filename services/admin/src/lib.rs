//! Portfolio admin service
//!
//! HTTP back end that uploads, reorders, edits and deletes portfolio items.
//! Changes go to the local working tree or, in production, to the site's
//! GitHub repository as one commit per request.

pub mod build_hook;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::AdminConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
