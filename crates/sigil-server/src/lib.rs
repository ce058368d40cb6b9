//! # sigil-server
//!
//! Cookie-based access control for axum, backed by `sigil-token`.
//!
//! The [`AccessController`] signs the user's plan into a cookie and turns it back
//! into a [`Perm`] on later requests. See [`access`] for the three policies.

pub mod access;
pub mod cookie;
pub mod error;
pub mod plans;
pub mod routes;
pub mod state;

pub use access::{AccessController, Rejection};
pub use cookie::{CookieSpec, DEFAULT_COOKIE_NAME};
pub use error::AccessError;
pub use plans::{DEFAULT_PERM, DEFAULT_PLAN, Perm, PermissionTable, Plan};
pub use state::AppState;
