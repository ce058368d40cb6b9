//! Access controller construction errors.

use sigil_token::TokenError;
use thiserror::Error;

/// Errors raised while building an [`AccessController`](crate::access::AccessController).
///
/// All of them are configuration mistakes; per-request failures never surface as
/// errors, they just leave the request unauthenticated.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("plan list must alternate names and permissions, got {0} items")]
    OddPlanList(usize),

    #[error("plan list item #{index} must be a {expected}")]
    InvalidPlanEntry {
        index: usize,
        expected: &'static str,
    },

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}
