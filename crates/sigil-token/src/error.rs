//! Error types for the token crate.

use thiserror::Error;

/// Errors that can occur while building verifiers, checking tokens or issuing them.
///
/// Setup errors (`KeyParse` to `RemoteDescriptor`) abort the construction of a
/// verifier. The per-token errors (`MalformedToken` to `MissingExpiry`) are
/// recoverable: the request carrying the token is simply unauthenticated.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Key text could not be decoded or parsed for the requested algorithm.
    #[error("invalid {algorithm} key: {reason}")]
    KeyParse {
        algorithm: &'static str,
        reason: String,
    },

    /// The descriptor names an algorithm this crate does not know.
    #[error("unknown algorithm {0:?}")]
    UnknownAlgorithm(String),

    /// The descriptor names a known algorithm that is deliberately not supported.
    #[error("algorithm {0} is not supported (only HS*, ES* and EdDSA are)")]
    UnsupportedAlgorithm(String),

    /// A bare HMAC secret must not contain a colon.
    #[error("HMAC secret must not contain ':'")]
    ColonInKey,

    /// The descriptor is a URL: the key must be fetched by the caller first.
    #[error("remote key descriptor {0:?} must be resolved before building a verifier")]
    RemoteDescriptor(String),

    /// The token does not have the `header.payload.signature` shape.
    #[error("token must have three dot-separated parts")]
    MalformedToken,

    /// Signature does not match header and payload.
    #[error("bad token signature")]
    BadSignature,

    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url")]
    PayloadEncoding,

    /// The payload is not the expected JSON claims object.
    #[error("{source} => cannot JSON-decode claims: {payload}")]
    ClaimsDecode {
        #[source]
        source: serde_json::Error,
        payload: String,
    },

    /// The token has expired.
    #[error("token expired at {expired_at} (now {now})")]
    Expired { expired_at: i64, now: i64 },

    /// The token does not declare an expiry.
    #[error("token has no expiry")]
    MissingExpiry,

    /// A duration string (timeout, max TTL) could not be parsed.
    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Requested timeout is longer than the allowed maximum TTL.
    #[error("timeout {timeout} exceeds max TTL {max_ttl}")]
    TimeoutExceedsMaxTtl { timeout: String, max_ttl: String },

    /// Signing failed inside the signature engine.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Claims could not be serialized.
    #[error("claims serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TokenError {
    pub(crate) fn key_parse(algorithm: &'static str, reason: impl ToString) -> Self {
        TokenError::KeyParse {
            algorithm,
            reason: reason.to_string(),
        }
    }

    /// Whether this error belongs to the per-token class (as opposed to setup or issuance).
    pub fn is_per_token(&self) -> bool {
        matches!(
            self,
            TokenError::MalformedToken
                | TokenError::BadSignature
                | TokenError::PayloadEncoding
                | TokenError::ClaimsDecode { .. }
                | TokenError::Expired { .. }
                | TokenError::MissingExpiry
        )
    }
}

/// Result alias used across the crate.
pub type TokenResult<T> = Result<T, TokenError>;
