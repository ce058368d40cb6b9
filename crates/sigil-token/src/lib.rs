//! # sigil-token
//!
//! Compact token (JWT) issuance and verification for Sigil.
//!
//! This crate provides functionality for:
//! - Parsing key descriptors (`"<secret>"`, `"ALGO:<key>"`) into typed key material
//! - Verifying tokens and extracting access or refresh claims
//! - Signing and issuing tokens with a bounded lifetime
//!
//! ## Algorithms
//!
//! | Family | Algorithms | Verification key |
//! |--------|------------|------------------|
//! | **HMAC** | HS256, HS384, HS512 | 32, 48 or 64 byte secret |
//! | **ECDSA** | ES256, ES384, ES512 | DER SubjectPublicKeyInfo (91, 120, 158 bytes) |
//! | **EdDSA** | Ed25519 | DER SubjectPublicKeyInfo (44 bytes) |
//!
//! Keys are given in hex or base64. RSA (`RS*`, `PS*`) is rejected as unsupported.
//!
//! ## Buffer reuse
//!
//! [`Verifier::claims`] leaves the token untouched and allocates the decoded
//! payload. [`Verifier::claims_in_place`] decodes the payload inside the token
//! buffer instead; [`Verifier::reuse`] tells callers which one was configured.

pub mod algorithm;
pub mod claims;
pub mod codec;
pub mod engine;
pub mod error;
pub mod keys;
pub mod ttl;
pub mod verifier;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use algorithm::Algorithm;
pub use claims::{AccessClaims, Expiring, RefreshClaims};
pub use error::{TokenError, TokenResult};
pub use keys::{SigningMaterial, VerificationKey};
pub use verifier::{KeyDescriptor, Tokenizer, Verifier, inspect_unverified};
