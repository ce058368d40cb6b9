//! Signature algorithms and their key sizes.

use crate::error::TokenError;
use std::fmt;
use std::str::FromStr;

/// A supported token signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
    ES256,
    ES384,
    ES512,
    EdDSA,
}

impl Algorithm {
    /// All supported algorithms.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
        Algorithm::EdDSA,
    ];

    /// HMAC auto-detection order for descriptors without an algorithm.
    pub const HMAC_DETECTION_ORDER: [Algorithm; 3] =
        [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

    /// Name used in the `alg` header field and in key descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
            Algorithm::EdDSA => "EdDSA",
        }
    }

    pub fn is_hmac(self) -> bool {
        matches!(self, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
    }

    /// Exact byte length of the verification key:
    /// the raw secret for HMAC, the DER SubjectPublicKeyInfo otherwise.
    pub fn verification_key_len(self) -> usize {
        match self {
            Algorithm::HS256 => 32,
            Algorithm::HS384 => 48,
            Algorithm::HS512 => 64,
            Algorithm::ES256 => 91,
            Algorithm::ES384 => 120,
            Algorithm::ES512 => 158,
            Algorithm::EdDSA => 44,
        }
    }

    /// Byte length of a raw signature: the HMAC tag, r‖s for ECDSA, 64 for Ed25519.
    pub fn signature_len(self) -> usize {
        match self {
            Algorithm::HS256 => 32,
            Algorithm::HS384 => 48,
            Algorithm::HS512 => 64,
            Algorithm::ES256 => 64,
            Algorithm::ES384 => 96,
            Algorithm::ES512 => 132,
            Algorithm::EdDSA => 64,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TokenError;

    /// Case-insensitive. RSA names are recognised and rejected as unsupported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            "ES256" => Ok(Algorithm::ES256),
            "ES384" => Ok(Algorithm::ES384),
            "ES512" => Ok(Algorithm::ES512),
            "EDDSA" => Ok(Algorithm::EdDSA),
            upper @ ("RS256" | "RS384" | "RS512" | "PS256" | "PS384" | "PS512") => {
                Err(TokenError::UnsupportedAlgorithm(upper.to_string()))
            }
            _ => Err(TokenError::UnknownAlgorithm(s.to_string())),
        }
    }
}
