//! Key material parsing.
//!
//! Keys are given as text, either hexadecimal or base64 (any alphabet, padded or
//! not). Since the hex alphabet is a subset of the base64 ones, the encoding is
//! detected by the decoded length: hex is tried first, then base64, and a key is
//! only accepted when it decodes to the exact length the algorithm requires.

use crate::algorithm::Algorithm;
use crate::error::{TokenError, TokenResult};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use std::fmt;
use zeroize::Zeroizing;

/// Symmetric HMAC secret, wiped from memory on drop.
#[derive(Clone)]
pub struct HmacSecret(Zeroizing<Vec<u8>>);

impl HmacSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HmacSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HmacSecret({} bytes)", self.0.len())
    }
}

/// Public (or symmetric) key used to check signatures.
#[derive(Clone)]
pub enum VerificationKey {
    Hs256(HmacSecret),
    Hs384(HmacSecret),
    Hs512(HmacSecret),
    Es256(p256::ecdsa::VerifyingKey),
    Es384(p384::ecdsa::VerifyingKey),
    Es512(p521::ecdsa::VerifyingKey),
    EdDsa(ed25519_dalek::VerifyingKey),
}

/// Private (or symmetric) key used to produce signatures.
pub enum SigningMaterial {
    Hs256(HmacSecret),
    Hs384(HmacSecret),
    Hs512(HmacSecret),
    Es256(p256::ecdsa::SigningKey),
    Es384(p384::ecdsa::SigningKey),
    Es512(p521::ecdsa::SigningKey),
    EdDsa(ed25519_dalek::SigningKey),
}

impl fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningMaterial({})", self.algorithm())
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationKey::Hs256(secret) | VerificationKey::Hs384(secret) | VerificationKey::Hs512(secret) => {
                write!(f, "VerificationKey({}, {secret:?})", self.algorithm())
            }
            _ => write!(f, "VerificationKey({})", self.algorithm()),
        }
    }
}

impl VerificationKey {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            VerificationKey::Hs256(_) => Algorithm::HS256,
            VerificationKey::Hs384(_) => Algorithm::HS384,
            VerificationKey::Hs512(_) => Algorithm::HS512,
            VerificationKey::Es256(_) => Algorithm::ES256,
            VerificationKey::Es384(_) => Algorithm::ES384,
            VerificationKey::Es512(_) => Algorithm::ES512,
            VerificationKey::EdDsa(_) => Algorithm::EdDSA,
        }
    }
}

impl SigningMaterial {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SigningMaterial::Hs256(_) => Algorithm::HS256,
            SigningMaterial::Hs384(_) => Algorithm::HS384,
            SigningMaterial::Hs512(_) => Algorithm::HS512,
            SigningMaterial::Es256(_) => Algorithm::ES256,
            SigningMaterial::Es384(_) => Algorithm::ES384,
            SigningMaterial::Es512(_) => Algorithm::ES512,
            SigningMaterial::EdDsa(_) => Algorithm::EdDSA,
        }
    }

    /// The matching verification key.
    pub fn verification_key(&self) -> VerificationKey {
        match self {
            SigningMaterial::Hs256(secret) => VerificationKey::Hs256(secret.clone()),
            SigningMaterial::Hs384(secret) => VerificationKey::Hs384(secret.clone()),
            SigningMaterial::Hs512(secret) => VerificationKey::Hs512(secret.clone()),
            SigningMaterial::Es256(key) => VerificationKey::Es256(key.verifying_key().clone()),
            SigningMaterial::Es384(key) => VerificationKey::Es384(key.verifying_key().clone()),
            SigningMaterial::Es512(key) => VerificationKey::Es512(p521::ecdsa::VerifyingKey::from(key)),
            SigningMaterial::EdDsa(key) => VerificationKey::EdDsa(key.verifying_key()),
        }
    }
}

/// Parses a verification key for `algorithm`.
///
/// HMAC keys are the raw secret (32/48/64 bytes); ECDSA and EdDSA keys are a DER
/// SubjectPublicKeyInfo of 91/120/158 and 44 bytes.
pub fn parse_verification_key(algorithm: Algorithm, text: &str) -> TokenResult<VerificationKey> {
    let name = algorithm.as_str();
    let expected = algorithm.verification_key_len();

    if algorithm.is_hmac() {
        let secret = decode_secret(text, expected).ok_or_else(|| {
            TokenError::key_parse(name, format!("expected {expected} bytes in hex or base64"))
        })?;
        return Ok(match algorithm {
            Algorithm::HS256 => VerificationKey::Hs256(secret),
            Algorithm::HS384 => VerificationKey::Hs384(secret),
            _ => VerificationKey::Hs512(secret),
        });
    }

    let der = decode_hex_or_b64(text, expected).ok_or_else(|| {
        TokenError::key_parse(name, format!("expected {expected} DER bytes in hex or base64"))
    })?;

    match algorithm {
        Algorithm::ES256 => {
            use p256::pkcs8::DecodePublicKey;
            p256::ecdsa::VerifyingKey::from_public_key_der(&der)
                .map(VerificationKey::Es256)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        Algorithm::ES384 => {
            use p384::pkcs8::DecodePublicKey;
            p384::ecdsa::VerifyingKey::from_public_key_der(&der)
                .map(VerificationKey::Es384)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        Algorithm::ES512 => {
            use p521::elliptic_curve::sec1::ToEncodedPoint;
            use p521::pkcs8::DecodePublicKey;
            let public =
                p521::PublicKey::from_public_key_der(&der).map_err(|e| TokenError::key_parse(name, e))?;
            p521::ecdsa::VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
                .map(VerificationKey::Es512)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        _ => {
            use ed25519_dalek::pkcs8::DecodePublicKey;
            ed25519_dalek::VerifyingKey::from_public_key_der(&der)
                .map(VerificationKey::EdDsa)
                .map_err(|e| TokenError::key_parse(name, e))
        }
    }
}

/// Parses a signing key for `algorithm`.
///
/// HMAC keys follow the same rules as for verification. ECDSA and EdDSA keys are a
/// PKCS#8 DER private key in hex or base64.
pub fn parse_signing_key(algorithm: Algorithm, text: &str) -> TokenResult<SigningMaterial> {
    let name = algorithm.as_str();

    if algorithm.is_hmac() {
        return match parse_verification_key(algorithm, text)? {
            VerificationKey::Hs256(secret) => Ok(SigningMaterial::Hs256(secret)),
            VerificationKey::Hs384(secret) => Ok(SigningMaterial::Hs384(secret)),
            VerificationKey::Hs512(secret) => Ok(SigningMaterial::Hs512(secret)),
            _ => Err(TokenError::key_parse(name, "not an HMAC key")),
        };
    }

    let der = Zeroizing::new(
        decode_hex_or_b64_any(text)
            .ok_or_else(|| TokenError::key_parse(name, "private key is neither hex nor base64"))?,
    );

    match algorithm {
        Algorithm::ES256 => {
            use p256::pkcs8::DecodePrivateKey;
            p256::ecdsa::SigningKey::from_pkcs8_der(&der)
                .map(SigningMaterial::Es256)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        Algorithm::ES384 => {
            use p384::pkcs8::DecodePrivateKey;
            p384::ecdsa::SigningKey::from_pkcs8_der(&der)
                .map(SigningMaterial::Es384)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        Algorithm::ES512 => {
            use p521::pkcs8::DecodePrivateKey;
            let secret =
                p521::SecretKey::from_pkcs8_der(&der).map_err(|e| TokenError::key_parse(name, e))?;
            p521::ecdsa::SigningKey::from_slice(&secret.to_bytes())
                .map(SigningMaterial::Es512)
                .map_err(|e| TokenError::key_parse(name, e))
        }
        _ => {
            use ed25519_dalek::pkcs8::DecodePrivateKey;
            ed25519_dalek::SigningKey::from_pkcs8_der(&der)
                .map(SigningMaterial::EdDsa)
                .map_err(|e| TokenError::key_parse(name, e))
        }
    }
}

/// Decodes hex or base64 text to exactly `expected` bytes.
pub fn decode_hex_or_b64(text: &str, expected: usize) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.len() == 2 * expected {
        if let Ok(bytes) = hex::decode(text) {
            return Some(bytes);
        }
    }
    [URL_SAFE_NO_PAD, STANDARD_NO_PAD, URL_SAFE, STANDARD]
        .iter()
        .filter_map(|engine| engine.decode(text).ok())
        .find(|bytes| bytes.len() == expected)
}

/// Decodes hex or base64 text of any length.
pub fn decode_hex_or_b64_any(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.len() % 2 == 0 {
        if let Ok(bytes) = hex::decode(text) {
            return Some(bytes);
        }
    }
    [URL_SAFE_NO_PAD, STANDARD_NO_PAD, URL_SAFE, STANDARD]
        .iter()
        .find_map(|engine| engine.decode(text).ok())
}

/// Secret lengths of HS256, HS384 and HS512.
const HMAC_KEY_LENS: [usize; 3] = [32, 48, 64];

/// HMAC secrets: hex, then base64, then the text itself when its length matches.
///
/// The raw text is refused when it is a valid encoding of another HMAC secret
/// length, so `HS512:<32-byte hex>` is an error rather than a 64-byte ASCII key.
fn decode_secret(text: &str, expected: usize) -> Option<HmacSecret> {
    let bytes = decode_hex_or_b64(text, expected).or_else(|| {
        let raw = text.trim().as_bytes();
        let encodes_other_len = HMAC_KEY_LENS
            .iter()
            .any(|&len| len != expected && decode_hex_or_b64(text, len).is_some());
        (raw.len() == expected && !encodes_other_len).then(|| raw.to_vec())
    })?;
    Some(HmacSecret(Zeroizing::new(bytes)))
}
