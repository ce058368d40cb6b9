//! Signature engines, dispatched on the key variant.
//!
//! Both operations work on the signing input `header.payload` and on the
//! base64url form of the signature, as they appear in a compact token.

mod ecdsa;
mod eddsa;
mod hmac;

use crate::algorithm::Algorithm;
use crate::codec::{b64_decode_into, b64_encode};
use crate::error::TokenResult;
use crate::keys::{SigningMaterial, VerificationKey};

/// Large enough for any decoded signature (P-521 r‖s is 132 bytes).
const MAX_SIGNATURE_LEN: usize = 136;

/// Signs `header_payload` and returns the base64url signature segment.
pub fn sign(material: &SigningMaterial, header_payload: &[u8]) -> TokenResult<String> {
    let raw = match material {
        SigningMaterial::Hs256(secret) => return hmac::sign(Algorithm::HS256, secret, header_payload),
        SigningMaterial::Hs384(secret) => return hmac::sign(Algorithm::HS384, secret, header_payload),
        SigningMaterial::Hs512(secret) => return hmac::sign(Algorithm::HS512, secret, header_payload),
        SigningMaterial::Es256(key) => ecdsa::es256::sign(key, header_payload)?,
        SigningMaterial::Es384(key) => ecdsa::es384::sign(key, header_payload)?,
        SigningMaterial::Es512(key) => ecdsa::es512::sign(key, header_payload)?,
        SigningMaterial::EdDsa(key) => eddsa::sign(key, header_payload),
    };
    Ok(b64_encode(raw))
}

/// Checks the base64url `signature` of `header_payload`.
///
/// Never allocates: HMAC compares against a tag encoded on the stack, the
/// asymmetric schemes decode the signature into a stack buffer first.
pub fn verify(key: &VerificationKey, header_payload: &[u8], signature: &[u8]) -> bool {
    let asymmetric = |check: &dyn Fn(&[u8]) -> bool| {
        let mut raw = [0u8; MAX_SIGNATURE_LEN];
        match b64_decode_into(signature, &mut raw) {
            Ok(n) => check(&raw[..n]),
            Err(_) => false,
        }
    };

    match key {
        VerificationKey::Hs256(secret) => hmac::verify(Algorithm::HS256, secret, header_payload, signature),
        VerificationKey::Hs384(secret) => hmac::verify(Algorithm::HS384, secret, header_payload, signature),
        VerificationKey::Hs512(secret) => hmac::verify(Algorithm::HS512, secret, header_payload, signature),
        VerificationKey::Es256(key) => asymmetric(&|raw| ecdsa::es256::verify(key, header_payload, raw)),
        VerificationKey::Es384(key) => asymmetric(&|raw| ecdsa::es384::verify(key, header_payload, raw)),
        VerificationKey::Es512(key) => asymmetric(&|raw| ecdsa::es512::verify(key, header_payload, raw)),
        VerificationKey::EdDsa(key) => asymmetric(&|raw| eddsa::verify(key, header_payload, raw)),
    }
}
