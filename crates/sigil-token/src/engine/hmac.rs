//! HMAC-SHA2 signatures.

use crate::algorithm::Algorithm;
use crate::codec::b64_encode;
use crate::error::{TokenError, TokenResult};
use crate::keys::HmacSecret;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// base64url length of the longest tag (64 bytes), rounded up.
const MAX_B64_TAG: usize = 88;

/// Returns the base64url HMAC of `msg`.
pub(crate) fn sign(algorithm: Algorithm, secret: &HmacSecret, msg: &[u8]) -> TokenResult<String> {
    with_tag(algorithm, secret, msg, |tag| b64_encode(tag))
}

/// Recomputes the signature and compares the base64url forms in constant time.
pub(crate) fn verify(algorithm: Algorithm, secret: &HmacSecret, msg: &[u8], signature_b64: &[u8]) -> bool {
    with_tag(algorithm, secret, msg, |tag| {
        let mut expected = [0u8; MAX_B64_TAG];
        match URL_SAFE_NO_PAD.encode_slice(tag, &mut expected) {
            Ok(n) => bool::from(expected[..n].ct_eq(signature_b64)),
            Err(_) => false,
        }
    })
    .unwrap_or(false)
}

/// Runs `f` on the tag. The MAC state lives for this call only; the verifier
/// shares the key, never the state.
fn with_tag<R>(
    algorithm: Algorithm,
    secret: &HmacSecret,
    msg: &[u8],
    f: impl FnOnce(&[u8]) -> R,
) -> TokenResult<R> {
    match algorithm {
        Algorithm::HS256 => Ok(f(tag::<HmacSha256>(secret, msg)?.as_slice())),
        Algorithm::HS384 => Ok(f(tag::<HmacSha384>(secret, msg)?.as_slice())),
        Algorithm::HS512 => Ok(f(tag::<HmacSha512>(secret, msg)?.as_slice())),
        other => Err(TokenError::Signing(format!("{other} is not an HMAC algorithm"))),
    }
}

fn tag<M: Mac + KeyInit>(secret: &HmacSecret, msg: &[u8]) -> TokenResult<hmac::digest::Output<M>> {
    let mut mac = <M as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| TokenError::Signing("invalid HMAC key".to_string()))?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes())
}
