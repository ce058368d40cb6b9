//! Verifier and Tokenizer built from a key descriptor.
//!
//! A descriptor is one of:
//!
//! 1. a bare HMAC secret: `9d2e0a02121179a3c3de1b035ae1355b1548781c8ce8538a1dc0853a12dfb13d`
//! 2. an algorithm and its key: `ES256:MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE...`
//! 3. a URL to fetch the key from, which must be resolved by the caller
//!
//! Without an algorithm (forms 1, `HMAC:<key>` and `:<key>`), HS256, HS384 and HS512
//! are tried in that order.

use crate::algorithm::Algorithm;
use crate::claims::{AccessClaims, Expiring, RefreshClaims, decode_claims};
use crate::codec::{b64_decode, b64_decode_in_place, b64_encode, split_three_parts};
use crate::engine;
use crate::error::{TokenError, TokenResult};
use crate::keys::{SigningMaterial, VerificationKey, parse_signing_key, parse_verification_key};
use crate::ttl::expiry_after;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A parsed key descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDescriptor<'a> {
    /// Bare HMAC secret.
    Secret(&'a str),
    /// `ALGO:key`. `None` when the algorithm is empty or `HMAC`.
    AlgoKey(Option<Algorithm>, &'a str),
    /// Remote key location.
    Remote(&'a str),
}

impl<'a> KeyDescriptor<'a> {
    pub fn parse(text: &'a str) -> TokenResult<Self> {
        if text.is_empty() {
            return Err(TokenError::key_parse("HMAC", "empty key descriptor"));
        }

        let lower = text.get(..8).unwrap_or(text).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(KeyDescriptor::Remote(text));
        }

        let Some((algo, key)) = text.split_once(':') else {
            return Ok(KeyDescriptor::Secret(text));
        };

        if algo.is_empty() || algo.eq_ignore_ascii_case("HMAC") {
            return Ok(KeyDescriptor::AlgoKey(None, key));
        }
        Ok(KeyDescriptor::AlgoKey(Some(algo.parse()?), key))
    }

    /// Resolves the descriptor to key material with `parse`.
    fn resolve<K>(self, parse: impl Fn(Algorithm, &str) -> TokenResult<K>) -> TokenResult<K> {
        match self {
            KeyDescriptor::Remote(url) => Err(TokenError::RemoteDescriptor(url.to_string())),
            KeyDescriptor::AlgoKey(Some(algorithm), key) => parse(algorithm, key),
            KeyDescriptor::Secret(key) | KeyDescriptor::AlgoKey(None, key) => {
                if key.contains(':') {
                    return Err(TokenError::ColonInKey);
                }
                Algorithm::HMAC_DETECTION_ORDER
                    .into_iter()
                    .find_map(|algorithm| parse(algorithm, key).ok())
                    .ok_or_else(|| {
                        TokenError::key_parse("HMAC", "secret must be 32, 48 or 64 bytes in hex or base64")
                    })
            }
        }
    }
}

/// Checks tokens against one verification key.
///
/// Immutable once built: share it behind an `Arc` and call it from any task.
#[derive(Debug, Clone)]
pub struct Verifier {
    key: VerificationKey,
    reuse: bool,
}

impl Verifier {
    /// Builds a verifier from a key descriptor.
    ///
    /// `reuse` records whether callers should prefer [`Verifier::claims_in_place`],
    /// which decodes into the token buffer instead of allocating.
    pub fn new(descriptor: &str, reuse: bool) -> TokenResult<Self> {
        let key = KeyDescriptor::parse(descriptor)?.resolve(parse_verification_key)?;
        tracing::debug!(algorithm = %key.algorithm(), reuse, "Verifier ready");
        Ok(Self::from_key(key, reuse))
    }

    pub fn from_key(key: VerificationKey, reuse: bool) -> Self {
        Self { key, reuse }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.key.algorithm()
    }

    pub fn reuse(&self) -> bool {
        self.reuse
    }

    pub fn key(&self) -> &VerificationKey {
        &self.key
    }

    /// Checks the base64url `signature` of `header_payload`.
    pub fn verify(&self, header_payload: &[u8], signature: &[u8]) -> bool {
        engine::verify(&self.key, header_payload, signature)
    }

    /// Verifies `token` and returns its access claims.
    pub fn claims(&self, token: &[u8]) -> TokenResult<AccessClaims> {
        self.extract(token)
    }

    /// Like [`Verifier::claims`], but decodes the payload inside `token`.
    /// The buffer content is unspecified afterwards.
    pub fn claims_in_place(&self, token: &mut [u8]) -> TokenResult<AccessClaims> {
        self.extract_in_place(token)
    }

    /// Verifies `token` and returns its refresh claims.
    pub fn refresh_claims(&self, token: &[u8]) -> TokenResult<RefreshClaims> {
        self.extract(token)
    }

    /// Split, verify the signature, decode the payload, then check the expiry.
    pub fn extract<T: DeserializeOwned + Expiring>(&self, token: &[u8]) -> TokenResult<T> {
        let (first, last) = self.check_signature(token)?;
        let payload = b64_decode(&token[first + 1..last]).map_err(|_| TokenError::PayloadEncoding)?;
        let claims: T = decode_claims(&payload)?;
        claims.validate()?;
        Ok(claims)
    }

    pub fn extract_in_place<T: DeserializeOwned + Expiring>(&self, token: &mut [u8]) -> TokenResult<T> {
        let (first, last) = self.check_signature(token)?;
        let payload =
            b64_decode_in_place(&mut token[first + 1..last]).map_err(|_| TokenError::PayloadEncoding)?;
        let claims: T = decode_claims(payload)?;
        claims.validate()?;
        Ok(claims)
    }

    fn check_signature(&self, token: &[u8]) -> TokenResult<(usize, usize)> {
        let (first, last) = split_three_parts(token)?;
        if !self.verify(&token[..last], &token[last + 1..]) {
            return Err(TokenError::BadSignature);
        }
        Ok((first, last))
    }
}

/// Signs and verifies tokens. The verification half is derived from the signing key.
#[derive(Debug)]
pub struct Tokenizer {
    signing: SigningMaterial,
    verifier: Verifier,
    /// Encoded `{"alg":...,"typ":"JWT"}`, the same for every token.
    header: String,
}

impl Tokenizer {
    /// Builds a tokenizer from a descriptor holding the private key
    /// (or the HMAC secret).
    pub fn new(descriptor: &str, reuse: bool) -> TokenResult<Self> {
        let signing = KeyDescriptor::parse(descriptor)?.resolve(parse_signing_key)?;
        tracing::debug!(algorithm = %signing.algorithm(), reuse, "Tokenizer ready");
        Ok(Self::from_material(signing, reuse))
    }

    pub fn from_material(signing: SigningMaterial, reuse: bool) -> Self {
        let verifier = Verifier::from_key(signing.verification_key(), reuse);
        let header = b64_encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, signing.algorithm()));
        Self {
            signing,
            verifier,
            header,
        }
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn algorithm(&self) -> Algorithm {
        self.verifier.algorithm()
    }

    pub fn reuse(&self) -> bool {
        self.verifier.reuse()
    }

    pub fn verify(&self, header_payload: &[u8], signature: &[u8]) -> bool {
        self.verifier.verify(header_payload, signature)
    }

    pub fn claims(&self, token: &[u8]) -> TokenResult<AccessClaims> {
        self.verifier.claims(token)
    }

    pub fn claims_in_place(&self, token: &mut [u8]) -> TokenResult<AccessClaims> {
        self.verifier.claims_in_place(token)
    }

    pub fn refresh_claims(&self, token: &[u8]) -> TokenResult<RefreshClaims> {
        self.verifier.refresh_claims(token)
    }

    /// Returns the base64url signature of `header_payload`.
    pub fn sign(&self, header_payload: &[u8]) -> TokenResult<String> {
        engine::sign(&self.signing, header_payload)
    }

    /// Encodes `claims` as the payload of a signed compact token.
    pub fn issue<C: Serialize>(&self, claims: &C) -> TokenResult<String> {
        let payload = serde_json::to_vec(claims)?;
        let mut token = format!("{}.{}", self.header, b64_encode(payload));
        let signature = self.sign(token.as_bytes())?;
        token.push('.');
        token.push_str(&signature);
        Ok(token)
    }

    /// Issues an access token valid for `timeout`, which must not exceed `max_ttl`.
    pub fn gen_access_token(
        &self,
        timeout: &str,
        max_ttl: &str,
        user: &str,
        groups: Vec<String>,
        orgs: Vec<String>,
    ) -> TokenResult<String> {
        let exp = expiry_after(timeout, max_ttl)?;
        self.issue(&AccessClaims::new(user, groups, orgs, exp))
    }

    /// Issues a refresh token valid for `timeout`, which must not exceed `max_ttl`.
    pub fn gen_refresh_token(
        &self,
        timeout: &str,
        max_ttl: &str,
        namespace: &str,
        user: &str,
    ) -> TokenResult<String> {
        let exp = expiry_after(timeout, max_ttl)?;
        self.issue(&RefreshClaims::new(namespace, user, exp))
    }
}

/// Decodes the payload of `token` to JSON without checking the signature or expiry.
///
/// For debugging only; never use the result to authorize anything.
pub fn inspect_unverified(token: &str) -> TokenResult<serde_json::Value> {
    let (first, last) = split_three_parts(token.as_bytes())?;
    let payload = b64_decode(&token.as_bytes()[first + 1..last]).map_err(|_| TokenError::PayloadEncoding)?;
    decode_claims(&payload)
}
