//! Ed25519 signatures over the raw message.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

pub(crate) fn sign(key: &SigningKey, msg: &[u8]) -> Vec<u8> {
    key.sign(msg).to_bytes().to_vec()
}

pub(crate) fn verify(key: &VerifyingKey, msg: &[u8], raw: &[u8]) -> bool {
    match Signature::from_slice(raw) {
        Ok(signature) => key.verify(msg, &signature).is_ok(),
        Err(_) => false,
    }
}
