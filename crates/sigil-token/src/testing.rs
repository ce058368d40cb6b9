//! Test-only key generation.
//!
//! Keys are produced from `rand`'s thread RNG and returned as DER bytes so tests
//! exercise the same parsing path as configured keys. Not for production use.

use crate::algorithm::Algorithm;
use rand::RngCore;

/// A freshly generated key pair in the encodings the parsers accept.
#[derive(Debug, Clone)]
pub struct TestKeys {
    pub algorithm: Algorithm,
    /// PKCS#8 DER private key, or the raw secret for HMAC.
    pub private: Vec<u8>,
    /// DER SubjectPublicKeyInfo, or the raw secret for HMAC.
    pub public: Vec<u8>,
}

impl TestKeys {
    pub fn generate(algorithm: Algorithm) -> Self {
        let (private, public) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = random_bytes(algorithm.verification_key_len());
                (secret.clone(), secret)
            }
            Algorithm::ES256 => {
                use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
                let secret = loop {
                    if let Ok(key) = p256::SecretKey::from_slice(&random_bytes(32)) {
                        break key;
                    }
                };
                (
                    secret.to_pkcs8_der().expect("p256 pkcs8").as_bytes().to_vec(),
                    secret.public_key().to_public_key_der().expect("p256 spki").into_vec(),
                )
            }
            Algorithm::ES384 => {
                use p384::pkcs8::{EncodePrivateKey, EncodePublicKey};
                let secret = loop {
                    if let Ok(key) = p384::SecretKey::from_slice(&random_bytes(48)) {
                        break key;
                    }
                };
                (
                    secret.to_pkcs8_der().expect("p384 pkcs8").as_bytes().to_vec(),
                    secret.public_key().to_public_key_der().expect("p384 spki").into_vec(),
                )
            }
            Algorithm::ES512 => {
                use p521::pkcs8::{EncodePrivateKey, EncodePublicKey};
                let secret = loop {
                    let mut bytes = random_bytes(66);
                    // the P-521 order is just below 2^521
                    bytes[0] &= 0x01;
                    if let Ok(key) = p521::SecretKey::from_slice(&bytes) {
                        break key;
                    }
                };
                (
                    secret.to_pkcs8_der().expect("p521 pkcs8").as_bytes().to_vec(),
                    secret.public_key().to_public_key_der().expect("p521 spki").into_vec(),
                )
            }
            Algorithm::EdDSA => {
                use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                let key = ed25519_dalek::SigningKey::from_bytes(&seed);
                (
                    key.to_pkcs8_der().expect("ed25519 pkcs8").as_bytes().to_vec(),
                    key.verifying_key().to_public_key_der().expect("ed25519 spki").into_vec(),
                )
            }
        };
        Self {
            algorithm,
            private,
            public,
        }
    }

    /// `ALGO:hex` descriptor of the private key, for a `Tokenizer`.
    pub fn private_descriptor(&self) -> String {
        format!("{}:{}", self.algorithm, hex::encode(&self.private))
    }

    /// `ALGO:hex` descriptor of the public key, for a `Verifier`.
    pub fn public_descriptor(&self) -> String {
        format!("{}:{}", self.algorithm, hex::encode(&self.public))
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}
