//! ECDSA signatures over P-256/SHA-256, P-384/SHA-384 and P-521/SHA-512.
//!
//! On the wire a signature is r‖s, two equal halves read as big-endian integers.
//! Any (r, s) satisfying the ECDSA equation is accepted: no low-S normalisation.

macro_rules! ecdsa_curve {
    ($module:ident, $curve:ident, $field_len:expr) => {
        pub(crate) mod $module {
            use crate::error::{TokenError, TokenResult};
            use $curve::ecdsa::signature::{Signer, Verifier};
            use $curve::ecdsa::{Signature, SigningKey, VerifyingKey};

            const FIELD_LEN: usize = $field_len;

            /// Signs `msg` (hashed with the curve's SHA-2) and returns fixed-width r‖s.
            pub(crate) fn sign(key: &SigningKey, msg: &[u8]) -> TokenResult<Vec<u8>> {
                let signature: Signature = key
                    .try_sign(msg)
                    .map_err(|e| TokenError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }

            pub(crate) fn verify(key: &VerifyingKey, msg: &[u8], raw: &[u8]) -> bool {
                let mut padded = [0u8; 2 * FIELD_LEN];
                if !super::left_pad_halves(raw, &mut padded) {
                    return false;
                }
                match Signature::from_slice(&padded) {
                    Ok(signature) => key.verify(msg, &signature).is_ok(),
                    Err(_) => false,
                }
            }
        }
    };
}

ecdsa_curve!(es256, p256, 32);
ecdsa_curve!(es384, p384, 48);
ecdsa_curve!(es512, p521, 66);

/// Copies the r and s halves of `raw` right-aligned into the two halves of `out`.
/// Returns false when `raw` cannot be split evenly or a half is wider than the field.
fn left_pad_halves(raw: &[u8], out: &mut [u8]) -> bool {
    if raw.is_empty() || raw.len() % 2 != 0 || raw.len() > out.len() {
        return false;
    }
    let half = raw.len() / 2;
    let field = out.len() / 2;
    out[field - half..field].copy_from_slice(&raw[..half]);
    out[2 * field - half..].copy_from_slice(&raw[half..]);
    true
}

#[cfg(test)]
mod tests {
    use super::left_pad_halves;

    #[test]
    fn test_left_pad_halves() {
        let mut out = [0u8; 8];
        assert!(left_pad_halves(&[1, 2, 3, 4], &mut out));
        assert_eq!(out, [0, 0, 1, 2, 0, 0, 3, 4]);

        let mut out = [0u8; 4];
        assert!(!left_pad_halves(&[1, 2, 3], &mut out));
        assert!(!left_pad_halves(&[], &mut out));
        assert!(!left_pad_halves(&[1, 2, 3, 4, 5, 6], &mut out));
    }
}
