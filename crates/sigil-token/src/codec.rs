//! Compact token splitting and base64url (no padding) encoding.

use crate::error::TokenError;
use base64::{DecodeError, DecodeSliceError, Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Input characters decoded per step by [`b64_decode_in_place`]. Multiple of 4.
const IN_PLACE_CHUNK: usize = 1024;

/// Returns the positions of the first and the last dot of a compact token.
///
/// `token[..first]` is the header, `token[first + 1..last]` the payload and
/// `token[last + 1..]` the signature. Only `token[..last]` is signed.
pub fn split_three_parts(token: &[u8]) -> Result<(usize, usize), TokenError> {
    let first = token.iter().position(|&b| b == b'.');
    let last = token.iter().rposition(|&b| b == b'.');
    match (first, last) {
        (Some(first), Some(last)) if first < last => Ok((first, last)),
        _ => Err(TokenError::MalformedToken),
    }
}

/// Decodes base64url into a freshly allocated buffer.
pub fn b64_decode(b64: &[u8]) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_NO_PAD.decode(b64)
}

/// Decodes base64url into the front of `buf` and returns the decoded prefix.
///
/// No heap allocation. The bytes of `buf` past the returned prefix are left in an
/// unspecified state, and so is the whole buffer on error.
pub fn b64_decode_in_place(buf: &mut [u8]) -> Result<&mut [u8], DecodeError> {
    let mut scratch = [0u8; IN_PLACE_CHUNK / 4 * 3];
    let mut read = 0;
    let mut written = 0;

    // Decoded output is always shorter than its input, so `written <= read` holds
    // and a chunk never overwrites bytes that are still to be read.
    while read < buf.len() {
        let end = (read + IN_PLACE_CHUNK).min(buf.len());
        let n = URL_SAFE_NO_PAD
            .decode_slice(&buf[read..end], &mut scratch)
            .map_err(|e| match e {
                DecodeSliceError::DecodeError(e) => shift_offset(e, read),
                DecodeSliceError::OutputSliceTooSmall => DecodeError::InvalidLength(end - read),
            })?;
        buf[written..written + n].copy_from_slice(&scratch[..n]);
        written += n;
        read = end;
    }

    Ok(&mut buf[..written])
}

/// Decodes base64url into a caller-provided buffer, returning the decoded length.
/// Fails when `out` is too small.
pub fn b64_decode_into(b64: &[u8], out: &mut [u8]) -> Result<usize, DecodeSliceError> {
    URL_SAFE_NO_PAD.decode_slice(b64, out)
}

/// Encodes to base64url. Always allocates.
pub fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Reports decode errors relative to the whole buffer rather than the chunk.
fn shift_offset(e: DecodeError, offset: usize) -> DecodeError {
    match e {
        DecodeError::InvalidByte(at, byte) => DecodeError::InvalidByte(at + offset, byte),
        DecodeError::InvalidLastSymbol(at, byte) => {
            DecodeError::InvalidLastSymbol(at + offset, byte)
        }
        other => other,
    }
}
