//! Fixed-length encoding for circuit-facing arrays.
//!
//! The verifying circuit reads witnesses and installed keys as flat arrays of
//! a fixed length. Sources shorter than the bound are right-padded with the
//! zero element; sources longer than the bound are rejected, never truncated.

use ff::Field;
use thiserror::Error;

use crate::{Fr, MAX_INSTALL_KEYS_LEN, MAX_WITNESS_LEN};

/// Encoding failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Source sequence is longer than the fixed target length.
    #[error("payload too large: {len} elements exceed the bound of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Bytes do not encode a canonical field element.
    #[error("non-canonical field element encoding")]
    NonCanonicalField,
}

/// Right-pad `seq` with zero elements to exactly `target_len`.
pub fn pad_field_array(seq: &[Fr], target_len: usize) -> Result<Vec<Fr>, CodecError> {
    if seq.len() > target_len {
        return Err(CodecError::PayloadTooLarge {
            len: seq.len(),
            max: target_len,
        });
    }
    let mut out = Vec::with_capacity(target_len);
    out.extend_from_slice(seq);
    out.resize(target_len, Fr::ZERO);
    Ok(out)
}

/// One field element per byte.
pub fn bytes_to_fields(bytes: &[u8]) -> Vec<Fr> {
    bytes.iter().map(|b| Fr::from(*b as u64)).collect()
}

/// Widen `bytes` to one field element per byte, then pad to `target_len`.
pub fn pad_byte_sequence_as_fields(bytes: &[u8], target_len: usize) -> Result<Vec<Fr>, CodecError> {
    if bytes.len() > target_len {
        return Err(CodecError::PayloadTooLarge {
            len: bytes.len(),
            max: target_len,
        });
    }
    pad_field_array(&bytes_to_fields(bytes), target_len)
}

/// Pad to [`MAX_WITNESS_LEN`].
pub fn pad_witness(seq: &[Fr]) -> Result<Vec<Fr>, CodecError> {
    pad_field_array(seq, MAX_WITNESS_LEN)
}

/// Pad to [`MAX_INSTALL_KEYS_LEN`].
pub fn pad_deployment_keys(seq: &[Fr]) -> Result<Vec<Fr>, CodecError> {
    pad_field_array(seq, MAX_INSTALL_KEYS_LEN)
}
