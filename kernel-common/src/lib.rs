//! Shared primitives for kernel accounts.
//!
//! Every value that crosses into the verifying circuit is a flat array of
//! field elements. This crate owns that representation:
//!
//! - [`Fr`]: the field every witness and deployment slot is drawn from
//!   (the Pallas base field).
//! - [`codec`]: fixed-length padding of field and byte sequences.
//! - [`Address`] and [`FunctionSelector`]: the identifiers that show up in
//!   witnesses and call encodings.
//! - Poseidon helpers used to hash payloads, arguments and auth-wit
//!   messages.

pub mod address;
pub mod codec;
pub mod selector;

use ff::{Field, PrimeField};
use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength, P128Pow5T3};

pub use address::Address;
pub use codec::{
    bytes_to_fields, pad_byte_sequence_as_fields, pad_deployment_keys, pad_field_array,
    pad_witness, CodecError,
};
pub use selector::FunctionSelector;

/// Field element type used for every witness and deployment slot.
pub type Fr = pasta_curves::pallas::Base;

/// Fixed length of every authentication witness payload.
pub const MAX_WITNESS_LEN: usize = 500;
/// Fixed length of the key array submitted when installing a validator.
pub const MAX_INSTALL_KEYS_LEN: usize = 500;
/// Maximum number of owners a multisig validator can carry.
pub const MAX_OWNERS: usize = 5;

/// Witness mode tag: the active validator is the account's default validator.
pub const MODE_DEFAULT: u64 = 0;
/// Witness mode tag: a custom validator, identified by the next slot.
pub const MODE_CUSTOM: u64 = 1;

// Domain separators absorbed as the first element of every Poseidon hash.
pub const DOMAIN_FUNCTION_ARGS: u64 = 1;
pub const DOMAIN_APP_PAYLOAD: u64 = 2;
pub const DOMAIN_FEE_PAYLOAD: u64 = 3;
pub const DOMAIN_AUTHWIT_INNER: u64 = 4;
pub const DOMAIN_AUTHWIT_OUTER: u64 = 5;

/// Poseidon over a constant-length input (P128Pow5T3, width 3, rate 2).
pub fn poseidon_hash<const L: usize>(values: [Fr; L]) -> Fr {
    poseidon::Hash::<Fr, P128Pow5T3, ConstantLength<L>, 3, 2>::init().hash(values)
}

/// Poseidon over an arbitrary-length input.
///
/// The domain and the input length are absorbed first, then the input is
/// folded in pairs: `acc = H(acc, a, b)`. An odd tail is paired with zero.
pub fn hash_fields(domain: u64, values: &[Fr]) -> Fr {
    let mut acc = poseidon_hash([Fr::from(domain), Fr::from(values.len() as u64)]);
    for chunk in values.chunks(2) {
        let b = chunk.get(1).copied().unwrap_or(Fr::ZERO);
        acc = poseidon_hash([acc, chunk[0], b]);
    }
    acc
}

/// Canonical little-endian encoding of a field element.
pub fn fr_to_bytes(fr: &Fr) -> [u8; 32] {
    fr.to_repr()
}

/// Big-endian encoding, the byte order signatures are computed over.
pub fn fr_to_be_bytes(fr: &Fr) -> [u8; 32] {
    let mut bytes = fr.to_repr();
    bytes.reverse();
    bytes
}

pub fn fr_from_bytes(bytes: &[u8; 32]) -> Result<Fr, CodecError> {
    Option::from(Fr::from_repr(*bytes)).ok_or(CodecError::NonCanonicalField)
}

pub fn reduce_be_bytes_to_fr(bytes: &[u8; 32]) -> Fr {
    let mut acc = Fr::ZERO;
    let base = Fr::from(256);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}

/// Read a field element back as a `u64`, failing if it does not fit.
pub fn fr_to_u64(fr: &Fr) -> Option<u64> {
    let repr = fr.to_repr();
    if repr[8..].iter().any(|&b| b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&repr[..8]);
    Some(u64::from_le_bytes(buf))
}

/// Serde adapters encoding field elements as `0x`-prefixed hex of the
/// canonical little-endian representation.
pub mod serde_fr {
    use super::{fr_from_bytes, fr_to_bytes, Fr};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(fr: &Fr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(fr_to_bytes(fr))))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse::<D::Error>(&s)
    }

    pub(crate) fn parse<E: de::Error>(s: &str) -> Result<Fr, E> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(E::custom)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| E::custom(format!("expected 32 bytes, got {}", bytes.len())))?;
        fr_from_bytes(&arr).map_err(E::custom)
    }

    /// Same encoding for `Vec<Fr>`.
    pub mod vec {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S>(values: &[Fr], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(values.len()))?;
            for fr in values {
                seq.serialize_element(&format!("0x{}", hex::encode(fr_to_bytes(fr))))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Fr>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter().map(|s| parse::<D::Error>(s)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fr_bytes_round_trip() {
        let value = Fr::from(2024u64);
        let bytes = fr_to_bytes(&value);
        assert_eq!(fr_from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn fr_from_bytes_rejects_non_canonical() {
        assert_eq!(fr_from_bytes(&[0xff; 32]), Err(CodecError::NonCanonicalField));
    }

    #[test]
    fn be_bytes_reduce_back_to_same_element() {
        let value = Fr::from(0x0102_0304_0506_0708u64);
        assert_eq!(reduce_be_bytes_to_fr(&fr_to_be_bytes(&value)), value);
    }

    #[test]
    fn fr_to_u64_rejects_large_values() {
        assert_eq!(fr_to_u64(&Fr::from(42u64)), Some(42));
        assert_eq!(fr_to_u64(&-Fr::ONE), None);
    }

    #[test]
    fn hash_fields_depends_on_length_and_domain() {
        let a = hash_fields(DOMAIN_FUNCTION_ARGS, &[Fr::from(1u64)]);
        let b = hash_fields(DOMAIN_FUNCTION_ARGS, &[Fr::from(1u64), Fr::ZERO]);
        let c = hash_fields(DOMAIN_APP_PAYLOAD, &[Fr::from(1u64)]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, hash_fields(DOMAIN_FUNCTION_ARGS, &[Fr::from(1u64)]));
    }

    #[test]
    fn serde_fr_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "serde_fr")]
            value: Fr,
            #[serde(with = "serde_fr::vec")]
            values: Vec<Fr>,
        }

        let w = Wrapper {
            value: Fr::from(7u64),
            values: vec![Fr::from(1u64), Fr::from(2u64)],
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, w.value);
        assert_eq!(back.values, w.values);
    }
}
