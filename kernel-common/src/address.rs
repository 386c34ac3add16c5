//! Account and contract addresses.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use ff::Field;
use serde::{Deserialize, Serialize};

use crate::{fr_to_be_bytes, fr_to_bytes, serde_fr, CodecError, Fr};

/// An address is a single field element.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address(#[serde(with = "serde_fr")] Fr);

impl Address {
    pub const ZERO: Address = Address(Fr::ZERO);

    pub fn from_field(fr: Fr) -> Self {
        Self(fr)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Fr::from(value))
    }

    /// The address as the field slot it occupies in witnesses and calls.
    pub fn to_field(&self) -> Fr {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        fr_to_bytes(&self.0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(fr_to_be_bytes(&self.0)))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = CodecError;

    /// Parse big-endian hex, with or without a `0x` prefix. Shorter inputs are
    /// left-padded with zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let padded = format!("{trimmed:0>64}");
        let be = hex::decode(&padded).map_err(|_| CodecError::NonCanonicalField)?;
        if be.len() != 32 {
            return Err(CodecError::PayloadTooLarge {
                len: be.len(),
                max: 32,
            });
        }
        let mut le = [0u8; 32];
        for (dst, src) in le.iter_mut().zip(be.iter().rev()) {
            *dst = *src;
        }
        crate::fr_from_bytes(&le).map(Self)
    }
}

impl From<Fr> for Address {
    fn from(fr: Fr) -> Self {
        Self(fr)
    }
}
