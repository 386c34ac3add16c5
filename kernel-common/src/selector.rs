//! Function selectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Fr;

/// 4-byte identifier of a contract function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSelector(pub u32);

impl FunctionSelector {
    /// Kernel account: validate a message against the active module.
    pub const VALIDATE: FunctionSelector = FunctionSelector(0xdd05_26f3);
    /// Kernel account: `install_validator(address, keys)`.
    pub const INSTALL: FunctionSelector = FunctionSelector(0x7b42_afcc);
    /// Kernel account: `uninstall_validator(address)`.
    pub const UNINSTALL: FunctionSelector = FunctionSelector(0x0d63_8f30);

    /// First four bytes (big-endian) of the blake3 digest of `signature`,
    /// e.g. `"increment(Field,Field)"`.
    pub fn from_signature(signature: &str) -> Self {
        let digest = blake3::hash(signature.as_bytes());
        let mut head = [0u8; 4];
        head.copy_from_slice(&digest.as_bytes()[..4]);
        Self(u32::from_be_bytes(head))
    }

    pub fn to_field(&self) -> Fr {
        Fr::from(self.0 as u64)
    }
}

impl fmt::Display for FunctionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_selectors_are_stable_and_distinct() {
        let a = FunctionSelector::from_signature("increment(Field,Field)");
        let b = FunctionSelector::from_signature("decrement(Field,Field)");
        assert_eq!(a, FunctionSelector::from_signature("increment(Field,Field)"));
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_zero_padded_hex() {
        assert_eq!(FunctionSelector::UNINSTALL.to_string(), "0x0d638f30");
    }
}
