//! Types shared across the kernel account rail.

use kernel_common::{
    pad_byte_sequence_as_fields, pad_deployment_keys, pad_witness, serde_fr, Address, Fr, MAX_INSTALL_KEYS_LEN,
    MAX_WITNESS_LEN, MODE_CUSTOM, MODE_DEFAULT,
};
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// Authentication witness: a message fingerprint and the fixed-length payload
/// the verifying circuit checks against it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAuthWitness")]
pub struct AuthWitness {
    #[serde(with = "serde_fr")]
    pub message_hash: Fr,
    #[serde(with = "serde_fr::vec")]
    witness: Vec<Fr>,
}

impl AuthWitness {
    /// Pad `payload` to [`MAX_WITNESS_LEN`] and bind it to `message_hash`.
    pub fn new(message_hash: Fr, payload: &[Fr]) -> Result<Self> {
        Ok(Self {
            message_hash,
            witness: pad_witness(payload)?,
        })
    }

    /// The padded payload; always `MAX_WITNESS_LEN` elements.
    pub fn witness(&self) -> &[Fr] {
        &self.witness
    }

    /// Leading mode tag.
    pub fn mode(&self) -> WitnessMode {
        if self.witness[0] == Fr::from(MODE_CUSTOM) {
            WitnessMode::Custom(Address::from_field(self.witness[1]))
        } else {
            WitnessMode::Default
        }
    }

    /// Payload after the mode prefix, zero tail included.
    pub fn scheme_payload(&self) -> &[Fr] {
        &self.witness[self.mode().prefix_len()..]
    }
}

#[derive(Deserialize)]
struct RawAuthWitness {
    #[serde(with = "serde_fr")]
    message_hash: Fr,
    #[serde(with = "serde_fr::vec")]
    witness: Vec<Fr>,
}

impl TryFrom<RawAuthWitness> for AuthWitness {
    type Error = KernelError;

    fn try_from(raw: RawAuthWitness) -> Result<Self> {
        check_len(raw.witness.len(), MAX_WITNESS_LEN)?;
        Ok(Self {
            message_hash: raw.message_hash,
            witness: raw.witness,
        })
    }
}

fn check_len(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(KernelError::LengthMismatch { len, expected });
    }
    Ok(())
}

/// Verification mode announced by the first witness slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitnessMode {
    /// Default validator; the circuit skips the identity check.
    Default,
    /// Installed module identified by its address.
    Custom(Address),
}

impl WitnessMode {
    pub fn new(identity: Address, is_default: bool) -> Self {
        if is_default {
            WitnessMode::Default
        } else {
            WitnessMode::Custom(identity)
        }
    }

    /// `[MODE_DEFAULT]` or `[MODE_CUSTOM, identity]`.
    pub fn prefix(&self) -> Vec<Fr> {
        match self {
            WitnessMode::Default => vec![Fr::from(MODE_DEFAULT)],
            WitnessMode::Custom(identity) => vec![Fr::from(MODE_CUSTOM), identity.to_field()],
        }
    }

    pub fn prefix_len(&self) -> usize {
        match self {
            WitnessMode::Default => 1,
            WitnessMode::Custom(_) => 2,
        }
    }
}

/// Key material submitted on-chain when a validator module is installed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDeploymentArgs")]
pub struct DeploymentArgs {
    pub validator: Address,
    #[serde(with = "serde_fr::vec")]
    keys: Vec<Fr>,
}

impl DeploymentArgs {
    /// Pad `keys` to [`MAX_INSTALL_KEYS_LEN`].
    pub fn new(validator: Address, keys: &[Fr]) -> Result<Self> {
        Ok(Self {
            validator,
            keys: pad_deployment_keys(keys)?,
        })
    }

    /// One field per byte of `bytes`, padded.
    pub fn from_bytes(validator: Address, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            validator,
            keys: pad_byte_sequence_as_fields(bytes, MAX_INSTALL_KEYS_LEN)?,
        })
    }

    /// Always `MAX_INSTALL_KEYS_LEN` elements.
    pub fn keys(&self) -> &[Fr] {
        &self.keys
    }

    /// Flat argument list for `install_validator(address, keys)`.
    pub fn to_fields(&self) -> Vec<Fr> {
        let mut out = Vec::with_capacity(1 + MAX_INSTALL_KEYS_LEN);
        out.push(self.validator.to_field());
        out.extend_from_slice(&self.keys);
        out
    }
}

#[derive(Deserialize)]
struct RawDeploymentArgs {
    validator: Address,
    #[serde(with = "serde_fr::vec")]
    keys: Vec<Fr>,
}

impl TryFrom<RawDeploymentArgs> for DeploymentArgs {
    type Error = KernelError;

    fn try_from(raw: RawDeploymentArgs) -> Result<Self> {
        check_len(raw.keys.len(), MAX_INSTALL_KEYS_LEN)?;
        Ok(Self {
            validator: raw.validator,
            keys: raw.keys,
        })
    }
}

/// Gas limits and fee caps attached to a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSettings {
    pub gas_limit: u64,
    pub max_fee_per_gas: u64,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            gas_limit: 1_000_000_000,
            max_fee_per_gas: 1,
        }
    }
}

impl GasSettings {
    pub fn to_fields(&self) -> [Fr; 2] {
        [Fr::from(self.gas_limit), Fr::from(self.max_fee_per_gas)]
    }
}

/// Chain context every execution request is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    pub chain_id: u64,
    pub version: u64,
    pub gas_settings: GasSettings,
}

/// Terminal status reported by the execution node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Pending,
    Dropped(String),
    Reverted(String),
}
