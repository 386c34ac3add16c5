//! Threshold multisig over Pallas Schnorr keys.
//!
//! Deployment args:
//! `[owner_count, threshold, owners.. (MAX_OWNERS), packed keys.. (2 * MAX_OWNERS)]`
//!
//! Witness: `[mode.., threshold, (owner_index, sig[64])..]`, one pair per
//! selected signer.

use ff::Field;
use kernel_common::{pad_field_array, Address, Fr, MAX_OWNERS};
use tracing::debug;

use super::schnorr::SchnorrSigningKey;
use crate::{
    error::{KernelError, Result},
    types::{AuthWitness, DeploymentArgs, WitnessMode},
};

/// Slots reserved for packed `(x, y)` public keys.
pub const PACKED_KEYS_LEN: usize = 2 * MAX_OWNERS;

#[derive(Clone, Debug)]
pub struct MultisigSchnorrValidator {
    address: Address,
    owners: Vec<Address>,
    /// `None` marks an owner whose key is not held locally.
    signing_keys: Vec<Option<SchnorrSigningKey>>,
    threshold: usize,
}

impl MultisigSchnorrValidator {
    pub fn new(
        address: Address,
        owners: Vec<Address>,
        signing_keys: Vec<Option<SchnorrSigningKey>>,
        threshold: usize,
    ) -> Result<Self> {
        if owners.len() != signing_keys.len() {
            return Err(KernelError::OwnerCountMismatch {
                owners: owners.len(),
                keys: signing_keys.len(),
            });
        }
        if owners.len() > MAX_OWNERS {
            return Err(KernelError::PayloadTooLarge {
                len: owners.len(),
                max: MAX_OWNERS,
            });
        }
        if threshold == 0 || threshold > owners.len() {
            return Err(KernelError::InvalidThreshold {
                threshold,
                owners: owners.len(),
            });
        }

        Ok(Self {
            address,
            owners,
            signing_keys,
            threshold,
        })
    }

    pub fn identity(&self) -> Address {
        self.address
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Owners that hold a key, in key order, with their index.
    fn key_holders(&self) -> impl Iterator<Item = (usize, &SchnorrSigningKey)> {
        self.signing_keys
            .iter()
            .enumerate()
            .filter_map(|(index, key)| key.as_ref().map(|key| (index, key)))
    }

    pub fn build_deployment_args(&self) -> Result<DeploymentArgs> {
        let owners: Vec<Fr> = self.owners.iter().map(Address::to_field).collect();

        let mut packed = Vec::with_capacity(PACKED_KEYS_LEN);
        for (_, key) in self.key_holders() {
            let (x, y) = key.public_key().coordinates()?;
            packed.push(x);
            packed.push(y);
        }

        let mut args = vec![
            Fr::from(self.owners.len() as u64),
            Fr::from(self.threshold as u64),
        ];
        args.extend(pad_field_array(&owners, MAX_OWNERS)?);
        args.extend(pad_field_array(&packed, PACKED_KEYS_LEN)?);
        DeploymentArgs::new(self.address, &args)
    }

    /// Sign with the first `threshold` owners holding a key.
    pub fn build_witness(&self, message_hash: Fr, is_default: bool) -> Result<AuthWitness> {
        let signers: Vec<_> = self.key_holders().take(self.threshold).collect();
        if signers.len() < self.threshold {
            return Err(KernelError::InsufficientSigners {
                available: signers.len(),
                threshold: self.threshold,
            });
        }

        let mut payload = WitnessMode::new(self.address, is_default).prefix();
        payload.push(Fr::from(self.threshold as u64));
        for (index, key) in &signers {
            payload.push(Fr::from(*index as u64));
            payload.extend(key.sign(&message_hash).to_fields());
        }

        debug!(
            validator = %self.address,
            is_default,
            signers = signers.len(),
            "built multisig witness"
        );
        AuthWitness::new(message_hash, &payload)
    }
}

/// Parsed signer section of a multisig witness: `(owner_index, signature fields)`.
pub fn signer_pairs(scheme_payload: &[Fr]) -> Vec<(Fr, &[Fr])> {
    use super::schnorr::SCHNORR_SIGNATURE_LEN;

    let Some(threshold) = scheme_payload.first().and_then(kernel_common::fr_to_u64) else {
        return Vec::new();
    };
    scheme_payload[1..]
        .chunks(1 + SCHNORR_SIGNATURE_LEN)
        .take(threshold as usize)
        .filter(|chunk| chunk.len() == 1 + SCHNORR_SIGNATURE_LEN)
        .map(|chunk| (chunk[0], &chunk[1..]))
        .filter(|(_, sig)| sig.iter().any(|f| !bool::from(f.is_zero())))
        .collect()
}
