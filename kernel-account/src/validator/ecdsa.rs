//! Single-key validator over secp256k1 ECDSA.
//!
//! Key material and signatures are byte-oriented: each byte occupies one
//! field slot in the deployment args and the witness.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use kernel_common::{bytes_to_fields, fr_to_be_bytes, Address, Fr};
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::{
    error::{KernelError, Result},
    types::{AuthWitness, DeploymentArgs, WitnessMode},
};

/// Uncompressed public key without the SEC1 tag byte: `x || y`.
pub const ECDSA_PUBLIC_KEY_LEN: usize = 64;
/// `r || s`.
pub const ECDSA_SIGNATURE_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct EcdsaValidator {
    address: Address,
    signing_key: SigningKey,
}

impl EcdsaValidator {
    pub fn new(address: Address, signing_key: SigningKey) -> Self {
        Self {
            address,
            signing_key,
        }
    }

    /// Create a validator from a 32-byte private key.
    pub fn from_bytes(address: Address, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(KernelError::InvalidKey(format!(
                "expected 32-byte ecdsa key, got {}",
                bytes.len()
            )));
        }
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| KernelError::InvalidKey(e.to_string()))?;
        Ok(Self::new(address, signing_key))
    }

    pub fn random<R: CryptoRng + RngCore>(address: Address, rng: &mut R) -> Self {
        Self::new(address, SigningKey::random(rng))
    }

    pub fn identity(&self) -> Address {
        self.address
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn public_key_bytes(&self) -> [u8; ECDSA_PUBLIC_KEY_LEN] {
        let encoded = self.signing_key.verifying_key().to_encoded_point(false);
        let mut out = [0u8; ECDSA_PUBLIC_KEY_LEN];
        out.copy_from_slice(&encoded.as_bytes()[1..]);
        out
    }

    /// Public key bytes, one field per byte, padded.
    pub fn build_deployment_args(&self) -> Result<DeploymentArgs> {
        DeploymentArgs::from_bytes(self.address, &self.public_key_bytes())
    }

    /// Sign the big-endian fingerprint bytes (SHA-256 digest, RFC 6979 nonce).
    pub fn sign(&self, message_hash: &Fr) -> Result<(Signature, RecoveryId)> {
        self.signing_key
            .sign_recoverable(&fr_to_be_bytes(message_hash))
            .map_err(|e| KernelError::Signing(e.to_string()))
    }

    /// `[mode.., r bytes, s bytes]`, padded.
    pub fn build_witness(&self, message_hash: Fr, is_default: bool) -> Result<AuthWitness> {
        let (signature, _) = self.sign(&message_hash)?;
        let mut payload = WitnessMode::new(self.address, is_default).prefix();
        payload.extend(bytes_to_fields(&signature.to_bytes()));
        debug!(validator = %self.address, is_default, "built ecdsa witness");
        AuthWitness::new(message_hash, &payload)
    }
}

/// Recover the signer of `message_hash` from a detached `r || s` signature.
pub fn recover_signer(
    message_hash: &Fr,
    signature: &[u8; ECDSA_SIGNATURE_LEN],
    recovery_id: RecoveryId,
) -> Result<VerifyingKey> {
    let signature =
        Signature::from_slice(signature).map_err(|e| KernelError::Signing(e.to_string()))?;
    VerifyingKey::recover_from_msg(&fr_to_be_bytes(message_hash), &signature, recovery_id)
        .map_err(|e| KernelError::Signing(e.to_string()))
}
