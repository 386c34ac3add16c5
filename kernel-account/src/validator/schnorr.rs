//! Schnorr signatures over the Pallas curve and the single-key validator
//! built on them.
//!
//! Pallas is the native curve for the witness field: public key coordinates
//! are field elements and fit one slot each.
//!
//! - Nonce: `k = H_nonce(sk || m)` (deterministic)
//! - Commitment: `R = k·G`
//! - Challenge: `e = H_chal(R || P || m)`
//! - Response: `s = k + e·sk`
//!
//! The signature is the 64-byte string `s || e`. Verification recomputes
//! `R' = s·G - e·P` and checks `H_chal(R' || P || m) == e`.
//!
//! This is a bespoke construction, not RedPallas: `H_nonce` and `H_chal` are
//! blake3 XOF outputs reduced into the scalar field under the domain strings
//! below, and the verifying circuit must recompute the challenge the same way.

use std::fmt;

use ff::{Field, FromUniformBytes, PrimeField};
use group::{Curve, Group, GroupEncoding};
use kernel_common::{bytes_to_fields, fr_to_bytes, Address, Fr};
use pasta_curves::{arithmetic::CurveAffine, pallas};
use rand::RngCore;
use tracing::debug;

use crate::{
    error::{KernelError, Result},
    types::{AuthWitness, DeploymentArgs, WitnessMode},
};

const NONCE_DOMAIN: &str = "kernel:schnorr:nonce:v1";
const CHALLENGE_DOMAIN: &str = "kernel:schnorr:challenge:v1";

/// Length of an encoded signature.
pub const SCHNORR_SIGNATURE_LEN: usize = 64;

fn scalar_from_hash(domain: &str, parts: &[&[u8]]) -> pallas::Scalar {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    hasher.finalize_xof().fill(&mut wide);
    pallas::Scalar::from_uniform_bytes(&wide)
}

fn challenge(r: &pallas::Point, pk: &pallas::Point, message: &Fr) -> pallas::Scalar {
    scalar_from_hash(
        CHALLENGE_DOMAIN,
        &[&r.to_bytes()[..], &pk.to_bytes()[..], &fr_to_bytes(message)[..]],
    )
}

/// Non-zero Pallas scalar.
#[derive(Clone)]
pub struct SchnorrSigningKey(pallas::Scalar);

impl fmt::Debug for SchnorrSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SchnorrSigningKey(..)")
    }
}

impl SchnorrSigningKey {
    pub fn from_scalar(scalar: pallas::Scalar) -> Result<Self> {
        if bool::from(scalar.is_zero()) {
            return Err(KernelError::InvalidKey("zero schnorr signing key".into()));
        }
        Ok(Self(scalar))
    }

    /// Canonical little-endian scalar encoding.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let scalar: Option<pallas::Scalar> = pallas::Scalar::from_repr(*bytes).into();
        let scalar =
            scalar.ok_or_else(|| KernelError::InvalidKey("non-canonical schnorr scalar".into()))?;
        Self::from_scalar(scalar)
    }

    pub fn random(mut rng: impl RngCore) -> Self {
        loop {
            let scalar = pallas::Scalar::random(&mut rng);
            if !bool::from(scalar.is_zero()) {
                return Self(scalar);
            }
        }
    }

    pub fn public_key(&self) -> SchnorrPublicKey {
        SchnorrPublicKey(pallas::Point::generator() * self.0)
    }

    pub fn sign(&self, message: &Fr) -> SchnorrSignature {
        let k = scalar_from_hash(
            NONCE_DOMAIN,
            &[&self.0.to_repr()[..], &fr_to_bytes(message)[..]],
        );
        let r = pallas::Point::generator() * k;
        let e = challenge(&r, &self.public_key().0, message);
        SchnorrSignature { s: k + e * self.0, e }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrPublicKey(pallas::Point);

impl SchnorrPublicKey {
    /// Affine `(x, y)`; both coordinates are witness-field elements.
    pub fn coordinates(&self) -> Result<(Fr, Fr)> {
        let affine = self.0.to_affine();
        let coords: Option<pasta_curves::arithmetic::Coordinates<pallas::Affine>> = affine.coordinates().into();
        let coords =
            coords.ok_or_else(|| KernelError::InvalidKey("public key is the identity".into()))?;
        Ok((*coords.x(), *coords.y()))
    }

    pub fn verify(&self, message: &Fr, signature: &SchnorrSignature) -> bool {
        let r = pallas::Point::generator() * signature.s - self.0 * signature.e;
        challenge(&r, &self.0, message) == signature.e
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchnorrSignature {
    s: pallas::Scalar,
    e: pallas::Scalar,
}

impl SchnorrSignature {
    pub fn to_bytes(&self) -> [u8; SCHNORR_SIGNATURE_LEN] {
        let mut out = [0u8; SCHNORR_SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.s.to_repr());
        out[32..].copy_from_slice(&self.e.to_repr());
        out
    }

    pub fn from_bytes(bytes: &[u8; SCHNORR_SIGNATURE_LEN]) -> Result<Self> {
        let mut s_repr = [0u8; 32];
        let mut e_repr = [0u8; 32];
        s_repr.copy_from_slice(&bytes[..32]);
        e_repr.copy_from_slice(&bytes[32..]);
        let s: Option<pallas::Scalar> = pallas::Scalar::from_repr(s_repr).into();
        let e: Option<pallas::Scalar> = pallas::Scalar::from_repr(e_repr).into();
        match (s, e) {
            (Some(s), Some(e)) => Ok(Self { s, e }),
            _ => Err(KernelError::InvalidKey("non-canonical signature scalar".into())),
        }
    }

    /// One field slot per signature byte.
    pub fn to_fields(&self) -> Vec<Fr> {
        bytes_to_fields(&self.to_bytes())
    }
}

/// Single-key validator over the native curve.
#[derive(Clone, Debug)]
pub struct SchnorrValidator {
    address: Address,
    signing_key: SchnorrSigningKey,
}

impl SchnorrValidator {
    pub fn new(address: Address, signing_key: SchnorrSigningKey) -> Self {
        Self {
            address,
            signing_key,
        }
    }

    pub fn identity(&self) -> Address {
        self.address
    }

    pub fn signing_key(&self) -> &SchnorrSigningKey {
        &self.signing_key
    }

    /// `[pk.x, pk.y]`, padded.
    pub fn build_deployment_args(&self) -> Result<DeploymentArgs> {
        let (x, y) = self.signing_key.public_key().coordinates()?;
        DeploymentArgs::new(self.address, &[x, y])
    }

    /// `[mode.., signature bytes as fields]`, padded.
    pub fn build_witness(&self, message_hash: Fr, is_default: bool) -> Result<AuthWitness> {
        let signature = self.signing_key.sign(&message_hash);
        let mut payload = WitnessMode::new(self.address, is_default).prefix();
        payload.extend(signature.to_fields());
        debug!(validator = %self.address, is_default, "built schnorr witness");
        AuthWitness::new(message_hash, &payload)
    }
}
