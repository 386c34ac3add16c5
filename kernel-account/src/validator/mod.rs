//! Pluggable signing schemes that can control a kernel account.
//!
//! The set is closed: a new scheme is a new [`Validator`] variant.

pub mod ecdsa;
pub mod multisig;
pub mod schnorr;

use kernel_common::{Address, Fr};

use crate::{
    error::Result,
    types::{AuthWitness, DeploymentArgs},
};

pub use ecdsa::EcdsaValidator;
pub use multisig::MultisigSchnorrValidator;
pub use schnorr::{SchnorrSigningKey, SchnorrValidator};

#[derive(Clone, Debug)]
pub enum Validator {
    /// secp256k1 ECDSA, byte-oriented key and signature.
    Ecdsa(EcdsaValidator),
    /// Pallas Schnorr, single key.
    Schnorr(SchnorrValidator),
    /// Pallas Schnorr, T-of-N owners.
    Multisig(MultisigSchnorrValidator),
}

impl Validator {
    pub fn identity(&self) -> Address {
        match self {
            Validator::Ecdsa(v) => v.identity(),
            Validator::Schnorr(v) => v.identity(),
            Validator::Multisig(v) => v.identity(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Validator::Ecdsa(_) => "ecdsa",
            Validator::Schnorr(_) => "schnorr",
            Validator::Multisig(_) => "multisig",
        }
    }

    pub fn build_deployment_args(&self) -> Result<DeploymentArgs> {
        match self {
            Validator::Ecdsa(v) => v.build_deployment_args(),
            Validator::Schnorr(v) => v.build_deployment_args(),
            Validator::Multisig(v) => v.build_deployment_args(),
        }
    }

    pub fn build_witness(&self, message_hash: Fr, is_default: bool) -> Result<AuthWitness> {
        match self {
            Validator::Ecdsa(v) => v.build_witness(message_hash, is_default),
            Validator::Schnorr(v) => v.build_witness(message_hash, is_default),
            Validator::Multisig(v) => v.build_witness(message_hash, is_default),
        }
    }
}

impl From<EcdsaValidator> for Validator {
    fn from(v: EcdsaValidator) -> Self {
        Validator::Ecdsa(v)
    }
}

impl From<SchnorrValidator> for Validator {
    fn from(v: SchnorrValidator) -> Self {
        Validator::Schnorr(v)
    }
}

impl From<MultisigSchnorrValidator> for Validator {
    fn from(v: MultisigSchnorrValidator) -> Self {
        Validator::Multisig(v)
    }
}
