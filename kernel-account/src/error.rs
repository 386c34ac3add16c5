//! Error types for kernel accounts.

use kernel_common::{Address, CodecError};
use thiserror::Error;

/// Aggregated error type for validator, registry and entrypoint operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Lookup, switch or removal of an identity the registry does not hold.
    #[error("validator not found: {0}")]
    ValidatorNotFound(Address),

    /// An encoded array exceeds its fixed bound.
    #[error("payload too large: {len} elements exceed the bound of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// A fixed-length array arrived with the wrong number of elements.
    #[error("length mismatch: got {len} elements, expected {expected}")]
    LengthMismatch { len: usize, expected: usize },

    /// Multisig constructed with unequal owner and key counts.
    #[error("owner count mismatch: {owners} owners but {keys} signing keys")]
    OwnerCountMismatch { owners: usize, keys: usize },

    /// The nonce source could not supply the account nonce.
    #[error("nonce unavailable: {0}")]
    NonceUnavailable(String),

    /// Multisig threshold is zero or larger than the owner set.
    #[error("invalid threshold {threshold} for {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },

    /// Fewer owners hold a signing key than the threshold requires.
    #[error("only {available} of the required {threshold} signers hold a key")]
    InsufficientSigners { available: usize, threshold: usize },

    /// The default validator cannot be uninstalled.
    #[error("cannot remove the default validator {0}")]
    DefaultValidatorRemoval(Address),

    /// A payload was given more calls than its kind allows.
    #[error("too many {kind} calls: {len} exceeds the limit of {max}")]
    TooManyCalls {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    /// Signing key material is malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The signing primitive failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// The execution node rejected or failed a request.
    #[error("node error: {0}")]
    Node(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl From<CodecError> for KernelError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::PayloadTooLarge { len, max } => KernelError::PayloadTooLarge { len, max },
            CodecError::NonCanonicalField => KernelError::InvalidKey(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for KernelError {
    fn from(err: anyhow::Error) -> Self {
        KernelError::Config(format!("{err:#}"))
    }
}

pub type Result<T, E = KernelError> = std::result::Result<T, E>;
