//! kernel-account
//!
//! Client side of a kernel smart account: one account controlled by one of
//! several pluggable validator modules.
//!
//! # Architecture
//!
//! ```text
//! KernelAccount ─▶ KernelEntrypoint ─▶ ValidatorRegistry ─▶ Validator ─▶ codec
//!       │                │
//!       └── ExecutionNode ◀── NonceSource
//! ```
//!
//! - [`validator`]: ECDSA (secp256k1), Schnorr (Pallas) and T-of-N Schnorr
//!   multisig, each producing deployment args and fixed-length witnesses.
//! - [`registry`]: installed validators, the fixed default and the active
//!   pointer.
//! - [`entrypoint`]: app and fee payloads bound to `nonce + 1`, signed by the
//!   active validator and assembled into an [`ExecutionRequest`].
//! - [`account`]: module install/uninstall/switch, auth-wit creation and
//!   submission through an [`ExecutionNode`].
//!
//! # Witness layout
//!
//! `[mode, identity?, scheme payload.., 0..]`, always `MAX_WITNESS_LEN`
//! slots. `identity` is present only in custom mode, so the verifying circuit
//! can skip the module check for the default validator.

pub mod account;
pub mod authwit;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod node;
pub mod nonce;
pub mod registry;
pub mod types;
pub mod validator;

pub use account::KernelAccount;
pub use authwit::{compute_inner_auth_wit_hash, compute_outer_auth_wit_hash, MessageIntent};
pub use config::KernelConfig;
pub use entrypoint::{
    EntrypointPayload, ExecutionRequest, ExecutionRequestInit, FeeOptions, FeePaymentMethod,
    FunctionCall, KernelEntrypoint, PackedValues,
};
pub use error::{KernelError, Result};
pub use node::ExecutionNode;
pub use nonce::{InMemoryNonceSource, NodeNonceSource, NonceSource};
pub use registry::ValidatorRegistry;
pub use types::{AuthWitness, DeploymentArgs, GasSettings, TxContext, TxStatus, WitnessMode};
pub use validator::{
    EcdsaValidator, MultisigSchnorrValidator, SchnorrSigningKey, SchnorrValidator, Validator,
};

pub use kernel_common::{Address, FunctionSelector, Fr};
