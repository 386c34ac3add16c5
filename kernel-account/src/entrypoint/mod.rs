//! Builds the execution request for one transaction: two nonce-bound
//! payloads, one witness for each, and the packed arguments of every call.

pub mod payload;

use std::sync::Arc;

use kernel_common::{serde_fr, Address, FunctionSelector, Fr};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use payload::{
    EncodedCall, EntrypointPayload, FeeOptions, FeePaymentMethod, FunctionCall, PackedValues,
    PayloadKind, MAX_APP_CALLS, MAX_FEE_CALLS,
};

use crate::{
    error::Result,
    nonce::NonceSource,
    registry::ValidatorRegistry,
    types::{AuthWitness, GasSettings, TxContext},
};

/// Signature the entrypoint selector is derived from.
pub const ENTRYPOINT_SIGNATURE: &str =
    "entrypoint(((Field,u32,Field,bool,bool)[4],Field),((Field,u32,Field,bool,bool)[2],Field,bool))";

/// Caller-side description of a transaction.
#[derive(Clone, Debug, Default)]
pub struct ExecutionRequestInit {
    pub calls: Vec<FunctionCall>,
    /// `None` means [`FeeOptions::default`].
    pub fee: Option<FeeOptions>,
}

impl ExecutionRequestInit {
    pub fn new(calls: Vec<FunctionCall>) -> Self {
        Self { calls, fee: None }
    }

    pub fn with_fee(mut self, fee: FeeOptions) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// Final artifact handed to the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub origin: Address,
    pub function_selector: FunctionSelector,
    #[serde(with = "serde_fr")]
    pub first_call_args_hash: Fr,
    pub tx_context: TxContext,
    /// App call args, then fee call args, then the entrypoint's own args.
    pub args_of_calls: Vec<PackedValues>,
    #[serde(with = "serde_fr")]
    pub app_payload_hash: Fr,
    #[serde(with = "serde_fr")]
    pub fee_payload_hash: Fr,
    /// `[app, fee]`.
    pub auth_witnesses: Vec<AuthWitness>,
}

pub struct KernelEntrypoint {
    address: Address,
    nonce_source: Arc<dyn NonceSource>,
    chain_id: u64,
    version: u64,
}

impl KernelEntrypoint {
    pub fn new(
        address: Address,
        nonce_source: Arc<dyn NonceSource>,
        chain_id: u64,
        version: u64,
    ) -> Self {
        Self {
            address,
            nonce_source,
            chain_id,
            version,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn selector() -> FunctionSelector {
        FunctionSelector::from_signature(ENTRYPOINT_SIGNATURE)
    }

    pub async fn get_nonce(&self) -> Result<Fr> {
        self.nonce_source.get_nonce(&self.address).await
    }

    /// Fetches the nonce once and binds both payloads to `nonce + 1`.
    /// Nothing is signed if the nonce is unavailable or a payload is
    /// malformed.
    #[instrument(skip_all, fields(account = %self.address, calls = exec.calls.len()))]
    pub async fn create_execution_request(
        &self,
        registry: &ValidatorRegistry,
        exec: ExecutionRequestInit,
    ) -> Result<ExecutionRequest> {
        let nonce = self.get_nonce().await? + Fr::from(1u64);

        let fee = exec.fee.unwrap_or_default();
        let (fee_calls, is_fee_payer) = fee.fee_calls();
        let app_payload = EntrypointPayload::app(&exec.calls, nonce)?;
        let fee_payload = EntrypointPayload::fee(&fee_calls, nonce, is_fee_payer)?;

        let mut wrapper_args = app_payload.to_fields();
        wrapper_args.extend(fee_payload.to_fields());
        let entrypoint_args = PackedValues::from_values(wrapper_args);

        let app_payload_hash = app_payload.hash();
        let fee_payload_hash = fee_payload.hash();
        debug!(nonce = ?nonce, is_fee_payer, "payloads built");

        let app_witness = registry.build_witness(app_payload_hash)?;
        let fee_witness = registry.build_witness(fee_payload_hash)?;
        debug!(validator = %registry.active_id(), "payloads signed");

        let mut args_of_calls = Vec::with_capacity(
            app_payload.packed_arguments().len() + fee_payload.packed_arguments().len() + 1,
        );
        args_of_calls.extend_from_slice(app_payload.packed_arguments());
        args_of_calls.extend_from_slice(fee_payload.packed_arguments());
        let first_call_args_hash = entrypoint_args.hash;
        args_of_calls.push(entrypoint_args);

        Ok(ExecutionRequest {
            origin: self.address,
            function_selector: Self::selector(),
            first_call_args_hash,
            tx_context: self.tx_context(fee.gas_settings),
            args_of_calls,
            app_payload_hash,
            fee_payload_hash,
            auth_witnesses: vec![app_witness, fee_witness],
        })
    }

    fn tx_context(&self, gas_settings: GasSettings) -> TxContext {
        TxContext {
            chain_id: self.chain_id,
            version: self.version,
            gas_settings,
        }
    }
}
