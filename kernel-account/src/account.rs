//! Kernel account: owns the validator registry of one account and drives
//! witness creation, module management and submission through the node.

use std::sync::Arc;

use kernel_common::{Address, FunctionSelector, Fr};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::{
    authwit::MessageIntent,
    config::KernelConfig,
    entrypoint::{ExecutionRequest, ExecutionRequestInit, FeeOptions, FunctionCall, KernelEntrypoint},
    error::Result,
    node::ExecutionNode,
    nonce::{NodeNonceSource, NonceSource},
    registry::ValidatorRegistry,
    types::{AuthWitness, DeploymentArgs, TxStatus},
    validator::Validator,
};

pub const APPROVE_PUBLIC_AUTHWIT_SIGNATURE: &str = "approve_public_authwit(Field)";
pub const CANCEL_AUTHWIT_SIGNATURE: &str = "cancel_authwit(Field)";

pub struct KernelAccount {
    address: Address,
    /// Held for the whole of a build so the active validator cannot change
    /// between the app and fee witnesses.
    registry: Mutex<ValidatorRegistry>,
    entrypoint: KernelEntrypoint,
    node: Arc<dyn ExecutionNode>,
    config: KernelConfig,
}

impl KernelAccount {
    pub fn new(
        address: Address,
        default_validator: impl Into<Validator>,
        node: Arc<dyn ExecutionNode>,
        nonce_source: Arc<dyn NonceSource>,
        config: KernelConfig,
    ) -> Self {
        let entrypoint = KernelEntrypoint::new(
            address,
            nonce_source,
            config.chain_id,
            config.protocol_version,
        );
        Self {
            address,
            registry: Mutex::new(ValidatorRegistry::new(default_validator)),
            entrypoint,
            node,
            config,
        }
    }

    /// Account whose nonce is read from the account contract via `node`.
    pub fn with_node_nonces(
        address: Address,
        default_validator: impl Into<Validator>,
        node: Arc<dyn ExecutionNode>,
        config: KernelConfig,
    ) -> Self {
        let nonces = Arc::new(NodeNonceSource::new(node.clone()));
        Self::new(address, default_validator, node, nonces, config)
    }

    /// Node-backed account configured from `KERNEL_*` environment variables.
    pub fn from_env(
        address: Address,
        default_validator: impl Into<Validator>,
        node: Arc<dyn ExecutionNode>,
    ) -> Result<Self> {
        let config = KernelConfig::from_env()?;
        info!(
            %address,
            chain_id = config.chain_id,
            version = config.protocol_version,
            "loaded kernel config"
        );
        Ok(Self::with_node_nonces(address, default_validator, node, config))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Constructor arguments of the account contract.
    pub async fn deployment_args(&self) -> Result<DeploymentArgs> {
        self.registry.lock().await.deployment_args()
    }

    pub async fn installed_validators(&self) -> Vec<Address> {
        self.registry.lock().await.installed()
    }

    pub async fn active_validator(&self) -> Address {
        self.registry.lock().await.active_id()
    }

    pub async fn get_nonce(&self) -> Result<Fr> {
        self.entrypoint.get_nonce().await
    }

    /// Register `validator` locally and return the `install_validator` call
    /// that installs it on-chain.
    pub async fn install_validator(&self, validator: impl Into<Validator>) -> Result<FunctionCall> {
        let validator = validator.into();
        let args = validator.build_deployment_args()?;
        self.registry.lock().await.register(validator);
        Ok(FunctionCall::private(
            self.address,
            FunctionSelector::INSTALL,
            args.to_fields(),
        ))
    }

    pub async fn uninstall_validator(&self, identity: &Address) -> Result<FunctionCall> {
        self.registry.lock().await.remove(identity)?;
        Ok(FunctionCall::private(
            self.address,
            FunctionSelector::UNINSTALL,
            vec![identity.to_field()],
        ))
    }

    pub async fn switch_validator(&self, identity: &Address) -> Result<()> {
        self.registry.lock().await.switch_active(identity)
    }

    pub fn message_hash(&self, intent: &MessageIntent) -> Fr {
        intent.message_hash(self.config.chain_id, self.config.protocol_version)
    }

    /// Sign `intent` with the active validator and register the witness with
    /// the node.
    pub async fn create_auth_wit(&self, intent: impl Into<MessageIntent>) -> Result<AuthWitness> {
        let message_hash = self.message_hash(&intent.into());
        let witness = self.registry.lock().await.build_witness(message_hash)?;
        self.node.add_auth_witness(witness.clone()).await?;
        Ok(witness)
    }

    /// Public approval of `intent`, or its cancellation when `authorized` is
    /// false.
    pub fn set_public_auth_wit(&self, intent: impl Into<MessageIntent>, authorized: bool) -> FunctionCall {
        let message_hash = self.message_hash(&intent.into());
        if authorized {
            FunctionCall::public(
                self.address,
                FunctionSelector::from_signature(APPROVE_PUBLIC_AUTHWIT_SIGNATURE),
                vec![message_hash],
            )
        } else {
            self.cancel_call(message_hash)
        }
    }

    pub fn cancel_auth_wit(&self, intent: impl Into<MessageIntent>) -> FunctionCall {
        self.cancel_call(self.message_hash(&intent.into()))
    }

    fn cancel_call(&self, message_hash: Fr) -> FunctionCall {
        FunctionCall::private(
            self.address,
            FunctionSelector::from_signature(CANCEL_AUTHWIT_SIGNATURE),
            vec![message_hash],
        )
    }

    /// Build without submitting. Fee options default to the account's gas
    /// settings.
    pub async fn create_execution_request(
        &self,
        mut exec: ExecutionRequestInit,
    ) -> Result<ExecutionRequest> {
        if exec.fee.is_none() {
            exec.fee = Some(FeeOptions {
                gas_settings: self.config.gas_settings,
                ..Default::default()
            });
        }
        let registry = self.registry.lock().await;
        self.entrypoint.create_execution_request(&registry, exec).await
    }

    /// Build, register both witnesses, and submit once.
    #[instrument(skip_all, fields(account = %self.address))]
    pub async fn send(&self, exec: ExecutionRequestInit) -> Result<TxStatus> {
        let request = self.create_execution_request(exec).await?;
        for witness in &request.auth_witnesses {
            self.node.add_auth_witness(witness.clone()).await?;
        }
        let status = self.node.send_or_simulate(&request).await?;
        info!(status = ?status, app_hash = ?request.app_payload_hash, "transaction submitted");
        Ok(status)
    }
}
