//! Boundary with the execution node.

use async_trait::async_trait;
use kernel_common::{Address, Fr};

use crate::{
    entrypoint::ExecutionRequest,
    error::Result,
    types::{AuthWitness, TxStatus},
};

/// Node RPC surface the account depends on. Transport is up to the
/// implementor; failures surface as [`crate::KernelError::Node`].
#[async_trait]
pub trait ExecutionNode: Send + Sync {
    /// Current nonce stored by the account contract at `address`.
    async fn get_nonce(&self, address: &Address) -> Result<Fr>;

    /// Make a witness available to simulation and submission.
    async fn add_auth_witness(&self, witness: AuthWitness) -> Result<()>;

    /// Terminal step; never retried by the account.
    async fn send_or_simulate(&self, request: &ExecutionRequest) -> Result<TxStatus>;
}
