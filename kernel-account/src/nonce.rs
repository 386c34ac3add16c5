//! Sources of the per-account replay-protection nonce.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use kernel_common::{Address, Fr};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{KernelError, Result},
    node::ExecutionNode,
};

#[async_trait]
pub trait NonceSource: Send + Sync {
    /// Current nonce; the next payload is built with `nonce + 1`.
    async fn get_nonce(&self, address: &Address) -> Result<Fr>;
}

/// Reads the nonce from the account contract through the node.
pub struct NodeNonceSource {
    node: Arc<dyn ExecutionNode>,
}

impl NodeNonceSource {
    pub fn new(node: Arc<dyn ExecutionNode>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl NonceSource for NodeNonceSource {
    async fn get_nonce(&self, address: &Address) -> Result<Fr> {
        self.node
            .get_nonce(address)
            .await
            .map_err(|e| KernelError::NonceUnavailable(e.to_string()))
    }
}

/// Local nonce table. Addresses that were never set have no nonce.
#[derive(Default)]
pub struct InMemoryNonceSource {
    nonces: Mutex<HashMap<Address, u64>>,
}

impl InMemoryNonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, address: Address, nonce: u64) {
        self.nonces.lock().await.insert(address, nonce);
    }

    /// Advance after a successful submission; returns the new value.
    pub async fn bump(&self, address: &Address) -> Result<u64> {
        let mut nonces = self.nonces.lock().await;
        let nonce = nonces
            .get_mut(address)
            .ok_or_else(|| KernelError::NonceUnavailable(format!("no nonce for {address}")))?;
        *nonce += 1;
        debug!(%address, nonce = *nonce, "bumped nonce");
        Ok(*nonce)
    }
}

#[async_trait]
impl NonceSource for InMemoryNonceSource {
    async fn get_nonce(&self, address: &Address) -> Result<Fr> {
        self.nonces
            .lock()
            .await
            .get(address)
            .map(|n| Fr::from(*n))
            .ok_or_else(|| KernelError::NonceUnavailable(format!("no nonce for {address}")))
    }
}
