use alloy::{
    eips::BlockId,
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider},
};
use async_trait::async_trait;

use crate::{dispatch::SignedTx, error::BroadcastError, Result};

/// Reads the account state the allocator is seeded from.
#[async_trait]
pub trait NonceSource: Send + Sync {
    /// Number of transactions from `address` included in the latest block.
    async fn confirmed_tx_count(&self, address: Address) -> Result<u64>;
}

/// Submits signed transactions. The dispatch loop never awaits this;
/// outcomes only reach the completion callback.
#[async_trait]
pub trait Broadcaster: Send + Sync + 'static {
    async fn send_raw(&self, tx: &SignedTx) -> std::result::Result<TxHash, BroadcastError>;
}

/// Startup-only values needed to fix the transaction template.
#[async_trait]
pub trait ChainInfo: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn max_priority_fee_per_gas(&self) -> Result<u128>;
}

/// A JSON-RPC node reached through an alloy provider.
#[derive(Clone)]
pub struct RpcNode {
    provider: DynProvider,
}

impl RpcNode {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Transaction count including the node's pending pool.
    pub async fn pending_tx_count(&self, address: Address) -> Result<u64> {
        Ok(self
            .provider
            .get_transaction_count(address)
            .block_id(BlockId::pending())
            .await?)
    }
}

#[async_trait]
impl NonceSource for RpcNode {
    async fn confirmed_tx_count(&self, address: Address) -> Result<u64> {
        Ok(self
            .provider
            .get_transaction_count(address)
            .block_id(BlockId::latest())
            .await?)
    }
}

#[async_trait]
impl Broadcaster for RpcNode {
    async fn send_raw(&self, tx: &SignedTx) -> std::result::Result<TxHash, BroadcastError> {
        let pending = self.provider.send_raw_transaction(&tx.raw).await?;
        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl ChainInfo for RpcNode {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn max_priority_fee_per_gas(&self) -> Result<u128> {
        Ok(self.provider.get_max_priority_fee_per_gas().await?)
    }
}
