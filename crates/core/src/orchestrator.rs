//! Startup: one-time network reads, then a ready-to-run `DispatchLoop`.
use std::{num::NonZeroU64, sync::Arc};

use alloy::{
    consensus::TxType,
    primitives::{Address, Bytes},
    signers::local::PrivateKeySigner,
};
use tracing::info;

use crate::{
    dispatch::{
        dispatch_loop::DEFAULT_LOG_INTERVAL, Broadcaster, ChainInfo, DispatchCallback,
        DispatchLoop, GasPricing, NilCallback, NonceAllocator, NonceSource, TxTemplate,
    },
    error::ConfigError,
    Result,
};

/// The contract call every dispatched transaction makes.
#[derive(Clone, Debug)]
pub struct TargetCall {
    pub to: Address,
    pub input: Bytes,
    pub gas_limit: u64,
}

/// Builder with sane defaults; only (node, signer, target) are required.
pub struct DispatcherBuilder<N, F = NilCallback>
where
    N: NonceSource + ChainInfo + Broadcaster,
    F: DispatchCallback,
{
    node: Arc<N>,
    signer: PrivateKeySigner,
    target: TargetCall,
    tx_type: TxType,
    gas_price_percent_add: Option<u16>,
    log_interval: NonZeroU64,
    callback: Arc<F>,
}

impl<N> DispatcherBuilder<N, NilCallback>
where
    N: NonceSource + ChainInfo + Broadcaster,
{
    pub fn new(node: Arc<N>, signer: PrivateKeySigner, target: TargetCall) -> Self {
        Self {
            node,
            signer,
            target,
            tx_type: TxType::Eip1559,
            gas_price_percent_add: None,
            log_interval: DEFAULT_LOG_INTERVAL,
            callback: Arc::new(NilCallback),
        }
    }
}

impl<N, F> DispatcherBuilder<N, F>
where
    N: NonceSource + ChainInfo + Broadcaster,
    F: DispatchCallback,
{
    pub fn tx_type(mut self, t: TxType) -> Self {
        self.tx_type = t;
        self
    }
    pub fn gas_price_percent_add(mut self, percent: Option<u16>) -> Self {
        self.gas_price_percent_add = percent;
        self
    }
    pub fn log_interval(mut self, interval: NonZeroU64) -> Self {
        self.log_interval = interval;
        self
    }
    pub fn callback<G: DispatchCallback>(self, callback: Arc<G>) -> DispatcherBuilder<N, G> {
        DispatcherBuilder {
            node: self.node,
            signer: self.signer,
            target: self.target,
            tx_type: self.tx_type,
            gas_price_percent_add: self.gas_price_percent_add,
            log_interval: self.log_interval,
            callback,
        }
    }

    /// Reads the confirmed nonce, chain id and gas prices once, fixes the
    /// template and returns the loop. Nothing is read from the node after this.
    pub async fn build(self) -> Result<DispatchLoop<PrivateKeySigner, N, F>> {
        let address = self.signer.address();
        let start_nonce = self.node.confirmed_tx_count(address).await?;
        let chain_id = self.node.chain_id().await?;
        let mut pricing = resolve_pricing(self.node.as_ref(), self.tx_type).await?;
        if let Some(percent) = self.gas_price_percent_add {
            pricing = pricing.bumped(percent);
        }
        let template = TxTemplate::new(
            self.target.to,
            self.target.input,
            self.target.gas_limit,
            chain_id,
            pricing,
        )?;

        info!("starting dispatch loop at nonce {start_nonce}");
        info!("wallet: {address}, chain id: {chain_id}, pricing: {pricing:?}");

        Ok(DispatchLoop::new(
            template,
            NonceAllocator::new(start_nonce),
            Arc::new(self.signer),
            self.node,
            self.callback,
            self.log_interval,
        ))
    }
}

async fn resolve_pricing<N: ChainInfo + ?Sized>(node: &N, tx_type: TxType) -> Result<GasPricing> {
    match tx_type {
        TxType::Legacy => Ok(GasPricing::Legacy {
            gas_price: node.gas_price().await?,
        }),
        TxType::Eip1559 => {
            let gas_price = node.gas_price().await?;
            let max_priority_fee_per_gas = node.max_priority_fee_per_gas().await?;
            Ok(GasPricing::Eip1559 {
                max_fee_per_gas: gas_price + max_priority_fee_per_gas,
                max_priority_fee_per_gas,
            })
        }
        other => Err(ConfigError::UnsupportedTxType(format!("{other:?}")).into()),
    }
}
