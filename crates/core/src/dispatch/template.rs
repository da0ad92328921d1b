use alloy::primitives::{Address, Bytes};

use crate::{
    error::{ConfigError, RuntimeErrorKind},
    Result,
};

use super::types::DispatchRequest;

/// Default call data: a bare 4-byte selector with no arguments.
pub const DEFAULT_CALLDATA: &str = "0x05632f40";
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;

/// Gas pricing, fixed once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasPricing {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl GasPricing {
    /// Adds `(price * percent) / 100` to every price field.
    pub fn bumped(self, percent: u16) -> Self {
        let bump = |price: u128| price + price * percent as u128 / 100;
        match self {
            GasPricing::Legacy { gas_price } => GasPricing::Legacy {
                gas_price: bump(gas_price),
            },
            GasPricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => GasPricing::Eip1559 {
                max_fee_per_gas: bump(max_fee_per_gas),
                max_priority_fee_per_gas: bump(max_priority_fee_per_gas),
            },
        }
    }
}

/// The invariant part of every dispatched transaction.
#[derive(Clone, Debug)]
pub struct TxTemplate {
    to: Address,
    input: Bytes,
    gas_limit: u64,
    chain_id: u64,
    pricing: GasPricing,
}

impl TxTemplate {
    pub fn new(
        to: Address,
        input: Bytes,
        gas_limit: u64,
        chain_id: u64,
        pricing: GasPricing,
    ) -> Result<Self> {
        if gas_limit == 0 {
            return Err(ConfigError::GasLimitZero.into());
        }
        Ok(Self {
            to,
            input,
            gas_limit,
            chain_id,
            pricing,
        })
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn input(&self) -> &Bytes {
        &self.input
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn pricing(&self) -> GasPricing {
        self.pricing
    }

    /// Builds the request for `nonce`. Fails for `u64::MAX`, which no
    /// transaction may carry.
    pub fn request(&self, nonce: u64) -> Result<DispatchRequest> {
        if nonce == u64::MAX {
            return Err(RuntimeErrorKind::NonceExhausted(nonce).into());
        }
        Ok(DispatchRequest {
            to: self.to,
            input: self.input.clone(),
            gas_limit: self.gas_limit,
            chain_id: self.chain_id,
            pricing: self.pricing,
            nonce,
        })
    }
}
