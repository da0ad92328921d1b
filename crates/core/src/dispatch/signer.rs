use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy},
    network::TxSignerSync,
    primitives::{Address, TxKind, U256},
    signers::local::PrivateKeySigner,
};

use crate::error::SigningError;

use super::{
    template::GasPricing,
    types::{DispatchRequest, SignedTx},
};

/// Turns a request into signed wire bytes. Must not touch the network;
/// implementations are shared across every in-flight dispatch task.
pub trait RequestSigner: Send + Sync + 'static {
    fn address(&self) -> Address;

    fn sign_request(&self, req: &DispatchRequest) -> Result<SignedTx, SigningError>;
}

impl RequestSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        PrivateKeySigner::address(self)
    }

    fn sign_request(&self, req: &DispatchRequest) -> Result<SignedTx, SigningError> {
        let to_signer_err = |source| SigningError::Signer {
            nonce: req.nonce,
            source,
        };
        let envelope: TxEnvelope = match req.pricing {
            GasPricing::Legacy { gas_price } => {
                let mut tx = TxLegacy {
                    chain_id: Some(req.chain_id),
                    nonce: req.nonce,
                    gas_price,
                    gas_limit: req.gas_limit,
                    to: TxKind::Call(req.to),
                    value: U256::ZERO,
                    input: req.input.clone(),
                };
                let sig = self.sign_transaction_sync(&mut tx).map_err(to_signer_err)?;
                tx.into_signed(sig).into()
            }
            GasPricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let mut tx = TxEip1559 {
                    chain_id: req.chain_id,
                    nonce: req.nonce,
                    gas_limit: req.gas_limit,
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                    to: TxKind::Call(req.to),
                    value: U256::ZERO,
                    access_list: Default::default(),
                    input: req.input.clone(),
                };
                let sig = self.sign_transaction_sync(&mut tx).map_err(to_signer_err)?;
                tx.into_signed(sig).into()
            }
        };
        Ok(SignedTx::new(req.nonce, &envelope))
    }
}
