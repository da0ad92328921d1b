use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::{Decodable2718, Eip2718Error, Encodable2718},
    primitives::{Address, Bytes, TxHash},
};

use super::template::GasPricing;

/// One transaction to be signed: the template's constant fields plus a unique nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRequest {
    pub to: Address,
    pub input: Bytes,
    pub gas_limit: u64,
    pub chain_id: u64,
    pub pricing: GasPricing,
    pub nonce: u64,
}

/// An EIP-2718 encoded, signed transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug)]
pub struct SignedTx {
    pub nonce: u64,
    pub tx_hash: TxHash,
    pub raw: Bytes,
}

impl SignedTx {
    pub fn new(nonce: u64, envelope: &TxEnvelope) -> Self {
        Self {
            nonce,
            tx_hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        }
    }

    /// Decodes the raw bytes back into a typed envelope.
    pub fn decode(&self) -> Result<TxEnvelope, Eip2718Error> {
        TxEnvelope::decode_2718(&mut self.raw.as_ref())
    }
}
