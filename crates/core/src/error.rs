use alloy::{
    signers,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create metric")]
    Metrics(#[from] prometheus::Error),

    #[error("rpc error")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("runtime error")]
    Runtime(#[from] RuntimeErrorKind),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to encode calldata for '{sig}': {reason}")]
    CalldataEncoding { sig: String, reason: String },

    #[error("gas limit must be greater than zero")]
    GasLimitZero,

    #[error("unsupported tx type: {0}")]
    UnsupportedTxType(String),
}

/// Errors raised by the synchronous section of a dispatch iteration.
/// None of these consume a nonce.
#[derive(Debug, Error)]
pub enum RuntimeErrorKind {
    #[error("nonce {0} is not usable (EIP-2681 caps nonces below 2^64-1)")]
    NonceExhausted(u64),

    #[error("failed to spawn dispatch task: {0}")]
    SpawnFailed(String),
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signer failed to sign tx at nonce {nonce}")]
    Signer {
        nonce: u64,
        #[source]
        source: signers::Error,
    },
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("node rejected tx: {kind} ({message})")]
    Rejected { kind: RpcErrorKind, message: String },

    #[error("transport failure: {0}")]
    Transport(RpcError<TransportErrorKind>),
}

/// Classification of common `eth_sendRawTransaction` rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcErrorKind {
    TxAlreadyKnown,
    NonceTooLow,
    InsufficientFunds,
    ReplacementTransactionUnderpriced,
    Underpriced,
    GenericSendTxError,
}

impl RpcErrorKind {
    /// Matches on the message strings returned by geth, reth and anvil.
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("already known") || msg.contains("already imported") {
            Self::TxAlreadyKnown
        } else if msg.contains("nonce too low") {
            Self::NonceTooLow
        } else if msg.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if msg.contains("replacement transaction underpriced") {
            Self::ReplacementTransactionUnderpriced
        } else if msg.contains("underpriced") || msg.contains("fee cap less than") {
            Self::Underpriced
        } else {
            Self::GenericSendTxError
        }
    }
}

impl std::fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use RpcErrorKind::*;
        match self {
            TxAlreadyKnown => write!(f, "Transaction already known. Another sender may be using the same private key."),
            NonceTooLow => write!(f, "Nonce too low. The account's nonce moved past the local counter."),
            InsufficientFunds => write!(f, "Insufficient funds for transaction."),
            ReplacementTransactionUnderpriced => {
                write!(f, "Replacement transaction underpriced. A pending tx already occupies this nonce.")
            }
            Underpriced => write!(f, "Transaction underpriced. Try raising --gas-price-percent-add."),
            GenericSendTxError => write!(f, "Failed to send transaction."),
        }
    }
}

impl From<RpcError<TransportErrorKind>> for BroadcastError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err.as_error_resp() {
            Some(payload) => {
                let message = payload.message.to_string();
                BroadcastError::Rejected {
                    kind: RpcErrorKind::classify(&message),
                    message,
                }
            }
            None => BroadcastError::Transport(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    #[test]
    fn classifies_node_rejections() {
        assert_eq!(
            RpcErrorKind::classify("already known"),
            RpcErrorKind::TxAlreadyKnown
        );
        assert_eq!(
            RpcErrorKind::classify("nonce too low: next nonce 12, tx nonce 7"),
            RpcErrorKind::NonceTooLow
        );
        assert_eq!(
            RpcErrorKind::classify("replacement transaction underpriced"),
            RpcErrorKind::ReplacementTransactionUnderpriced
        );
        assert_eq!(
            RpcErrorKind::classify("transaction underpriced"),
            RpcErrorKind::Underpriced
        );
        assert_eq!(
            RpcErrorKind::classify("Insufficient funds for gas * price + value"),
            RpcErrorKind::InsufficientFunds
        );
        assert_eq!(
            RpcErrorKind::classify("execution reverted"),
            RpcErrorKind::GenericSendTxError
        );
    }

    #[test]
    fn converts_rpc_errors_into_broadcast_errors() {
        let rejected = BroadcastError::from(RpcError::<TransportErrorKind>::ErrorResp(
            ErrorPayload {
                code: -32000,
                message: "nonce too low".into(),
                data: None,
            },
        ));
        assert!(matches!(
            rejected,
            BroadcastError::Rejected {
                kind: RpcErrorKind::NonceTooLow,
                ref message,
            } if message == "nonce too low"
        ));

        let lost = BroadcastError::from(TransportErrorKind::custom_str("connection refused"));
        assert!(matches!(lost, BroadcastError::Transport(_)));
    }
}
