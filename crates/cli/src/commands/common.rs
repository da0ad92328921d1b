//! This file contains type definitions for CLI arguments shared by subcommands.

use std::str::FromStr;

use alloy::{consensus::TxType, signers::local::PrivateKeySigner, transports::http::reqwest::Url};

use super::error::ArgsError;

#[derive(Clone, clap::Args)]
pub struct RpcCliArgs {
    /// RPC URL to send requests.
    #[arg(
        env = "RPC_URL",
        short,
        long,
        long_help = "JSON-RPC endpoint of the node that receives the transactions.",
        default_value = "http://localhost:8545"
    )]
    pub rpc_url: Url,

    /// Private key of the sending account.
    #[arg(
        env = "PRIVATE_KEY",
        short,
        long = "priv-key",
        long_help = "Private key that signs every transaction. Its confirmed tx count seeds the local nonce.",
        hide_env_values = true
    )]
    pub private_key: String,
}

impl std::fmt::Debug for RpcCliArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcCliArgs")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl RpcCliArgs {
    pub fn signer(&self) -> Result<PrivateKeySigner, ArgsError> {
        PrivateKeySigner::from_str(self.private_key.trim())
            .map_err(|e| ArgsError::PrivateKeyInvalid(e.to_string()))
    }
}

#[derive(Copy, Debug, Clone, clap::ValueEnum)]
pub enum TxTypeCli {
    /// Legacy transaction (type `0x0`)
    Legacy,
    /// A transaction with a priority fee ([EIP-1559](https://eips.ethereum.org/EIPS/eip-1559)), type `0x2`
    Eip1559,
}

impl std::fmt::Display for TxTypeCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TxTypeCli::*;
        write!(
            f,
            "{}",
            match self {
                Legacy => "legacy",
                Eip1559 => "eip1559",
            }
        )
    }
}

impl From<TxTypeCli> for TxType {
    fn from(value: TxTypeCli) -> Self {
        match value {
            TxTypeCli::Legacy => TxType::Legacy,
            TxTypeCli::Eip1559 => TxType::Eip1559,
        }
    }
}
