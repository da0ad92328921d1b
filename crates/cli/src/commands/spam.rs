use std::{num::NonZeroU64, sync::Arc};

use alloy::primitives::{Address, Bytes};
use blaster_core::{
    calldata::encode_calldata,
    dispatch::{
        dispatch_loop::DEFAULT_LOG_INTERVAL,
        template::{DEFAULT_CALLDATA, DEFAULT_GAS_LIMIT},
        LogCallback,
    },
    metrics::DispatchMetrics,
    orchestrator::{DispatcherBuilder, TargetCall},
    provider,
};
use tracing::info;

use super::common::{RpcCliArgs, TxTypeCli};
use super::error::ArgsError;
use crate::{error::CliError, util::bold};

#[derive(Debug, clap::Args)]
pub struct SpamCliArgs {
    #[command(flatten)]
    pub rpc_args: RpcCliArgs,

    /// Address of the contract to call.
    #[arg(env = "CONTRACT_ADDRESS", long, visible_alias = "contract")]
    pub to: Address,

    /// Raw call data sent with every tx.
    #[arg(
        long,
        long_help = "Hex-encoded call data sent with every tx. Ignored when --sig is set.",
        default_value = DEFAULT_CALLDATA,
        conflicts_with = "sig"
    )]
    pub calldata: Bytes,

    /// Function signature to ABI-encode instead of raw call data.
    #[arg(long, long_help = "Function signature to call, e.g. \"claim(uint256 id)\".")]
    pub sig: Option<String>,

    /// Arguments for --sig.
    #[arg(
        long,
        requires = "sig",
        num_args = 1..,
        value_delimiter = ',',
        long_help = "Arguments for --sig, comma-separated or repeated."
    )]
    pub args: Vec<String>,

    /// Gas limit of every tx.
    #[arg(long, env = "GAS_LIMIT", default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Transaction type
    #[arg(
        short = 't',
        long,
        long_help = "Transaction type for dispatched transactions.",
        value_enum,
        default_value_t = TxTypeCli::Eip1559,
    )]
    pub tx_type: TxTypeCli,

    /// Adds (gas_price * percent) / 100 to the gas price read at startup.
    #[arg(
        short,
        long,
        long_help = "Adds given percent increase to the gas price read from the node at startup. Prices are never adjusted afterwards."
    )]
    pub gas_price_percent_add: Option<u16>,

    /// Number of dispatched txs between progress lines.
    #[arg(long, env = "LOG_INTERVAL", default_value_t = DEFAULT_LOG_INTERVAL)]
    pub log_interval: NonZeroU64,
}

impl SpamCliArgs {
    pub fn calldata(&self) -> Result<Bytes, CliError> {
        match &self.sig {
            Some(sig) => {
                encode_calldata(sig, self.args.as_slice()).map_err(|e| -> CliError {
                    match e {
                        blaster_core::Error::Config(e) => ArgsError::CalldataArgs(e.to_string()).into(),
                        other => other.into(),
                    }
                })
            }
            None => Ok(self.calldata.clone()),
        }
    }
}

/// Runs the dispatch loop. Only returns on a startup error.
pub async fn spam(args: SpamCliArgs) -> Result<(), CliError> {
    let signer = args.rpc_args.signer()?;
    let target = TargetCall {
        to: args.to,
        input: args.calldata()?,
        gas_limit: args.gas_limit,
    };

    let metrics = Arc::new(DispatchMetrics::new().map_err(blaster_core::Error::from)?);
    let node = Arc::new(provider::connect(
        args.rpc_args.rpc_url.clone(),
        Some(metrics.send_latency.clone()),
    ));

    info!(
        "dispatching {} to {} via {} ({} tx)",
        bold(target.input.to_string()),
        bold(target.to.to_string()),
        args.rpc_args.rpc_url,
        args.tx_type
    );
    let dispatcher = DispatcherBuilder::new(node, signer, target)
        .tx_type(args.tx_type.into())
        .gas_price_percent_add(args.gas_price_percent_add)
        .log_interval(args.log_interval)
        .callback(Arc::new(LogCallback::new(metrics)))
        .build()
        .await?;

    match dispatcher.run().await {}
}
