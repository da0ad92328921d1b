use blaster_core::{
    dispatch::{ChainInfo, NonceSource},
    provider,
};
use tracing::info;

use super::common::RpcCliArgs;
use crate::{error::CliError, util::bold};

/// Prints where the account's nonce stands on the node.
pub async fn status(args: RpcCliArgs) -> Result<(), CliError> {
    let address = args.signer()?.address();
    let node = provider::connect(args.rpc_url.clone(), None);

    let chain_id = node.chain_id().await?;
    let confirmed = node.confirmed_tx_count(address).await?;
    let pending = node.pending_tx_count(address).await?;

    info!("account:   {}", bold(address.to_string()));
    info!("rpc:       {} (chain id {chain_id})", args.rpc_url);
    info!("confirmed: {confirmed}");
    info!("pending:   {pending}");
    info!(
        "in flight: {}",
        bold(pending.saturating_sub(confirmed).to_string())
    );
    Ok(())
}
