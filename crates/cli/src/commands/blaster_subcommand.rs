use clap::Subcommand;

use super::common::RpcCliArgs;
use super::spam::SpamCliArgs;

#[derive(Debug, Subcommand)]
pub enum BlasterSubcommand {
    #[command(
        name = "spam",
        long_about = "Sign and send the target call at every nonce, as fast as the machine can sign. Runs until killed."
    )]
    Spam {
        #[command(flatten)]
        args: Box<SpamCliArgs>,
    },

    #[command(
        name = "status",
        long_about = "Print the account's confirmed and pending nonces."
    )]
    Status {
        #[command(flatten)]
        args: RpcCliArgs,
    },
}
