mod blaster_subcommand;
pub mod common;
pub mod error;
pub mod spam;
pub mod status;

use clap::Parser;

pub use blaster_subcommand::BlasterSubcommand;
pub use spam::spam;
pub use status::status;

#[derive(Parser, Debug)]
#[command(
    name = "blaster",
    version,
    about = "Saturate an account's nonce slots with signed calls to one contract"
)]
pub struct BlasterCli {
    #[command(subcommand)]
    pub command: BlasterSubcommand,
}

impl BlasterCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
