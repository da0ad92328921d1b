mod commands;
mod error;
mod util;

use commands::{BlasterCli, BlasterSubcommand};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // a missing .env is fine; flags and the real environment still apply
    let _ = dotenvy::dotenv();
    util::init_tracing();

    let args = BlasterCli::parse_args();
    match args.command {
        BlasterSubcommand::Spam { args } => commands::spam(*args).await?,
        BlasterSubcommand::Status { args } => commands::status(args).await?,
    }
    Ok(())
}
