use crate::commands::error::ArgsError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("invalid arg(s)")]
    #[diagnostic(transparent)]
    Args(#[from] ArgsError),

    #[error("core error")]
    #[diagnostic(help("check RUST_LOG=debug output for the failing RPC call"))]
    Core(#[from] blaster_core::Error),
}
