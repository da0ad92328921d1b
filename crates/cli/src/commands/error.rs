use miette::Diagnostic;
use thiserror::Error;

use crate::util::bold;

#[derive(Debug, Error, Diagnostic)]
pub enum ArgsError {
    #[error("invalid private key passed to {flag}: {0}", flag = bold("--priv-key"))]
    #[diagnostic(help("PRIVATE_KEY must be a 32-byte hex string, with or without 0x"))]
    PrivateKeyInvalid(String),

    #[error("invalid value for {flag}: {0}", flag = bold("--args"))]
    #[diagnostic(help("pass one value per parameter declared in --sig"))]
    CalldataArgs(String),
}
