//! The dispatch pipeline: nonce allocation, request construction, signing and
//! fire-and-forget broadcasting.

mod callback;
pub mod dispatch_loop;
pub mod node;
pub mod nonce;
pub mod signer;
pub mod template;
mod types;

pub use callback::{DispatchCallback, LogCallback, NilCallback, OnProgress, OnTxSent};
pub use dispatch_loop::DispatchLoop;
pub use node::{Broadcaster, ChainInfo, NonceSource, RpcNode};
pub use nonce::NonceAllocator;
pub use signer::RequestSigner;
pub use template::{GasPricing, TxTemplate};
pub use types::{DispatchRequest, SignedTx};
