pub mod calldata;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod provider;

pub type Result<T> = std::result::Result<T, error::Error>;
pub use error::Error;
