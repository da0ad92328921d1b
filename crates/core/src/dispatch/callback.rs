use std::sync::Arc;

use alloy::primitives::TxHash;
use tracing::{debug, error, info, warn};

use crate::{
    error::{BroadcastError, Error, SigningError},
    metrics::DispatchMetrics,
};

/// Observes the synchronous section of the dispatch loop.
pub trait OnProgress {
    /// Called once every `log_interval` dispatches.
    fn on_progress(&self, dispatched: u64, nonce: u64);

    /// Called when an iteration fails before any task was spawned.
    /// `iteration` is the dispatch count at the time of the failure.
    fn on_loop_error(&self, iteration: u64, err: &Error);
}

/// Observes the detached sign-and-send task of a single nonce.
pub trait OnTxSent {
    fn on_tx_dispatched(&self, _nonce: u64) {}

    fn on_sign_error(&self, nonce: u64, err: &SigningError);

    fn on_tx_sent(&self, nonce: u64, res: &Result<TxHash, BroadcastError>);
}

pub trait DispatchCallback: OnProgress + OnTxSent + Send + Sync + 'static {}

impl<T: OnProgress + OnTxSent + Send + Sync + 'static> DispatchCallback for T {}

#[derive(Clone)]
pub struct NilCallback;

/// Logs every event through `tracing` and keeps the prometheus counters.
pub struct LogCallback {
    metrics: Arc<DispatchMetrics>,
}

impl LogCallback {
    pub fn new(metrics: Arc<DispatchMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }
}

impl OnProgress for LogCallback {
    fn on_progress(&self, dispatched: u64, nonce: u64) {
        let stats = self.metrics.snapshot();
        let latency = stats
            .mean_send_latency_ms
            .map(|ms| format!("{ms:.1}ms"))
            .unwrap_or_else(|| "n/a".to_owned());
        info!(
            "[{dispatched}] dispatched tx at nonce {nonce} (accepted: {}, rejected: {}, sign failures: {}, avg send latency: {latency})",
            stats.broadcasts_accepted, stats.broadcasts_rejected, stats.sign_failures
        );
    }

    fn on_loop_error(&self, iteration: u64, err: &Error) {
        error!("[loop] unexpected error at iteration {iteration}: {err}");
    }
}

impl OnTxSent for LogCallback {
    fn on_tx_dispatched(&self, _nonce: u64) {
        self.metrics.dispatched.inc();
    }

    fn on_sign_error(&self, nonce: u64, err: &SigningError) {
        self.metrics.sign_failures.inc();
        error!("[signing] failed to sign tx at nonce {nonce}: {err}");
    }

    fn on_tx_sent(&self, nonce: u64, res: &Result<TxHash, BroadcastError>) {
        match res {
            Ok(tx_hash) => {
                self.metrics.broadcasts_accepted.inc();
                debug!("[sendRaw] tx at nonce {nonce} accepted: {tx_hash}");
            }
            Err(err) => {
                self.metrics.broadcasts_rejected.inc();
                warn!("[sendRaw] tx at nonce {nonce} rejected: {err}");
            }
        }
    }
}

impl OnProgress for NilCallback {
    fn on_progress(&self, _dispatched: u64, _nonce: u64) {
        // do nothing
    }

    fn on_loop_error(&self, _iteration: u64, _err: &Error) {}
}

impl OnTxSent for NilCallback {
    fn on_sign_error(&self, _nonce: u64, _err: &SigningError) {}

    fn on_tx_sent(&self, _nonce: u64, _res: &Result<TxHash, BroadcastError>) {}
}
