//! Prometheus counters for the dispatch pipeline.

use prometheus::{Histogram, HistogramOpts, IntCounter};

#[derive(Clone, Debug)]
pub struct DispatchMetrics {
    pub dispatched: IntCounter,
    pub sign_failures: IntCounter,
    pub broadcasts_accepted: IntCounter,
    pub broadcasts_rejected: IntCounter,
    pub send_latency: Histogram,
}

/// Point-in-time copy of the counters, used in progress lines.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub sign_failures: u64,
    pub broadcasts_accepted: u64,
    pub broadcasts_rejected: u64,
    /// Mean `eth_sendRawTransaction` round trip, if any send was timed.
    pub mean_send_latency_ms: Option<f64>,
}

impl DispatchMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let opts = |name: &str, help: &str| prometheus::Opts::new(name, help).namespace("blaster");
        let dispatched =
            IntCounter::with_opts(opts("dispatched_total", "Txs handed to a dispatch task"))?;
        let sign_failures =
            IntCounter::with_opts(opts("sign_failures_total", "Txs that failed to sign"))?;
        let broadcasts_accepted = IntCounter::with_opts(opts(
            "broadcasts_accepted_total",
            "Txs accepted by the node",
        ))?;
        let broadcasts_rejected = IntCounter::with_opts(opts(
            "broadcasts_rejected_total",
            "Txs rejected by the node or lost in transport",
        ))?;
        let send_latency = Histogram::with_opts(
            HistogramOpts::new(
                "send_raw_tx_latency_ms",
                "eth_sendRawTransaction round trip in milliseconds",
            )
            .namespace("blaster")
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]),
        )?;

        Ok(Self {
            dispatched,
            sign_failures,
            broadcasts_accepted,
            broadcasts_rejected,
            send_latency,
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let timed_sends = self.send_latency.get_sample_count();
        MetricsSnapshot {
            dispatched: self.dispatched.get(),
            sign_failures: self.sign_failures.get(),
            broadcasts_accepted: self.broadcasts_accepted.get(),
            broadcasts_rejected: self.broadcasts_rejected.get(),
            mean_send_latency_ms: (timed_sends > 0)
                .then(|| self.send_latency.get_sample_sum() / timed_sends as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchMetrics;

    #[test]
    fn snapshot_reads_counters() {
        let metrics = DispatchMetrics::new().unwrap();
        metrics.dispatched.inc_by(3);
        metrics.broadcasts_rejected.inc();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.dispatched, 3);
        assert_eq!(snapshot.broadcasts_rejected, 1);
        assert_eq!(snapshot.broadcasts_accepted, 0);
        assert_eq!(snapshot.mean_send_latency_ms, None);
    }

    #[test]
    fn snapshot_reports_mean_send_latency() {
        let metrics = DispatchMetrics::new().unwrap();
        metrics.send_latency.observe(10.0);
        metrics.send_latency.observe(30.0);
        assert_eq!(metrics.snapshot().mean_send_latency_ms, Some(20.0));
    }
}
