use std::{convert::Infallible, num::NonZeroU64, sync::Arc};

use tokio::{runtime::Handle, task::JoinHandle};

use crate::{error::RuntimeErrorKind, Result};

use super::{
    types::DispatchRequest, Broadcaster, DispatchCallback, NonceAllocator, RequestSigner,
    TxTemplate,
};

pub const DEFAULT_LOG_INTERVAL: NonZeroU64 = match NonZeroU64::new(1000) {
    Some(interval) => interval,
    None => unreachable!(),
};

/// Drives the pipeline: allocate a nonce, build the request, spawn a detached
/// sign-and-send task, count, repeat.
///
/// The loop is the only owner of the nonce counter. It never waits on the
/// tasks it spawns, so signing and broadcasting may complete in any order.
pub struct DispatchLoop<S, B, F>
where
    S: RequestSigner,
    B: Broadcaster,
    F: DispatchCallback,
{
    template: TxTemplate,
    nonces: NonceAllocator,
    signer: Arc<S>,
    broadcaster: Arc<B>,
    callback: Arc<F>,
    log_interval: NonZeroU64,
    dispatched: u64,
}

impl<S, B, F> DispatchLoop<S, B, F>
where
    S: RequestSigner,
    B: Broadcaster,
    F: DispatchCallback,
{
    pub fn new(
        template: TxTemplate,
        nonces: NonceAllocator,
        signer: Arc<S>,
        broadcaster: Arc<B>,
        callback: Arc<F>,
        log_interval: NonZeroU64,
    ) -> Self {
        Self {
            template,
            nonces,
            signer,
            broadcaster,
            callback,
            log_interval,
            dispatched: 0,
        }
    }

    /// Number of iterations that completed their synchronous section.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// The nonce the next iteration will use.
    pub fn next_nonce(&self) -> u64 {
        self.nonces.current()
    }

    pub fn template(&self) -> &TxTemplate {
        &self.template
    }

    /// Runs one iteration and returns without waiting for the spawned task.
    ///
    /// An `Err` means the iteration was abandoned before a nonce was consumed.
    /// The returned handle is only useful to callers that want to observe
    /// completion; [`DispatchLoop::run`] drops it.
    pub fn step(&mut self) -> Result<JoinHandle<()>> {
        let runtime =
            Handle::try_current().map_err(|e| RuntimeErrorKind::SpawnFailed(e.to_string()))?;
        let template = &self.template;
        let request = self.nonces.allocate_with(|nonce| template.request(nonce))?;
        let nonce = request.nonce;

        let handle = runtime.spawn(sign_and_send(
            request,
            self.signer.clone(),
            self.broadcaster.clone(),
            self.callback.clone(),
        ));
        self.callback.on_tx_dispatched(nonce);

        self.dispatched += 1;
        if self.dispatched % self.log_interval.get() == 0 {
            self.callback.on_progress(self.dispatched, nonce);
        }
        Ok(handle)
    }

    /// Dispatches until the process is killed.
    pub async fn run(mut self) -> Infallible {
        loop {
            if let Err(err) = self.step() {
                self.callback.on_loop_error(self.dispatched, &err);
            }
            // lets spawned tasks make progress on a current-thread runtime
            tokio::task::yield_now().await;
        }
    }
}

async fn sign_and_send<S, B, F>(
    request: DispatchRequest,
    signer: Arc<S>,
    broadcaster: Arc<B>,
    callback: Arc<F>,
) where
    S: RequestSigner,
    B: Broadcaster,
    F: DispatchCallback,
{
    let signed = match signer.sign_request(&request) {
        Ok(signed) => signed,
        Err(err) => {
            callback.on_sign_error(request.nonce, &err);
            return;
        }
    };
    let res = broadcaster.send_raw(&signed).await;
    callback.on_tx_sent(signed.nonce, &res);
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU64, sync::Arc};

    use alloy::primitives::Address;

    use super::DispatchLoop;
    use crate::{
        dispatch::{
            template::{GasPricing, DEFAULT_CALLDATA, DEFAULT_GAS_LIMIT},
            util::test::{
                get_test_signer, FlakySigner, MockBroadcaster, RecordingCallback,
            },
            NonceAllocator, TxTemplate,
        },
        error::{Error, RuntimeErrorKind},
    };

    fn template() -> TxTemplate {
        TxTemplate::new(
            Address::repeat_byte(0xaa),
            DEFAULT_CALLDATA.parse().unwrap(),
            DEFAULT_GAS_LIMIT,
            31337,
            GasPricing::Eip1559 {
                max_fee_per_gas: 2_000_000_000,
                max_priority_fee_per_gas: 1_000_000_000,
            },
        )
        .unwrap()
    }

    fn dispatcher(
        start_nonce: u64,
        interval: u64,
        signer: FlakySigner,
        broadcaster: MockBroadcaster,
    ) -> DispatchLoop<FlakySigner, MockBroadcaster, RecordingCallback> {
        DispatchLoop::new(
            template(),
            NonceAllocator::new(start_nonce),
            Arc::new(signer),
            Arc::new(broadcaster),
            Arc::new(RecordingCallback::default()),
            NonZeroU64::new(interval).unwrap(),
        )
    }

    async fn run_iterations(
        dispatcher: &mut DispatchLoop<FlakySigner, MockBroadcaster, RecordingCallback>,
        iterations: usize,
    ) {
        let handles = (0..iterations)
            .map(|_| dispatcher.step().unwrap())
            .collect::<Vec<_>>();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn submits_consecutive_nonces_and_logs_at_interval() {
        let broadcaster = MockBroadcaster::default();
        let mut dispatcher = dispatcher(5, 2, FlakySigner::new(get_test_signer()), broadcaster);
        run_iterations(&mut dispatcher, 4).await;

        assert_eq!(dispatcher.broadcaster.sent_nonces(), vec![5, 6, 7, 8]);
        assert_eq!(dispatcher.callback.progress(), vec![(2, 6), (4, 8)]);
        assert!(dispatcher.callback.sign_errors().is_empty());
        assert!(dispatcher.callback.broadcast_errors().is_empty());
        assert_eq!(dispatcher.dispatched(), 4);
        assert_eq!(dispatcher.next_nonce(), 9);
    }

    #[tokio::test]
    async fn signing_failure_leaves_a_permanent_gap() {
        let signer = FlakySigner::new(get_test_signer()).fail_on(6);
        let mut dispatcher = dispatcher(5, 1000, signer, MockBroadcaster::default());
        run_iterations(&mut dispatcher, 4).await;

        assert_eq!(dispatcher.broadcaster.sent_nonces(), vec![5, 7, 8]);
        assert_eq!(dispatcher.callback.sign_errors(), vec![6]);

        // the gap is never backfilled by later iterations
        run_iterations(&mut dispatcher, 2).await;
        assert_eq!(dispatcher.broadcaster.sent_nonces(), vec![5, 7, 8, 9, 10]);
    }

    #[tokio::test]
    async fn broadcast_rejection_is_logged_and_loop_continues() {
        let broadcaster = MockBroadcaster::default().reject(7);
        let mut dispatcher = dispatcher(5, 1000, FlakySigner::new(get_test_signer()), broadcaster);
        run_iterations(&mut dispatcher, 4).await;

        assert_eq!(dispatcher.broadcaster.sent_nonces(), vec![5, 6, 8]);
        assert_eq!(dispatcher.callback.broadcast_errors(), vec![7]);
        assert_eq!(dispatcher.callback.accepted(), vec![5, 6, 8]);
        assert_eq!(dispatcher.next_nonce(), 9);
    }

    #[tokio::test]
    async fn synchronous_failure_consumes_no_nonce() {
        let mut dispatcher = dispatcher(
            u64::MAX,
            1,
            FlakySigner::new(get_test_signer()),
            MockBroadcaster::default(),
        );
        for _ in 0..3 {
            let res = dispatcher.step();
            assert!(matches!(
                res,
                Err(Error::Runtime(RuntimeErrorKind::NonceExhausted(u64::MAX)))
            ));
        }
        assert_eq!(dispatcher.next_nonce(), u64::MAX);
        assert_eq!(dispatcher.dispatched(), 0);
        assert!(dispatcher.callback.progress().is_empty());
        assert!(dispatcher.broadcaster.sent_nonces().is_empty());
    }

    #[tokio::test]
    async fn progress_ignores_pending_tasks() {
        let mut dispatcher = dispatcher(
            0,
            3,
            FlakySigner::new(get_test_signer()),
            MockBroadcaster::default(),
        );
        // no task has had a chance to run yet
        let handles = (0..10)
            .map(|_| dispatcher.step().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(dispatcher.callback.progress(), vec![(3, 2), (6, 5), (9, 8)]);
        assert!(dispatcher.broadcaster.sent_nonces().is_empty());

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(dispatcher.broadcaster.sent_nonces(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn run_never_waits_on_dispatch_tasks() {
        let broadcaster = MockBroadcaster::default();
        let dispatcher = dispatcher(100, 1000, FlakySigner::new(get_test_signer()), broadcaster);
        let sent = dispatcher.broadcaster.clone();

        let run = tokio::spawn(dispatcher.run());
        while sent.sent_nonces().len() < 50 {
            tokio::task::yield_now().await;
        }
        run.abort();

        let mut nonces = sent.sent_nonces();
        nonces.truncate(50);
        assert_eq!(nonces, (100..150).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn run_survives_synchronous_failures() {
        let dispatcher = dispatcher(
            u64::MAX,
            1,
            FlakySigner::new(get_test_signer()),
            MockBroadcaster::default(),
        );
        let callback = dispatcher.callback.clone();
        let sent = dispatcher.broadcaster.clone();

        let run = tokio::spawn(dispatcher.run());
        while callback.loop_errors().len() < 3 {
            tokio::task::yield_now().await;
        }
        run.abort();

        assert!(callback.loop_errors().iter().all(|iteration| *iteration == 0));
        assert!(callback.progress().is_empty());
        assert!(sent.sent_nonces().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn nonces_stay_unique_when_sends_complete_out_of_order() {
        let broadcaster = MockBroadcaster::default().descending_from(119);
        let mut dispatcher = dispatcher(100, 1000, FlakySigner::new(get_test_signer()), broadcaster);
        run_iterations(&mut dispatcher, 20).await;

        let sent = dispatcher.broadcaster.sent_nonces();
        assert_eq!(sent.len(), 20);
        assert_ne!(sent, (100..120).collect::<Vec<_>>());

        let mut sorted = sent.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, (100..120).collect::<Vec<_>>());
        assert_eq!(dispatcher.next_nonce(), 120);
    }
}
