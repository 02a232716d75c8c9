//! Dispatch flow tests over the public API: batch rounds driven by the loop
//! controller, and claim-mode pagination, all against mocked network seams.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use inscriber::{
    batch::BatchRunner,
    error::{SourceError, SubmitError},
    inscriptions::{InscriptionRow, InscriptionSource},
    loops::LoopController,
    submitter::TransferSender,
    types::{
        InscriptionTransferRequest, OutcomeStatus, PageCursor, SubmissionOutcome, TransferRequest,
        TransferSpec,
    },
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::mpsc, time::sleep};

const KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

/// Settles after a fixed delay; rejects credentials starting with `bad`.
struct SlowSender {
    delay: Duration,
    submissions: AtomicU64,
}

impl SlowSender {
    fn new(delay: Duration) -> Self {
        Self { delay, submissions: AtomicU64::new(0) }
    }
}

#[async_trait]
impl TransferSender for SlowSender {
    async fn send_transfer(
        &self,
        credential: &str,
        _spec: &TransferSpec,
    ) -> Result<B256, SubmitError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if credential.starts_with("bad") {
            Err(SubmitError::Rejected { reason: "insufficient funds".into() })
        } else {
            Ok(B256::repeat_byte(7))
        }
    }
}

/// Serves full pages of `page_size` rows forever.
struct EndlessSource {
    page_size: u64,
    queries: AtomicU64,
}

#[async_trait]
impl InscriptionSource for EndlessSource {
    async fn owned_page(
        &self,
        _owner: Address,
        _tick: &str,
        cursor: &PageCursor,
    ) -> Result<Vec<InscriptionRow>, SourceError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.page_size)
            .map(|i| InscriptionRow { trx_hash: format!("0x{:08x}{:08x}", cursor.page(), i) })
            .collect())
    }
}

fn request(credentials: &[&str]) -> TransferRequest {
    TransferRequest {
        credentials: credentials.iter().map(|c| c.to_string()).collect(),
        to: None,
        memo: None,
        extra_fee_gwei: U256::ZERO,
        endpoint: None,
    }
}

fn drain(mut rx: mpsc::UnboundedReceiver<SubmissionOutcome>) -> Vec<SubmissionOutcome> {
    let mut outcomes = Vec::new();
    while let Ok(outcome) = rx.try_recv() {
        outcomes.push(outcome);
    }
    outcomes
}

fn start_loop(
    controller: &LoopController,
    runner: Arc<BatchRunner<SlowSender>>,
    request: TransferRequest,
    sink: mpsc::UnboundedSender<SubmissionOutcome>,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    controller
        .start(delay, move || {
            let runner = Arc::clone(&runner);
            let request = request.clone();
            let sink = sink.clone();
            async move { runner.run_round(&request, &sink).await }
        })
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn loop_emits_one_outcome_per_credential_per_round() {
    let runner = Arc::new(BatchRunner::new(SlowSender::new(Duration::ZERO)));
    let controller = LoopController::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = start_loop(
        &controller,
        Arc::clone(&runner),
        request(&[KEY, "bad-key", KEY]),
        tx,
        Duration::from_secs(5),
    );

    // Two full rounds land at t=5 and t=10.
    sleep(Duration::from_secs(12)).await;
    controller.stop();
    handle.await.unwrap();

    let outcomes = drain(rx);
    assert_eq!(outcomes.len(), 6);
    assert_eq!(
        outcomes.iter().filter(|o| o.status == OutcomeStatus::Success).count(),
        4
    );
    assert_eq!(runner.success_count(), 4);

    let mut last = 0;
    for outcome in &outcomes {
        assert!(outcome.success_count >= last, "success totals must never decrease");
        last = outcome.success_count;
    }
}

#[tokio::test(start_paused = true)]
async fn stop_mid_round_flushes_the_round_and_prevents_the_next() {
    let runner = Arc::new(BatchRunner::new(SlowSender::new(Duration::from_secs(3))));
    let controller = LoopController::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = start_loop(
        &controller,
        Arc::clone(&runner),
        request(&[KEY, KEY, "bad-key"]),
        tx,
        Duration::from_secs(5),
    );

    // The first round runs from t=5 to t=8; stop lands inside it.
    sleep(Duration::from_secs(6)).await;
    controller.stop();
    handle.await.unwrap();

    let outcomes = drain(rx);
    assert_eq!(outcomes.len(), 3, "the in-flight round settles completely");
    assert_eq!(
        outcomes.iter().filter(|o| o.status == OutcomeStatus::Failed).count(),
        1
    );
    assert_eq!(
        outcomes.iter().find(|o| o.status == OutcomeStatus::Failed).unwrap().message,
        "insufficient funds"
    );

    // Long after the stop, nothing else was submitted.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(runner.success_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_before_the_first_round_prevents_all_submissions() {
    let runner = Arc::new(BatchRunner::new(SlowSender::new(Duration::ZERO)));
    let controller = LoopController::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = start_loop(
        &controller,
        Arc::clone(&runner),
        request(&[KEY]),
        tx,
        Duration::from_secs(5),
    );
    controller.stop();
    handle.await.unwrap();

    assert!(drain(rx).is_empty());
    assert_eq!(runner.success_count(), 0);
}

#[tokio::test]
async fn claim_pages_until_the_requested_count_is_exhausted() {
    let runner = BatchRunner::new(SlowSender::new(Duration::ZERO));
    let source = EndlessSource { page_size: 50, queries: AtomicU64::new(0) };
    let (tx, rx) = mpsc::unbounded_channel();

    let request = InscriptionTransferRequest {
        transfer: request(&[KEY]),
        tick: "sato".into(),
        count: 120,
    };
    runner.run_claim(&request, &source, 50, &tx).await;
    drop(tx);

    let outcomes = drain(rx);
    assert_eq!(source.queries.load(Ordering::SeqCst), 3);
    assert_eq!(outcomes.len(), 120);
    assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Success));
    assert_eq!(runner.success_count(), 120);
}
