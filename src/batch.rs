//! Batch fan-out and outcome aggregation.
//!
//! A round launches one submission per credential concurrently and waits for
//! every one of them to settle; a failed submission never cancels or blocks
//! its siblings. Settled results are normalized into [`SubmissionOutcome`]s
//! and delivered to the caller's sink in settlement order, which is not
//! necessarily credential order.

use crate::{
    error::SubmitError,
    inscriptions::InscriptionSource,
    signer::SenderKey,
    submitter::TransferSender,
    types::{
        InscriptionTransferRequest, OutcomeStatus, PageCursor, SubmissionOutcome, TransferRequest,
        TransferSpec,
    },
};
use alloy::primitives::B256;
use futures_util::{StreamExt, stream::FuturesUnordered};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Where settled outcomes are delivered, one per submission.
pub type OutcomeSink = mpsc::UnboundedSender<SubmissionOutcome>;

/// Message reported when the item listing runs dry in claim mode.
pub const NO_MORE_ITEMS: &str = "item source has no more items";

/// Drives batches of submissions and normalizes their outcomes.
///
/// The success counter is owned by the runner instance, so independent
/// runners in one process do not share totals.
#[derive(Debug)]
pub struct BatchRunner<S> {
    sender: S,
    successes: AtomicU64,
}

impl<S> BatchRunner<S> {
    /// Creates a runner over the given submitter.
    pub fn new(sender: S) -> Self {
        Self { sender, successes: AtomicU64::new(0) }
    }

    /// Accepted submissions observed by this runner so far.
    pub fn success_count(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }

    fn settle(&self, settled: Result<B256, SubmitError>) -> SubmissionOutcome {
        match settled {
            Ok(hash) => SubmissionOutcome {
                status: OutcomeStatus::Success,
                message: hash.to_string(),
                success_count: self.successes.fetch_add(1, Ordering::SeqCst) + 1,
            },
            Err(err) => SubmissionOutcome {
                status: OutcomeStatus::Failed,
                message: err.outcome_message(),
                success_count: self.successes.load(Ordering::SeqCst),
            },
        }
    }

    fn failed(&self, message: impl Into<String>) -> SubmissionOutcome {
        SubmissionOutcome {
            status: OutcomeStatus::Failed,
            message: message.into(),
            success_count: self.successes.load(Ordering::SeqCst),
        }
    }
}

impl<S: TransferSender> BatchRunner<S> {
    /// Runs one round: one submission per credential, all settled before the
    /// round is complete.
    pub async fn run_round(&self, request: &TransferRequest, sink: &OutcomeSink) {
        let spec = request.spec();
        info!(credentials = request.credentials.len(), "starting transfer round");

        let mut inflight: FuturesUnordered<_> = request
            .credentials
            .iter()
            .map(|credential| self.sender.send_transfer(credential, &spec))
            .collect();

        while let Some(settled) = inflight.next().await {
            let _ = sink.send(self.settle(settled));
        }
    }

    /// Claims items discovered through `source`: pages through the listing,
    /// transferring each item from the first credential's account with the
    /// item's identifier as payload. Stops when the requested count is
    /// exhausted, the listing runs dry, or a listing query fails; the latter
    /// two are reported as a single failed outcome.
    pub async fn run_claim<I: InscriptionSource>(
        &self,
        request: &InscriptionTransferRequest,
        source: &I,
        page_size: u64,
        sink: &OutcomeSink,
    ) {
        let Some(credential) = request.transfer.credentials.first() else {
            return;
        };
        let owner = match SenderKey::parse(credential) {
            Ok(key) => key.address(),
            Err(err) => {
                let _ = sink.send(self.settle(Err(err)));
                return;
            }
        };

        let mut cursor = PageCursor::first(page_size);
        let mut remaining = request.count;
        while remaining > 0 {
            let items = match source.owned_page(owner, &request.tick, &cursor).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(page = cursor.page(), %err, "item listing query failed");
                    let _ = sink.send(self.failed(err.to_string()));
                    return;
                }
            };
            if items.is_empty() {
                let _ = sink.send(self.failed(NO_MORE_ITEMS));
                return;
            }

            // The final page only submits what is still owed, even if the
            // listing returned more.
            let take = usize::try_from(remaining).map_or(items.len(), |r| r.min(items.len()));
            info!(page = cursor.page(), items = take, "starting claim round");

            let specs: Vec<TransferSpec> = items[..take]
                .iter()
                .map(|item| TransferSpec {
                    to: request.transfer.to,
                    memo: Some(item.trx_hash.clone()),
                    extra_fee_gwei: request.transfer.extra_fee_gwei,
                })
                .collect();
            let mut inflight: FuturesUnordered<_> = specs
                .iter()
                .map(|spec| self.sender.send_transfer(credential, spec))
                .collect();
            while let Some(settled) = inflight.next().await {
                let _ = sink.send(self.settle(settled));
            }

            remaining -= take as u64;
            cursor.advance();
        }
    }
}
