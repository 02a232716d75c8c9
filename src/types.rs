//! Request and outcome types for the dispatcher.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for one batch of transfers, immutable per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Raw signing keys, one per sender account. Keys are parsed per
    /// submission so a malformed entry only fails its own transfer.
    pub credentials: Vec<String>,
    /// Destination address. `None` transfers to the sender itself.
    pub to: Option<Address>,
    /// Memo template. May contain the `{{id}}` placeholder.
    pub memo: Option<String>,
    /// Addend on top of the queried gas price, in gwei.
    #[serde(default)]
    pub extra_fee_gwei: U256,
    /// Ledger endpoint override.
    pub endpoint: Option<Url>,
}

impl TransferRequest {
    /// The per-submission parameters shared by every credential in the batch.
    pub fn spec(&self) -> TransferSpec {
        TransferSpec {
            to: self.to,
            memo: self.memo.clone(),
            extra_fee_gwei: self.extra_fee_gwei,
        }
    }
}

/// Bulk transfer of items discovered through the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionTransferRequest {
    /// The underlying transfer parameters. Items are sent from the first
    /// credential's account.
    pub transfer: TransferRequest,
    /// Item identifier filter.
    pub tick: String,
    /// How many items to transfer. Must be greater than zero.
    pub count: u64,
}

/// Parameters of a single submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSpec {
    /// Destination address. `None` transfers to the sender itself.
    pub to: Option<Address>,
    /// Raw memo. May contain the `{{id}}` placeholder.
    pub memo: Option<String>,
    /// Addend on top of the queried gas price, in gwei.
    #[serde(default)]
    pub extra_fee_gwei: U256,
}

/// Settled state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// The endpoint accepted the transaction.
    Success,
    /// The submission failed before or at the endpoint.
    Failed,
}

/// Normalized result of one submission in one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Whether the submission was accepted.
    pub status: OutcomeStatus,
    /// Transaction hash on success, extracted failure reason otherwise.
    pub message: String,
    /// Running total of accepted submissions observed by the emitting runner.
    pub success_count: u64,
}

/// Position in a paginated item listing. Advances one page per round and
/// never resets mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u64,
    size: u64,
}

impl PageCursor {
    /// Cursor at the first page.
    pub fn first(size: u64) -> Self {
        Self { page: 1, size }
    }

    /// Moves the cursor to the next page.
    pub fn advance(&mut self) {
        self.page += 1;
    }

    /// The 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of items in one page.
    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Offset of the first item of the current page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.size
    }
}
