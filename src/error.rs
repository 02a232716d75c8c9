//! Dispatcher error types.
//!
//! Failures are tagged with a structured kind at the network boundary so
//! callers never have to sniff error object shapes. The reason string of an
//! endpoint rejection is still extracted from the JSON-RPC error payload in
//! the order of most specific field first.

use alloy::{rpc::json_rpc::ErrorPayload, transports::TransportError};
use serde_json::Value;

/// Errors that may occur while submitting one transfer.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The signing key could not be parsed.
    #[error("malformed signing key: {0}")]
    Credential(String),
    /// The endpoint rejected the submission or a preparatory call.
    #[error("rejected by endpoint: {reason}")]
    Rejected {
        /// Most specific reason string the endpoint reported.
        reason: String,
    },
    /// The request could not be turned into a signable transaction.
    #[error("malformed request: {0}")]
    Malformed(String),
    /// The endpoint could not be reached or did not answer in protocol.
    #[error(transparent)]
    Network(#[from] TransportError),
    /// Error occurred while signing the transaction.
    #[error(transparent)]
    Sign(#[from] alloy::signers::Error),
    /// Unique token generation gave up.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl SubmitError {
    /// Classifies a transport failure: an error response from the endpoint
    /// becomes [`SubmitError::Rejected`] with its extracted reason, anything
    /// else stays a network failure.
    pub fn from_transport(err: TransportError) -> Self {
        match err.rejection_reason() {
            Some(reason) => Self::Rejected { reason },
            None => Self::Network(err),
        }
    }

    /// The message carried by a failed outcome. Rejection reasons are
    /// reported verbatim, everything else through its display form.
    pub fn outcome_message(&self) -> String {
        match self {
            Self::Rejected { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors returned by the item listing endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The listing endpoint could not be reached.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The listing endpoint answered with an error payload.
    #[error("{0}")]
    Endpoint(String),
    /// The listing endpoint answered with neither rows nor errors.
    #[error("malformed listing response")]
    Malformed,
}

/// Errors from unique token generation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The existence check could not be completed.
    #[error("existence check failed: {0}")]
    Check(String),
    /// No unused token was found within the attempt budget.
    #[error("no unused token after {attempts} attempts")]
    Exhausted {
        /// Number of candidates drawn before giving up.
        attempts: u32,
    },
}

/// Errors from the dispatch loop controller.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// `start` was called while a loop was still running.
    #[error("a dispatch loop is already running")]
    AlreadyRunning,
}

/// Extension trait for [`TransportError`] rejection handling.
pub trait TransportErrExt {
    /// Best-effort reason string of a JSON-RPC error response, or `None` if
    /// the failure never produced one.
    fn rejection_reason(&self) -> Option<String>;
}

impl TransportErrExt for TransportError {
    fn rejection_reason(&self) -> Option<String> {
        self.as_error_resp().map(extract_reason)
    }
}

/// Extracts the most specific reason from a JSON-RPC error payload.
///
/// Endpoints report rejections under different shapes: a revert carries a
/// `reason` field in the error data, nested node errors a `data.message` or
/// `message` field, and everything else only the top-level message. Checked
/// in that order.
pub fn extract_reason(payload: &ErrorPayload) -> String {
    if let Some(data) = payload.data.as_ref() {
        if let Ok(value) = serde_json::from_str::<Value>(data.get()) {
            if let Some(reason) = value.get("reason").and_then(Value::as_str) {
                return reason.to_string();
            }
            if let Some(message) =
                value.get("data").and_then(|inner| inner.get("message")).and_then(Value::as_str)
            {
                return message.to_string();
            }
            if let Some(message) = value.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    payload.message.to_string()
}
