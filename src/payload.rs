//! Memo resolution and inscription payload formats.
//!
//! A memo is either human-authored text, which is carried as its UTF-8
//! bytes, or a raw `0x` hex payload, which passes through unchanged. The
//! `{{id}}` placeholder is substituted with a collision-checked token before
//! encoding.

use crate::{
    constants::ID_PLACEHOLDER,
    error::SubmitError,
    id::UniqueTokenSource,
};
use alloy::primitives::{Bytes, hex};
use serde::Serialize;

/// Removes all whitespace, including interior whitespace.
pub fn trim_all(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Resolves a raw memo into calldata.
///
/// Whitespace is stripped, an absent or empty memo yields empty calldata,
/// and a `{{id}}` placeholder is substituted before encoding.
pub async fn resolve_memo(
    memo: Option<&str>,
    tokens: &impl UniqueTokenSource,
) -> Result<Bytes, SubmitError> {
    let memo = trim_all(memo.unwrap_or_default());
    if memo.is_empty() {
        return Ok(Bytes::new());
    }
    let memo = if memo.contains(ID_PLACEHOLDER) {
        memo.replace(ID_PLACEHOLDER, &tokens.issue().await?)
    } else {
        memo
    };
    encode_memo(&memo)
}

/// Encodes a resolved memo: `0x` input is parsed as hex, anything else is
/// carried as its UTF-8 bytes.
pub fn encode_memo(memo: &str) -> Result<Bytes, SubmitError> {
    if let Some(raw) = memo.strip_prefix("0x") {
        hex::decode(raw)
            .map(Bytes::from)
            .map_err(|err| SubmitError::Malformed(format!("memo is not valid hex: {err}")))
    } else {
        Ok(Bytes::from(memo.as_bytes().to_vec()))
    }
}

/// A mint operation in the inscription wire format. Field order is part of
/// the format.
#[derive(Debug, Clone, Serialize)]
pub struct MintInscription<'a> {
    /// Protocol identifier.
    pub p: &'a str,
    /// Operation, always `mint` here.
    pub op: &'a str,
    /// Token identifier.
    pub tick: &'a str,
    /// Amount minted per operation.
    pub amt: &'a str,
}

impl<'a> MintInscription<'a> {
    /// A mint operation for the given protocol, tick and amount.
    pub fn new(protocol: &'a str, tick: &'a str, amount: &'a str) -> Self {
        Self { p: protocol, op: "mint", tick, amt: amount }
    }

    /// The `data:,{json}` textual payload.
    pub fn payload(&self) -> String {
        // Serializing a struct with string fields cannot fail.
        format!("data:,{}", serde_json::to_string(self).expect("mint payload is serializable"))
    }

    /// The payload as `0x` hex calldata text.
    pub fn payload_hex(&self) -> String {
        format!("0x{}", hex::encode(self.payload()))
    }

    /// The payload in the `\x` hex form some indexers store.
    pub fn payload_indexer_hex(&self) -> String {
        format!("\\x{}", hex::encode(self.payload()))
    }
}

/// Decodes a `0x` or `\x` hex inscription payload back to its JSON body,
/// stripping the `data:,` prefix.
pub fn decode_mint_payload(payload: &str) -> Result<String, SubmitError> {
    let raw = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("\\x"))
        .unwrap_or(payload);
    let bytes = hex::decode(raw)
        .map_err(|err| SubmitError::Malformed(format!("payload is not valid hex: {err}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| SubmitError::Malformed("payload is not valid UTF-8".into()))?;
    Ok(text.strip_prefix("data:,").unwrap_or(&text).to_string())
}
