//! Sender credential handling.
//!
//! One credential is one raw secp256k1 signing key controlling one sender
//! account. Keys arrive as user input, so parsing tolerates surrounding
//! whitespace and an optional `0x` prefix.

use crate::{error::SubmitError, payload::trim_all};
use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use std::str::FromStr;

/// A parsed sender credential.
#[derive(Debug, Clone)]
pub struct SenderKey(PrivateKeySigner);

impl SenderKey {
    /// Parses a raw signing key. Whitespace anywhere in the input is
    /// stripped and the `0x` prefix is optional.
    pub fn parse(raw: &str) -> Result<Self, SubmitError> {
        let raw = trim_all(raw);
        PrivateKeySigner::from_str(&raw)
            .map(Self)
            .map_err(|err| SubmitError::Credential(err.to_string()))
    }

    /// The account controlled by this key.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Unwraps the underlying signer.
    pub fn into_signer(self) -> PrivateKeySigner {
        self.0
    }
}
