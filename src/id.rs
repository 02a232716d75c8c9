//! Unique payload token generation.
//!
//! Memos carrying the `{{id}}` placeholder need a token nobody has inscribed
//! yet. Candidates are six-digit decimal numbers; a candidate is accepted
//! once the existence endpoint reports its SHA-256 digest as unseen.
//! Collisions and transport failures both retry with a fresh candidate,
//! within a bounded attempt budget.

use crate::error::TokenError;
use alloy::primitives::hex;
use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Source of payload tokens that are unused at the time of issuance.
#[async_trait]
pub trait UniqueTokenSource: Send + Sync {
    /// Returns a token the existence check reported as unseen.
    async fn issue(&self) -> Result<String, TokenError>;
}

/// Queries whether a record with the given digest already exists.
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// `true` if the digest is already recorded.
    async fn exists(&self, digest: &str) -> Result<bool, TokenError>;
}

/// Lowercase hex SHA-256 digest of a token, as the existence endpoint
/// expects it.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues collision-checked six-digit tokens.
#[derive(Debug)]
pub struct TokenIssuer<C> {
    checker: C,
    max_attempts: u32,
    backoff: Duration,
}

impl<C> TokenIssuer<C> {
    /// Creates an issuer with the given attempt budget and inter-attempt
    /// backoff.
    pub fn new(checker: C, max_attempts: u32, backoff: Duration) -> Self {
        Self { checker, max_attempts, backoff }
    }
}

#[async_trait]
impl<C: ExistenceCheck> UniqueTokenSource for TokenIssuer<C> {
    async fn issue(&self) -> Result<String, TokenError> {
        for attempt in 1..=self.max_attempts {
            let candidate = rand::thread_rng().gen_range(100_000u32..1_000_000).to_string();
            match self.checker.exists(&token_digest(&candidate)).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => debug!(attempt, "token already inscribed, redrawing"),
                Err(err) => debug!(attempt, %err, "existence check failed, redrawing"),
            }
            if attempt < self.max_attempts && !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }
        Err(TokenError::Exhausted { attempts: self.max_attempts })
    }
}

/// Existence check against the ethscriptions API.
#[derive(Debug, Clone)]
pub struct EthscriptionsClient {
    http: reqwest::Client,
    base: Url,
}

#[derive(Debug, serde::Deserialize)]
struct ExistsResponse {
    result: bool,
}

impl EthscriptionsClient {
    /// Creates a client against the given existence-check base URL.
    pub fn new(base: Url) -> Self {
        Self { http: reqwest::Client::new(), base }
    }
}

#[async_trait]
impl ExistenceCheck for EthscriptionsClient {
    async fn exists(&self, digest: &str) -> Result<bool, TokenError> {
        let url = format!("{}/{digest}", self.base.as_str().trim_end_matches('/'));
        let response: ExistsResponse = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| TokenError::Check(err.to_string()))?
            .json()
            .await
            .map_err(|err| TokenError::Check(err.to_string()))?;
        Ok(response.result)
    }
}
