//! Item listing for claim mode.
//!
//! Transferable inscriptions are discovered through a paginated GraphQL
//! endpoint. Each row's transaction hash doubles as the payload of the
//! transfer that claims it.

use crate::{error::SourceError, types::PageCursor};
use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// One transferable item as the listing endpoint reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct InscriptionRow {
    /// Inscribing transaction hash, used as the claim transfer's payload.
    pub trx_hash: String,
}

/// Paginated source of transferable items owned by an account.
#[async_trait]
pub trait InscriptionSource: Send + Sync {
    /// One page of items owned by `owner` matching `tick`, in listing order.
    async fn owned_page(
        &self,
        owner: Address,
        tick: &str,
        cursor: &PageCursor,
    ) -> Result<Vec<InscriptionRow>, SourceError>;
}

const USER_INSCRIPTIONS_QUERY: &str = "query GetUserInscriptions($limit: Int, $offset: Int, $order_by: [inscriptions_order_by!] = {}, $where: inscriptions_bool_exp = {}) {\n  inscriptions(limit: $limit, offset: $offset, order_by: $order_by, where: $where) {\n    trx_hash\n    position\n    content_uri\n    owner_address\n    confirmed\n  }\n}";

/// Listing client against the evm.ink GraphQL API.
#[derive(Debug, Clone)]
pub struct EvmInkClient {
    http: reqwest::Client,
    url: Url,
    network: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Option<Vec<QueryError>>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    inscriptions: Vec<InscriptionRow>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    message: String,
}

impl EvmInkClient {
    /// Creates a client against the given GraphQL endpoint, scoped to one
    /// network (e.g. `eip155:56`).
    pub fn new(url: Url, network: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), url, network: network.into() }
    }

    fn query_body(&self, owner: Address, tick: &str, cursor: &PageCursor) -> Value {
        let scope = json!({
            "owner_address": { "_eq": owner.to_string().to_lowercase() },
            "network_id": { "_eq": self.network },
            "brc20_command": { "is_valid": { "_eq": true } },
            "content_uri": { "_eq": tick },
        });
        json!({
            "query": USER_INSCRIPTIONS_QUERY,
            "variables": {
                "limit": cursor.limit(),
                "offset": cursor.offset(),
                "order_by": [{ "position": "desc" }],
                "where": scope,
            },
            "operationName": "GetUserInscriptions",
        })
    }
}

#[async_trait]
impl InscriptionSource for EvmInkClient {
    async fn owned_page(
        &self,
        owner: Address,
        tick: &str,
        cursor: &PageCursor,
    ) -> Result<Vec<InscriptionRow>, SourceError> {
        let response: QueryResponse = self
            .http
            .post(self.url.clone())
            .json(&self.query_body(owner, tick, cursor))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(mut errors) = response.errors.filter(|errors| !errors.is_empty()) {
            return Err(SourceError::Endpoint(errors.remove(0).message));
        }
        Ok(response.data.ok_or(SourceError::Malformed)?.inscriptions)
    }
}
