//! Single-transfer submission.
//!
//! One invocation performs exactly one transfer for one credential: derive
//! the account, resolve payload and fees, pick the pending-inclusive nonce,
//! sign a legacy transaction and hand it to the endpoint. Submission is
//! fire-and-wait-for-acceptance; confirmation is not polled.

use crate::{
    error::SubmitError,
    fees::resolve_fees,
    id::UniqueTokenSource,
    payload::resolve_memo,
    signer::SenderKey,
    types::TransferSpec,
};
use alloy::{
    consensus::{TxLegacy, TypedTransaction},
    eips::Encodable2718,
    network::{Ethereum, EthereumWallet, NetworkWallet},
    primitives::{B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Performs one transfer for one credential.
#[async_trait]
pub trait TransferSender: Send + Sync {
    /// Submits one transfer, returning the assigned transaction hash.
    async fn send_transfer(
        &self,
        credential: &str,
        spec: &TransferSpec,
    ) -> Result<B256, SubmitError>;
}

/// Submitter against a live ledger endpoint.
///
/// The provider handle is shared by all concurrent submissions; everything
/// else is derived per invocation.
#[derive(Debug)]
pub struct TransferSubmitter<T> {
    provider: DynProvider,
    chain_id: u64,
    tokens: T,
}

impl<T> TransferSubmitter<T> {
    /// Connects to the given endpoint and caches its chain id.
    pub async fn connect(endpoint: Url, tokens: T) -> Result<Self, SubmitError> {
        let provider = ProviderBuilder::new().connect_http(endpoint).erased();
        let chain_id = provider.get_chain_id().await.map_err(SubmitError::from_transport)?;
        Ok(Self { provider, chain_id, tokens })
    }

    /// Creates a submitter over an existing provider.
    pub fn new(provider: DynProvider, chain_id: u64, tokens: T) -> Self {
        Self { provider, chain_id, tokens }
    }
}

#[async_trait]
impl<T: UniqueTokenSource> TransferSender for TransferSubmitter<T> {
    async fn send_transfer(
        &self,
        credential: &str,
        spec: &TransferSpec,
    ) -> Result<B256, SubmitError> {
        let key = SenderKey::parse(credential)?;
        let from = key.address();
        let to = spec.to.unwrap_or(from);

        let input = resolve_memo(spec.memo.as_deref(), &self.tokens).await?;
        let fees = resolve_fees(&self.provider, from, to, &input, spec.extra_fee_gwei).await?;
        let nonce = self
            .provider
            .get_transaction_count(from)
            .pending()
            .await
            .map_err(SubmitError::from_transport)?;

        let tx = TypedTransaction::Legacy(TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price: fees.gas_price,
            gas_limit: fees.gas_limit,
            to: to.into(),
            value: U256::ZERO,
            input,
        });

        let wallet = EthereumWallet::new(key.into_signer());
        let signed = NetworkWallet::<Ethereum>::sign_transaction_from(&wallet, from, tx).await?;

        self.provider
            .send_raw_transaction(&signed.encoded_2718())
            .await
            .map_err(SubmitError::from_transport)?;

        let hash = *signed.tx_hash();
        debug!(%from, %to, nonce, gas_limit = fees.gas_limit, %hash, "transfer submitted");
        Ok(hash)
    }
}
