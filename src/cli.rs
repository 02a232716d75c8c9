//! # Dispatcher CLI
//!
//! Thin front over the dispatcher core: parses run parameters, wires the
//! components and logs the outcome stream.
use crate::{
    batch::BatchRunner,
    config::DispatcherConfig,
    id::{EthscriptionsClient, TokenIssuer},
    inscriptions::EvmInkClient,
    loops::LoopController,
    submitter::TransferSubmitter,
    types::{InscriptionTransferRequest, OutcomeStatus, SubmissionOutcome, TransferRequest},
};
use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

/// The inscriber dispatcher submits batches of inscription transfers.
#[derive(Debug, Parser)]
#[command(author, about = "Inscriber", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be stored in the working directory
    /// under `inscriber.yaml`.
    #[arg(
        long,
        value_name = "CONFIG",
        env = "INSCRIBER_CONFIG",
        default_value = "inscriber.yaml"
    )]
    pub config: PathBuf,
    /// The RPC endpoint of the chain to send transactions to.
    ///
    /// Overrides the configuration file.
    #[arg(long, value_name = "RPC_ENDPOINT")]
    pub endpoint: Option<Url>,
    #[command(subcommand)]
    pub command: Command,
}

/// Dispatcher run modes.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Repeatedly submit one transfer per signing key on a fixed cadence.
    Transfer {
        /// A raw signing key. Repeat for multiple sender accounts.
        #[arg(long = "key", value_name = "SECRET_KEY", required = true)]
        keys: Vec<String>,
        /// Destination address. Defaults to each sender's own address.
        #[arg(long, value_name = "ADDRESS")]
        to: Option<Address>,
        /// Memo attached to every transfer. `{{id}}` is replaced with a
        /// collision-checked token.
        #[arg(long, value_name = "MEMO")]
        memo: Option<String>,
        /// Addend on top of the queried gas price, in gwei.
        #[arg(long = "extra-fee", value_name = "GWEI", default_value = "0")]
        extra_fee: U256,
        /// Delay between rounds.
        #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "10")]
        delay: Duration,
    },
    /// Transfer items discovered through the listing endpoint, once.
    Claim {
        /// The raw signing key owning the items.
        #[arg(long = "key", value_name = "SECRET_KEY", required = true)]
        keys: Vec<String>,
        /// Destination address. Defaults to the sender's own address.
        #[arg(long, value_name = "ADDRESS")]
        to: Option<Address>,
        /// Item identifier to claim.
        #[arg(long, value_name = "TICK")]
        tick: String,
        /// How many items to transfer.
        #[arg(long, value_name = "NUM", value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// Addend on top of the queried gas price, in gwei.
        #[arg(long = "extra-fee", value_name = "GWEI", default_value = "0")]
        extra_fee: U256,
    },
}

impl Args {
    /// Run the dispatcher.
    pub async fn run(self) -> eyre::Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();

        let mut config = DispatcherConfig::load_or_init(&self.config)?;
        if let Some(endpoint) = self.endpoint.clone() {
            config = config.with_endpoint(endpoint);
        }

        let tokens = TokenIssuer::new(
            EthscriptionsClient::new(config.exists_api.clone()),
            config.token_attempts,
            Duration::from_millis(config.token_backoff_ms),
        );
        let submitter = TransferSubmitter::connect(config.endpoint.clone(), tokens).await?;
        let runner = Arc::new(BatchRunner::new(submitter));
        info!(endpoint = %config.endpoint, "connected to ledger endpoint");

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<SubmissionOutcome>();
        let printer = tokio::spawn(async move {
            while let Some(outcome) = outcome_rx.recv().await {
                match outcome.status {
                    OutcomeStatus::Success => {
                        info!(total = outcome.success_count, tx = %outcome.message, "transfer accepted")
                    }
                    OutcomeStatus::Failed => {
                        warn!(total = outcome.success_count, reason = %outcome.message, "transfer failed")
                    }
                }
            }
        });

        match self.command {
            Command::Transfer { keys, to, memo, extra_fee, delay } => {
                let request = TransferRequest {
                    credentials: keys,
                    to,
                    memo,
                    extra_fee_gwei: extra_fee,
                    endpoint: self.endpoint,
                };

                let controller = LoopController::new();
                let handle = controller.start(delay, {
                    let runner = Arc::clone(&runner);
                    let sink = outcome_tx.clone();
                    move || {
                        let runner = Arc::clone(&runner);
                        let request = request.clone();
                        let sink = sink.clone();
                        async move { runner.run_round(&request, &sink).await }
                    }
                })?;
                info!(delay = ?delay, "transfer loop started, ctrl-c to stop");

                tokio::signal::ctrl_c().await?;
                info!("stop requested, letting the in-flight round settle");
                controller.stop();
                handle.await?;
            }
            Command::Claim { keys, to, tick, count, extra_fee } => {
                let request = InscriptionTransferRequest {
                    transfer: TransferRequest {
                        credentials: keys,
                        to,
                        memo: None,
                        extra_fee_gwei: extra_fee,
                        endpoint: self.endpoint,
                    },
                    tick,
                    count,
                };
                let source = EvmInkClient::new(config.items_api.clone(), config.network.clone());
                runner.run_claim(&request, &source, config.page_size, &outcome_tx).await;
            }
        }

        drop(outcome_tx);
        printer.await?;
        Ok(())
    }
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
