//! # Inscriber
//!
//! A batch transaction dispatcher for EVM inscription transfers.
use clap::Parser;
use inscriber::cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = args.run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
