//! # Inscriber
//!
//! Library for the implementation of the inscription batch dispatcher.

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fees;
pub mod id;
pub mod inscriptions;
pub mod loops;
pub mod payload;
pub mod signer;
pub mod submitter;
pub mod types;
