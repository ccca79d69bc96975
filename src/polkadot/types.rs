//! Relay chain error and result types.

use serde::Serialize;
use thiserror::Error;

pub use crate::config::schema::PolkadotConfig;

/// Errors that can occur while talking to a Polkadot node.
#[derive(Debug, Error)]
pub enum PolkadotError {
    /// Websocket connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A node call did not finish in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Mnemonic or secret URI could not be turned into a keypair.
    #[error("Account error: {0}")]
    Account(String),

    /// Storage query failed.
    #[error("Storage query failed: {0}")]
    Storage(String),

    /// Storage value did not have the expected shape.
    #[error("Unexpected storage layout: {0}")]
    Decode(String),

    /// Extrinsic was rejected or failed on chain.
    #[error("Extrinsic submission failed: {0}")]
    Submission(String),

    /// Nothing to nominate.
    #[error("No validators available for nomination")]
    NoValidators,
}

/// Result type for relay chain operations.
pub type PolkadotResult<T> = Result<T, PolkadotError>;

/// Outcome of a bond + nominate submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeReceipt {
    /// Hash of the batch extrinsic.
    pub extrinsic_hash: String,
    /// Block the batch was finalized in, when finalization was awaited.
    pub block_hash: Option<String>,
    /// Nominated validator stashes (SS58).
    pub validators: Vec<String>,
    /// Bonded amount in planck.
    pub amount: u128,
}
