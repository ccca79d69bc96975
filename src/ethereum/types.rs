//! Chain-specific types and error definitions.

use thiserror::Error;

// Re-export EthereumConfig from config module to avoid duplication
pub use crate::config::schema::EthereumConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during Ethereum operations.
#[derive(Debug, Error)]
pub enum EthereumError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Contract call could not be built or sent.
    #[error("Contract call {call} failed: {reason}")]
    Contract { call: &'static str, reason: String },

    /// Transaction was mined but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(String),

    /// Receipt did not arrive or confirmations were not reached in time.
    #[error("Confirmation failed: {0}")]
    Confirmation(String),
}

/// Result type for Ethereum operations.
pub type EthereumResult<T> = Result<T, EthereumError>;
