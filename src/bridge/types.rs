//! Bridge request/receipt types and errors.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use subxt::utils::AccountId32;
use thiserror::Error;

use crate::ethereum::EthereumError;

/// Asset leaving Ethereum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "address")]
pub enum BridgeToken {
    /// Native ETH, wrapped by the bridge.
    Native,
    /// An ERC-20 token contract.
    Erc20(Address),
}

impl BridgeToken {
    pub fn is_native(&self) -> bool {
        matches!(self, BridgeToken::Native)
    }
}

impl FromStr for BridgeToken {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ETH") {
            return Ok(BridgeToken::Native);
        }
        Address::from_str(s.trim())
            .map(BridgeToken::Erc20)
            .map_err(|_| BridgeError::InvalidToken(s.to_string()))
    }
}

impl fmt::Display for BridgeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeToken::Native => write!(f, "ETH"),
            BridgeToken::Erc20(address) => write!(f, "{}", address),
        }
    }
}

/// A transfer to a Polkadot account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    pub token: BridgeToken,
    /// Amount in the token's base units.
    pub amount: U256,
    pub recipient: AccountId32,
}

/// A confirmed bridge transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// Set when an ERC-20 approval had to be sent first.
    pub approve_tx_hash: Option<TxHash>,
}

/// Errors produced while bridging.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Ethereum(#[from] EthereumError),

    #[error("Insufficient ETH: balance {balance} wei, needs {required} wei")]
    InsufficientFunds { balance: U256, required: U256 },

    #[error("Invalid bridge token '{0}'")]
    InvalidToken(String),

    #[error("Invalid bridge amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid bridge contract address '{0}'")]
    InvalidContract(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
