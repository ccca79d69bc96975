//! Dust holdings, classification rules and errors.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::Serialize;
use thiserror::Error;

use crate::bridge::BridgeToken;
use crate::config::TokenConfig;
use crate::ethereum::EthereumError;

/// Errors produced by dust discovery and selection.
#[derive(Debug, Error)]
pub enum DustError {
    #[error(transparent)]
    Ethereum(#[from] EthereumError),

    #[error("Invalid address '{address}' for token {symbol}")]
    InvalidToken { symbol: String, address: String },

    #[error("Unknown token '{0}'")]
    UnknownToken(String),

    #[error("No tokens selected for aggregation")]
    NothingSelected,
}

pub type DustResult<T> = Result<T, DustError>;

/// A watched ERC-20 token with its static price.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpec {
    pub symbol: String,
    pub address: Address,
    pub price_usd: f64,
}

impl TryFrom<&TokenConfig> for TokenSpec {
    type Error = DustError;

    fn try_from(config: &TokenConfig) -> Result<Self, Self::Error> {
        let address = Address::from_str(&config.address).map_err(|_| DustError::InvalidToken {
            symbol: config.symbol.clone(),
            address: config.address.clone(),
        })?;
        Ok(Self {
            symbol: config.symbol.clone(),
            address,
            price_usd: config.price_usd,
        })
    }
}

/// A balance found on the scanned account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolding {
    pub symbol: String,
    pub token: BridgeToken,
    /// Balance in base units.
    pub raw_balance: U256,
    pub decimals: u8,
    /// Balance in whole tokens (lossy).
    pub balance: f64,
    pub usd_value: f64,
    pub is_dust: bool,
}

/// USD value and dust verdict for a holding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub usd_value: f64,
    pub is_dust: bool,
}

/// ETH is dust below `native_threshold` ETH, whatever it is worth.
pub fn classify_native(balance: f64, eth_price_usd: f64, native_threshold: f64) -> Classification {
    Classification {
        usd_value: balance * eth_price_usd,
        is_dust: balance < native_threshold,
    }
}

/// ERC-20 tokens are dust when worth less than `usd_threshold`.
pub fn classify_token(balance: f64, price_usd: f64, usd_threshold: f64) -> Classification {
    let usd_value = balance * price_usd;
    Classification {
        usd_value,
        is_dust: usd_value < usd_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_threshold_ignores_price() {
        let small = classify_native(0.0012, 2120.0, 0.01);
        assert!(small.is_dust);
        assert!((small.usd_value - 2.544).abs() < 1e-9);

        assert!(!classify_native(0.01, 2120.0, 0.01).is_dust);
        assert!(!classify_native(0.5, 2120.0, 0.01).is_dust);
    }

    #[test]
    fn test_token_threshold_is_usd() {
        assert!(classify_token(1.2, 7.40, 10.0).is_dust);
        assert!(!classify_token(2.0, 7.40, 10.0).is_dust);
        // Exactly at the threshold is not dust.
        assert!(!classify_token(10.0, 1.0, 10.0).is_dust);
    }

    #[test]
    fn test_token_spec_from_config() {
        let spec = TokenSpec::try_from(&TokenConfig {
            symbol: "LINK".to_string(),
            address: "0x514910771AF9Ca656af840dff83E8264EcF986CA".to_string(),
            price_usd: 7.40,
        })
        .unwrap();
        assert_eq!(spec.symbol, "LINK");

        let bad = TokenSpec::try_from(&TokenConfig {
            symbol: "BAD".to_string(),
            address: "nope".to_string(),
            price_usd: 1.0,
        });
        assert!(matches!(bad, Err(DustError::InvalidToken { .. })));
    }
}
