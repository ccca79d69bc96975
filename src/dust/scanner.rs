//! Balance discovery on the Ethereum account.

use alloy::primitives::{Address, U256};
use futures_util::future::join_all;

use crate::bridge::BridgeToken;
use crate::config::DustConfig;
use crate::dust::types::{classify_native, classify_token, DustResult, TokenHolding, TokenSpec};
use crate::ethereum::{EthereumClient, EthereumResult};
use crate::units::{format_amount, to_f64};

const ETH_DECIMALS: u8 = 18;

/// Reads native and watched ERC-20 balances and classifies them.
pub struct DustScanner {
    client: EthereumClient,
    tokens: Vec<TokenSpec>,
    config: DustConfig,
}

impl DustScanner {
    pub fn new(client: EthereumClient, config: &DustConfig) -> DustResult<Self> {
        let tokens = config
            .tokens
            .iter()
            .map(TokenSpec::try_from)
            .collect::<DustResult<Vec<_>>>()?;

        Ok(Self {
            client,
            tokens,
            config: config.clone(),
        })
    }

    /// Native balance first, then every watched token holding a balance.
    ///
    /// A token whose contract cannot be read is logged and skipped; only a
    /// failing native balance read fails the scan.
    pub async fn scan(&self, owner: Address) -> DustResult<Vec<TokenHolding>> {
        let native = self.client.get_balance(owner).await?;
        let mut holdings = vec![native_holding(native, &self.config)];

        let reads = self.tokens.iter().map(|spec| self.read_token(spec, owner));
        for (spec, result) in self.tokens.iter().zip(join_all(reads).await) {
            match result {
                Ok((raw, decimals)) => {
                    if let Some(holding) = token_holding(spec, raw, decimals, self.config.usd_threshold) {
                        holdings.push(holding);
                    }
                }
                Err(e) => {
                    tracing::warn!(token = %spec.symbol, address = %spec.address, error = %e, "Skipping token");
                }
            }
        }

        let dust = holdings.iter().filter(|h| h.is_dust).count();
        tracing::info!(owner = %owner, holdings = holdings.len(), dust, "Scan complete");
        Ok(holdings)
    }

    async fn read_token(&self, spec: &TokenSpec, owner: Address) -> EthereumResult<(U256, u8)> {
        let raw = self.client.erc20_balance(spec.address, owner).await?;
        if raw.is_zero() {
            return Ok((raw, 0));
        }
        let decimals = self.client.erc20_decimals(spec.address).await?;
        Ok((raw, decimals))
    }
}

/// Holding for the account's ETH balance.
pub fn native_holding(raw: U256, config: &DustConfig) -> TokenHolding {
    let balance = to_f64(raw, ETH_DECIMALS);
    let class = classify_native(balance, config.eth_price_usd, config.native_threshold_eth);
    tracing::debug!(balance = %format_amount(raw, ETH_DECIMALS), is_dust = class.is_dust, "ETH balance");

    TokenHolding {
        symbol: "ETH".to_string(),
        token: BridgeToken::Native,
        raw_balance: raw,
        decimals: ETH_DECIMALS,
        balance,
        usd_value: class.usd_value,
        is_dust: class.is_dust,
    }
}

/// Holding for an ERC-20 balance; `None` when the balance is zero.
pub fn token_holding(spec: &TokenSpec, raw: U256, decimals: u8, usd_threshold: f64) -> Option<TokenHolding> {
    if raw.is_zero() {
        return None;
    }
    let balance = to_f64(raw, decimals);
    let class = classify_token(balance, spec.price_usd, usd_threshold);

    Some(TokenHolding {
        symbol: spec.symbol.clone(),
        token: BridgeToken::Erc20(spec.address),
        raw_balance: raw,
        decimals,
        balance,
        usd_value: class.usd_value,
        is_dust: class.is_dust,
    })
}
