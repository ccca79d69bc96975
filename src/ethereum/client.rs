//! Ethereum RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (chain id, block number, balances, gas price)
//! - Read ERC-20 balances and metadata
//! - Handle timeouts and network errors gracefully

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::ethereum::contracts::IERC20;
use crate::ethereum::types::{ChainId, EthereumConfig, EthereumError, EthereumResult};
use crate::observability::metrics;

/// Read-only Ethereum client with failover support.
#[derive(Clone)]
pub struct EthereumClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: EthereumConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl EthereumClient {
    /// Create a new client.
    ///
    /// Fails only if the primary URL is malformed; an unreachable node is
    /// reported by the first query instead.
    pub async fn new(config: EthereumConfig) -> EthereumResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            EthereumError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(ProviderBuilder::new().connect_http(primary_url).erased());

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(ProviderBuilder::new().connect_http(url).erased()),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Ethereum client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Ethereum client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Run `op` against each provider in turn until one answers in time.
    async fn with_failover<T, F, Fut>(&self, what: &str, op: F) -> EthereumResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, operation = what, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, operation = what, "RPC timeout, trying next provider");
                }
            }
        }
        metrics::record_rpc_failure("ethereum", what);
        Err(EthereumError::Rpc(format!("All RPC providers failed to {}", what)))
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> EthereumResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(EthereumError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> EthereumResult<ChainId> {
        self.with_failover("get chain id", |p| async move {
            p.get_chain_id().await.map(ChainId).map_err(|e| e.to_string())
        })
        .await
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> EthereumResult<u64> {
        self.with_failover("get block number", |p| async move {
            p.get_block_number().await.map_err(|e| e.to_string())
        })
        .await
    }

    /// Get the native balance of an address, in wei.
    pub async fn get_balance(&self, address: Address) -> EthereumResult<U256> {
        self.with_failover("get balance", |p| async move {
            p.get_balance(address).await.map_err(|e| e.to_string())
        })
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> EthereumResult<u128> {
        self.with_failover("get gas price", |p| async move {
            p.get_gas_price().await.map_err(|e| e.to_string())
        })
        .await
    }

    /// ERC-20 `balanceOf`.
    pub async fn erc20_balance(&self, token: Address, owner: Address) -> EthereumResult<U256> {
        self.with_failover("read token balance", |p| async move {
            IERC20::new(token, p).balanceOf(owner).call().await.map_err(|e| e.to_string())
        })
        .await
    }

    /// ERC-20 `decimals`.
    pub async fn erc20_decimals(&self, token: Address) -> EthereumResult<u8> {
        self.with_failover("read token decimals", |p| async move {
            IERC20::new(token, p).decimals().call().await.map_err(|e| e.to_string())
        })
        .await
    }

    /// ERC-20 `symbol`.
    pub async fn erc20_symbol(&self, token: Address) -> EthereumResult<String> {
        self.with_failover("read token symbol", |p| async move {
            IERC20::new(token, p).symbol().call().await.map_err(|e| e.to_string())
        })
        .await
    }

    /// ERC-20 `allowance`.
    pub async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> EthereumResult<U256> {
        self.with_failover("read token allowance", |p| async move {
            IERC20::new(token, p)
                .allowance(owner, spender)
                .call()
                .await
                .map_err(|e| e.to_string())
        })
        .await
    }

    /// Check if the node is reachable and healthy.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_chain_health("ethereum", healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &EthereumConfig {
        &self.config
    }
}

impl std::fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
