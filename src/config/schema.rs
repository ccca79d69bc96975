//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.
//! Secrets (private key, mnemonic) are never part of the file; see
//! [`crate::config::Secrets`].

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Ethereum JSON-RPC settings.
    pub ethereum: EthereumConfig,

    /// Polkadot node settings.
    pub polkadot: PolkadotConfig,

    /// Token bridge contract settings.
    pub bridge: BridgeConfig,

    /// Cross-chain flow parameters.
    pub flow: FlowConfig,

    /// Dust discovery settings.
    pub dust: DustConfig,

    /// Retry configuration for connection setup.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ethereum integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EthereumConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (read calls only).
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u64,

    /// Maximum time to wait for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Gas limit used for bridge calls.
    pub gas_limit: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 600,
            gas_limit: 500_000,
            max_gas_price_gwei: 500,
        }
    }
}

/// Polkadot node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolkadotConfig {
    /// Websocket endpoint (`wss://` or, for local nodes, `ws://`).
    pub ws_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Storage query timeout in seconds.
    pub request_timeout_secs: u64,

    /// Decimals of the native token (10 for DOT, 12 for WND).
    pub token_decimals: u8,

    /// Symbol of the native token, for display.
    pub token_symbol: String,

    /// Wait for the staking batch to be finalized before reporting.
    pub wait_for_finalization: bool,

    /// Maximum time to wait for finalization, in seconds.
    pub finalization_timeout_secs: u64,
}

impl Default for PolkadotConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://westend-rpc.polkadot.io".to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: 30,
            token_decimals: 10,
            token_symbol: "DOT".to_string(),
            wait_for_finalization: true,
            finalization_timeout_secs: 300,
        }
    }
}

/// Wormhole token bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Token bridge contract address on Ethereum.
    pub contract_address: String,

    /// Wormhole chain id of the destination.
    pub recipient_chain: u16,

    /// Relayer (arbiter) fee, in token base units.
    pub arbiter_fee: u64,

    /// ETH sent along with ERC-20 transfers to pay the message fee, in wei.
    pub relayer_fee_wei: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            contract_address: "0x3ee18B2214AFF97000D974cf647E7C347E8fa585".to_string(),
            recipient_chain: 22,
            arbiter_fee: 0,
            relayer_fee_wei: 1_000_000_000_000_000, // 0.001 ETH
        }
    }
}

/// Cross-chain flow parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// `"ETH"` or an ERC-20 contract address.
    pub token: String,

    /// Amount to bridge, in token units (e.g. "0.1").
    pub amount: String,

    /// Amount to stake, in DOT units. Defaults to whatever arrived.
    pub stake_amount: Option<String>,

    /// Validator stash addresses (SS58). Empty means "pick active ones".
    pub validators: Vec<String>,

    /// How many active validators to nominate when none are configured.
    pub max_validators: usize,

    /// Delay before the first arrival check, in seconds.
    pub arrival_initial_delay_secs: u64,

    /// Interval between arrival checks, in seconds.
    pub arrival_poll_interval_secs: u64,

    /// Give up waiting for bridged funds after this many seconds.
    pub arrival_timeout_secs: u64,

    /// Consecutive balance query failures tolerated while polling.
    pub max_consecutive_poll_failures: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            token: "ETH".to_string(),
            amount: "0.1".to_string(),
            stake_amount: None,
            validators: Vec::new(),
            max_validators: 5,
            arrival_initial_delay_secs: 60,
            arrival_poll_interval_secs: 30,
            arrival_timeout_secs: 3600,
            max_consecutive_poll_failures: 5,
        }
    }
}

/// A token watched by the dust scanner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Display symbol.
    pub symbol: String,

    /// ERC-20 contract address.
    pub address: String,

    /// Static USD price used for dust classification.
    pub price_usd: f64,
}

/// Dust discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DustConfig {
    /// Native balances below this many ETH are dust.
    pub native_threshold_eth: f64,

    /// ERC-20 holdings worth less than this many USD are dust.
    pub usd_threshold: f64,

    /// Static ETH price in USD.
    pub eth_price_usd: f64,

    /// Static DOT price in USD, for aggregation estimates.
    pub dot_price_usd: f64,

    /// Watched ERC-20 tokens.
    pub tokens: Vec<TokenConfig>,
}

impl Default for DustConfig {
    fn default() -> Self {
        let token = |symbol: &str, address: &str, price_usd: f64| TokenConfig {
            symbol: symbol.to_string(),
            address: address.to_string(),
            price_usd,
        };

        Self {
            native_threshold_eth: 0.01,
            usd_threshold: 10.0,
            eth_price_usd: 2120.0,
            dot_price_usd: 7.5,
            tokens: vec![
                token("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 1.0),
                token("LINK", "0x514910771AF9Ca656af840dff83E8264EcF986CA", 7.40),
                token("UNI", "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", 6.50),
                token("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 1.0),
                token("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7", 1.0),
            ],
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
