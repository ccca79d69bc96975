//! Signing, gas guarding and confirmation monitoring.
//!
//! # Responsibilities
//! - Build a provider that signs with the configured wallet
//! - Refuse to send while gas prices spike
//! - Wait for receipts and the configured confirmation depth

use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::TxHash;
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;

use crate::ethereum::client::EthereumClient;
use crate::ethereum::types::{EthereumConfig, EthereumError, EthereumResult};
use crate::ethereum::wallet::Wallet;

/// Provider that fills nonce, gas and chain id and signs with `wallet`.
pub fn signing_provider(config: &EthereumConfig, wallet: &Wallet) -> EthereumResult<DynProvider> {
    let url: url::Url = config.rpc_url.parse().map_err(|e| {
        EthereumError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
    })?;

    Ok(ProviderBuilder::new()
        .wallet(wallet.to_network_wallet())
        .connect_http(url)
        .erased())
}

/// Fail when the current gas price exceeds the configured ceiling.
pub async fn check_gas_price(client: &EthereumClient) -> EthereumResult<u128> {
    let gas_price = client.get_gas_price().await?;
    let gas_price_gwei = gas_price / 1_000_000_000;
    let max_gwei = client.config().max_gas_price_gwei;

    if gas_price_gwei > max_gwei as u128 {
        return Err(EthereumError::GasPriceTooHigh {
            current_gwei: gas_price_gwei as u64,
            max_gwei,
        });
    }

    tracing::debug!(gas_price_gwei = gas_price_gwei as u64, max_gwei, "Gas price acceptable");
    Ok(gas_price)
}

/// Wait for a sent transaction to be mined with enough confirmations.
///
/// A reverted receipt is reported as [`EthereumError::Reverted`].
pub async fn await_receipt(
    pending: PendingTransactionBuilder<Ethereum>,
    config: &EthereumConfig,
) -> EthereumResult<TransactionReceipt> {
    let tx_hash: TxHash = *pending.tx_hash();
    tracing::info!(tx_hash = %tx_hash, confirmations = config.confirmation_blocks, "Waiting for receipt");

    let receipt = pending
        .with_required_confirmations(config.confirmation_blocks.max(1))
        .with_timeout(Some(Duration::from_secs(config.confirmation_timeout_secs)))
        .get_receipt()
        .await
        .map_err(|e| EthereumError::Confirmation(format!("{}: {}", tx_hash, e)))?;

    if !receipt.status() {
        return Err(EthereumError::Reverted(tx_hash.to_string()));
    }

    tracing::info!(
        tx_hash = %tx_hash,
        block_number = receipt.block_number.unwrap_or_default(),
        gas_used = receipt.gas_used,
        "Transaction confirmed"
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signing_provider_rejects_bad_url() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let config = EthereumConfig {
            rpc_url: "nope".to_string(),
            ..EthereumConfig::default()
        };
        assert!(signing_provider(&config, &wallet).is_err());
    }

    #[test]
    fn test_signing_provider_builds() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let provider = signing_provider(&EthereumConfig::default(), &wallet);
        assert!(provider.is_ok());
    }

    #[tokio::test]
    async fn test_gas_check_propagates_rpc_failure() {
        let config = EthereumConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 2,
            ..EthereumConfig::default()
        };
        let client = EthereumClient::new(config).await.unwrap();
        assert!(matches!(check_gas_price(&client).await, Err(EthereumError::Rpc(_))));
    }
}
