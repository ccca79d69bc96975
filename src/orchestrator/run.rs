//! Wiring the production chains from configuration.

use crate::bridge::{BridgeError, BridgeToken, WormholeBridge};
use crate::config::{AppConfig, Secrets};
use crate::ethereum::{EthereumClient, EthereumResult, Wallet};
use crate::lifecycle::Shutdown;
use crate::orchestrator::flow::{CrossChainStake, FlowError, FlowReport, FlowSettings};
use crate::orchestrator::status::{FlowStatus, StatusReporter};
use crate::polkadot::{PolkadotAccount, PolkadotClient};
use crate::resilience::RetryPolicy;

const ETH_DECIMALS: u8 = 18;

/// Open the relay chain connection with the configured retry policy.
pub async fn connect_polkadot(config: &AppConfig) -> Result<PolkadotClient, FlowError> {
    PolkadotClient::connect(&config.polkadot, RetryPolicy::from(&config.retries))
        .await
        .map_err(FlowError::Polkadot)
}

/// Derive the staking account from `DUST_STAKE_POLKADOT_MNEMONIC`.
pub fn load_account(secrets: &Secrets) -> Result<PolkadotAccount, FlowError> {
    let phrase = secrets
        .polkadot_mnemonic()
        .map_err(|e| FlowError::Config(e.to_string()))?;
    PolkadotAccount::from_secret(phrase).map_err(FlowError::Polkadot)
}

/// Ethereum read client plus a bridge signing with `DUST_STAKE_ETH_PRIVATE_KEY`.
pub async fn build_bridge(config: &AppConfig, secrets: &Secrets) -> Result<(EthereumClient, WormholeBridge), FlowError> {
    let key = secrets
        .eth_private_key()
        .map_err(|e| FlowError::Config(e.to_string()))?;
    let wallet = Wallet::from_private_key(key, config.ethereum.chain_id).map_err(BridgeError::from)?;
    let client = EthereumClient::new(config.ethereum.clone())
        .await
        .map_err(BridgeError::from)?;
    let bridge = WormholeBridge::new(client.clone(), wallet, config.bridge.clone())?;
    Ok((client, bridge))
}

/// Decimals of the bridged asset.
pub async fn token_decimals(client: &EthereumClient, token: BridgeToken) -> EthereumResult<u8> {
    match token {
        BridgeToken::Native => Ok(ETH_DECIMALS),
        BridgeToken::Erc20(address) => client.erc20_decimals(address).await,
    }
}

/// Connect both chains and run the full bridge-then-stake flow.
pub async fn run_from_config(
    config: &AppConfig,
    secrets: &Secrets,
    shutdown: &Shutdown,
    status: StatusReporter,
) -> Result<FlowReport, FlowError> {
    match prepare(config, secrets, &status).await {
        Ok((polkadot, bridge, account, settings)) => {
            CrossChainStake::new(polkadot, bridge, account, settings, status)
                .run(shutdown)
                .await
        }
        Err(e) => {
            status.set(FlowStatus::Failed { reason: e.to_string() });
            Err(e)
        }
    }
}

async fn prepare(
    config: &AppConfig,
    secrets: &Secrets,
    status: &StatusReporter,
) -> Result<(PolkadotClient, WormholeBridge, PolkadotAccount, FlowSettings), FlowError> {
    status.set(FlowStatus::Connecting);
    let polkadot = connect_polkadot(config).await?;

    let account = load_account(secrets)?;
    status.set(FlowStatus::AccountReady {
        address: account.address(),
    });

    let (ethereum, bridge) = build_bridge(config, secrets).await?;
    let token: BridgeToken = config.flow.token.parse()?;
    let decimals = token_decimals(&ethereum, token).await.map_err(BridgeError::from)?;
    let settings = FlowSettings::from_config(&config.flow, &config.polkadot, decimals)?;

    Ok((polkadot, bridge, account, settings))
}
