//! Relay chain client.
//!
//! # Responsibilities
//! - Hold one persistent websocket connection for the whole flow
//! - Read account balances and the validator set
//! - Sign and submit the staking batch
//!
//! Every node call is bounded by a timeout; connecting is retried.

use std::time::Duration;

use subxt::dynamic::Value;
use subxt::ext::scale_value::{self, At};
use subxt::utils::{AccountId32, H256};
use subxt::OnlineClient;

use crate::observability::metrics;
use crate::polkadot::account::PolkadotAccount;
use crate::polkadot::staking::stake_payload;
use crate::polkadot::types::{PolkadotConfig, PolkadotError, PolkadotResult, StakeReceipt};
use crate::resilience::{retry_with_backoff, with_timeout, RetryPolicy};

/// subxt client speaking the Polkadot transaction format.
pub type RelayApi = OnlineClient<subxt::PolkadotConfig>;

/// Storage key prefix: twox128(pallet) ++ twox128(entry).
const STORAGE_PREFIX_LEN: usize = 32;

/// Relay chain connection.
#[derive(Clone)]
pub struct PolkadotClient {
    api: RelayApi,
    config: PolkadotConfig,
    request_timeout: Duration,
}

impl PolkadotClient {
    /// Connect to the configured node.
    ///
    /// `ws://` endpoints go through subxt's insecure path (local nodes);
    /// anything else must be `wss://`.
    pub async fn connect(config: &PolkadotConfig, retry: RetryPolicy) -> PolkadotResult<Self> {
        let url = config.ws_url.clone();
        let insecure = url.starts_with("ws://");
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let api = retry_with_backoff(retry, "connect to polkadot", || {
            let url = url.clone();
            async move {
                let connecting = async {
                    if insecure {
                        RelayApi::from_insecure_url(&url).await
                    } else {
                        RelayApi::from_url(&url).await
                    }
                };
                match with_timeout(connect_timeout, "polkadot connect", connecting).await {
                    Ok(Ok(api)) => Ok(api),
                    Ok(Err(e)) => Err(PolkadotError::Connection(e.to_string())),
                    Err(e) => Err(PolkadotError::Timeout(e.to_string())),
                }
            }
        })
        .await
        .inspect_err(|_| metrics::record_chain_health("polkadot", false))?;

        let client = Self {
            api,
            config: config.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        };

        tracing::info!(
            ws_url = %config.ws_url,
            genesis_hash = ?client.api.genesis_hash(),
            spec_version = client.api.runtime_version().spec_version,
            "Connected to Polkadot network"
        );
        match client.timestamp_now().await {
            Ok(now) => tracing::info!(chain_timestamp_ms = now, "Chain clock"),
            Err(e) => tracing::warn!(error = %e, "Could not read chain timestamp"),
        }
        metrics::record_chain_health("polkadot", true);

        Ok(client)
    }

    /// `Timestamp::Now` in milliseconds.
    pub async fn timestamp_now(&self) -> PolkadotResult<u64> {
        let query = subxt::dynamic::storage("Timestamp", "Now", ());
        let fetched = with_timeout(self.request_timeout, "read timestamp", async {
            let storage = self.api.storage().at_latest().await?;
            storage.fetch(&query).await
        })
        .await
        .map_err(|e| PolkadotError::Timeout(e.to_string()))?
        .map_err(|e| PolkadotError::Storage(e.to_string()))?;

        let thunk = fetched.ok_or_else(|| PolkadotError::Decode("Timestamp::Now is empty".to_string()))?;
        let value = thunk.to_value().map_err(|e| PolkadotError::Decode(e.to_string()))?;
        value
            .as_u128()
            .map(|v| v as u64)
            .ok_or_else(|| PolkadotError::Decode("Timestamp::Now is not an integer".to_string()))
    }

    /// Free balance of `who` in planck. Accounts without storage hold 0.
    pub async fn free_balance(&self, who: &AccountId32) -> PolkadotResult<u128> {
        let query = subxt::dynamic::storage("System", "Account", vec![Value::from_bytes(who.0)]);
        let fetched = with_timeout(self.request_timeout, "read account", async {
            let storage = self.api.storage().at_latest().await?;
            storage.fetch(&query).await
        })
        .await
        .map_err(|e| PolkadotError::Timeout(e.to_string()))?
        .map_err(|e| PolkadotError::Storage(e.to_string()))?;

        let Some(thunk) = fetched else {
            tracing::debug!(account = %who, "No account storage, balance is zero");
            return Ok(0);
        };
        let value = thunk.to_value().map_err(|e| PolkadotError::Decode(e.to_string()))?;
        let free = free_from_account_info(&value)?;

        tracing::info!(
            account = %who,
            free = free,
            symbol = %self.config.token_symbol,
            "Free balance"
        );
        Ok(free)
    }

    /// Up to `limit` stash accounts from `Staking::Validators`.
    pub async fn active_validators(&self, limit: usize) -> PolkadotResult<Vec<AccountId32>> {
        let query = subxt::dynamic::storage("Staking", "Validators", ());
        let validators = with_timeout(self.request_timeout, "list validators", async {
            let storage = self.api.storage().at_latest().await?;
            let mut entries = storage.iter(query).await?;
            let mut found = Vec::new();
            while let Some(entry) = entries.next().await {
                if let Some(stash) = account_from_map_key(&entry?.key_bytes) {
                    found.push(stash);
                }
                if found.len() >= limit {
                    break;
                }
            }
            Ok::<_, subxt::Error>(found)
        })
        .await
        .map_err(|e| PolkadotError::Timeout(e.to_string()))?
        .map_err(|e| PolkadotError::Storage(e.to_string()))?;

        tracing::info!(count = validators.len(), limit, "Fetched active validators");
        Ok(validators)
    }

    /// Sign and submit `batch_all[bond, nominate]` from `account`.
    pub async fn bond_and_nominate(
        &self,
        account: &PolkadotAccount,
        amount: u128,
        validators: &[AccountId32],
    ) -> PolkadotResult<StakeReceipt> {
        if validators.is_empty() {
            return Err(PolkadotError::NoValidators);
        }

        let payload = stake_payload(amount, validators);
        tracing::info!(amount, count = validators.len(), "Submitting bond + nominate batch");

        let (extrinsic_hash, block_hash) = if self.config.wait_for_finalization {
            let timeout = Duration::from_secs(self.config.finalization_timeout_secs);
            with_timeout(timeout, "staking finalization", async {
                let in_block = self
                    .api
                    .tx()
                    .sign_and_submit_then_watch_default(&payload, account.keypair())
                    .await?
                    .wait_for_finalized()
                    .await?;
                let block_hash = in_block.block_hash();
                let events = in_block.wait_for_success().await?;
                Ok::<_, subxt::Error>((events.extrinsic_hash(), Some(block_hash)))
            })
            .await
            .map_err(|e| PolkadotError::Timeout(e.to_string()))?
            .map_err(|e| PolkadotError::Submission(e.to_string()))?
        } else {
            let hash = with_timeout(self.request_timeout, "staking submission", async {
                self.api
                    .tx()
                    .sign_and_submit_default(&payload, account.keypair())
                    .await
            })
            .await
            .map_err(|e| PolkadotError::Timeout(e.to_string()))?
            .map_err(|e| PolkadotError::Submission(e.to_string()))?;

            (hash, None)
        };

        let receipt = stake_receipt(extrinsic_hash, block_hash, validators, amount);
        tracing::info!(
            extrinsic_hash = %receipt.extrinsic_hash,
            block_hash = ?receipt.block_hash,
            "Staking transaction submitted"
        );
        Ok(receipt)
    }

    pub fn config(&self) -> &PolkadotConfig {
        &self.config
    }
}

impl std::fmt::Debug for PolkadotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolkadotClient")
            .field("ws_url", &self.config.ws_url)
            .field("request_timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

/// Receipt for a submitted batch; `block_hash` is set once finalized.
pub fn stake_receipt(
    extrinsic_hash: H256,
    block_hash: Option<H256>,
    validators: &[AccountId32],
    amount: u128,
) -> StakeReceipt {
    StakeReceipt {
        extrinsic_hash: format!("{:?}", extrinsic_hash),
        block_hash: block_hash.map(|h| format!("{:?}", h)),
        validators: validators.iter().map(|v| v.to_string()).collect(),
        amount,
    }
}

/// Extract `data.free` from a decoded `AccountInfo`.
pub fn free_from_account_info<T>(info: &scale_value::Value<T>) -> PolkadotResult<u128> {
    info.at("data")
        .at("free")
        .and_then(|free| free.as_u128())
        .ok_or_else(|| PolkadotError::Decode("AccountInfo has no data.free".to_string()))
}

/// Recover the stash id from a `Twox64Concat`-keyed storage map key.
///
/// Layout: 32-byte prefix, 8-byte hash, then the raw 32-byte account id.
pub fn account_from_map_key(key: &[u8]) -> Option<AccountId32> {
    if key.len() < STORAGE_PREFIX_LEN + 8 + 32 {
        return None;
    }
    let tail: [u8; 32] = key[key.len() - 32..].try_into().ok()?;
    Some(AccountId32(tail))
}
