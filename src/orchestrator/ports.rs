//! Chain access seams used by the flow.
//!
//! The production implementations delegate to [`PolkadotClient`] and
//! [`WormholeBridge`]; tests substitute in-memory chains.

use async_trait::async_trait;
use subxt::utils::AccountId32;

use crate::bridge::{BridgeReceipt, BridgeRequest, BridgeResult, WormholeBridge};
use crate::polkadot::{PolkadotAccount, PolkadotClient, PolkadotResult, StakeReceipt};

/// The chain funds arrive on and get staked.
#[async_trait]
pub trait StakingChain: Send + Sync {
    /// Free balance in planck.
    async fn free_balance(&self, who: &AccountId32) -> PolkadotResult<u128>;

    /// Up to `limit` validator stashes open for nomination.
    async fn active_validators(&self, limit: usize) -> PolkadotResult<Vec<AccountId32>>;

    /// Bond `amount` and nominate `validators` in one transaction.
    async fn bond_and_nominate(
        &self,
        account: &PolkadotAccount,
        amount: u128,
        validators: &[AccountId32],
    ) -> PolkadotResult<StakeReceipt>;
}

/// The chain funds leave from.
#[async_trait]
pub trait BridgeSource: Send + Sync {
    async fn bridge(&self, request: &BridgeRequest) -> BridgeResult<BridgeReceipt>;
}

#[async_trait]
impl StakingChain for PolkadotClient {
    async fn free_balance(&self, who: &AccountId32) -> PolkadotResult<u128> {
        PolkadotClient::free_balance(self, who).await
    }

    async fn active_validators(&self, limit: usize) -> PolkadotResult<Vec<AccountId32>> {
        PolkadotClient::active_validators(self, limit).await
    }

    async fn bond_and_nominate(
        &self,
        account: &PolkadotAccount,
        amount: u128,
        validators: &[AccountId32],
    ) -> PolkadotResult<StakeReceipt> {
        PolkadotClient::bond_and_nominate(self, account, amount, validators).await
    }
}

#[async_trait]
impl BridgeSource for WormholeBridge {
    async fn bridge(&self, request: &BridgeRequest) -> BridgeResult<BridgeReceipt> {
        WormholeBridge::bridge(self, request).await
    }
}
