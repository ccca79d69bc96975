//! In-memory chains for flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use alloy::primitives::TxHash;
use async_trait::async_trait;
use subxt::utils::AccountId32;

use dust_stake::bridge::{BridgeError, BridgeReceipt, BridgeRequest, BridgeResult};
use dust_stake::ethereum::EthereumError;
use dust_stake::orchestrator::{BridgeSource, StakingChain};
use dust_stake::polkadot::{PolkadotAccount, PolkadotError, PolkadotResult, StakeReceipt};

pub fn mock_bridge_tx() -> TxHash {
    TxHash::repeat_byte(0xb1)
}

/// Shared call log, used to assert ordering across both mocks.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn alice() -> PolkadotAccount {
    PolkadotAccount::from_secret("//Alice").unwrap()
}

pub fn validator(byte: u8) -> AccountId32 {
    AccountId32([byte; 32])
}

#[derive(Default)]
struct ChainState {
    /// Scripted balance answers; the last one repeats.
    balances: Mutex<VecDeque<Result<u128, String>>>,
    validators: Vec<AccountId32>,
    fail_stake: bool,
    validator_queries: Mutex<Vec<usize>>,
    stakes: Mutex<Vec<(u128, Vec<AccountId32>)>>,
}

/// Scripted relay chain.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<ChainState>,
    journal: Journal,
}

impl MockChain {
    pub fn new(journal: Journal, balances: Vec<u128>, validators: Vec<AccountId32>) -> Self {
        Self::scripted(journal, balances.into_iter().map(Ok).collect(), validators, false)
    }

    pub fn scripted(
        journal: Journal,
        balances: Vec<Result<u128, String>>,
        validators: Vec<AccountId32>,
        fail_stake: bool,
    ) -> Self {
        Self {
            state: Arc::new(ChainState {
                balances: Mutex::new(balances.into()),
                validators,
                fail_stake,
                ..ChainState::default()
            }),
            journal,
        }
    }

    pub fn stakes(&self) -> Vec<(u128, Vec<AccountId32>)> {
        self.state.stakes.lock().unwrap().clone()
    }

    pub fn validator_queries(&self) -> Vec<usize> {
        self.state.validator_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl StakingChain for MockChain {
    async fn free_balance(&self, _who: &AccountId32) -> PolkadotResult<u128> {
        self.journal.lock().unwrap().push("balance".to_string());
        let mut balances = self.state.balances.lock().unwrap();
        let next = if balances.len() > 1 {
            balances.pop_front()
        } else {
            balances.front().cloned()
        };
        match next {
            Some(Ok(balance)) => Ok(balance),
            Some(Err(e)) => Err(PolkadotError::Storage(e)),
            None => Ok(0),
        }
    }

    async fn active_validators(&self, limit: usize) -> PolkadotResult<Vec<AccountId32>> {
        self.state.validator_queries.lock().unwrap().push(limit);
        Ok(self.state.validators.iter().take(limit).cloned().collect())
    }

    async fn bond_and_nominate(
        &self,
        _account: &PolkadotAccount,
        amount: u128,
        validators: &[AccountId32],
    ) -> PolkadotResult<StakeReceipt> {
        self.journal.lock().unwrap().push("stake".to_string());
        if self.state.fail_stake {
            return Err(PolkadotError::Submission("Staking.InsufficientBond".to_string()));
        }
        self.state.stakes.lock().unwrap().push((amount, validators.to_vec()));
        Ok(StakeReceipt {
            extrinsic_hash: "0x5a5a".to_string(),
            block_hash: Some("0xb10c".to_string()),
            validators: validators.iter().map(|v| v.to_string()).collect(),
            amount,
        })
    }
}

/// Bridge that confirms instantly, or fails.
#[derive(Clone)]
pub struct MockBridge {
    requests: Arc<Mutex<Vec<BridgeRequest>>>,
    journal: Journal,
    fail: bool,
}

impl MockBridge {
    pub fn new(journal: Journal) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            journal,
            fail: false,
        }
    }

    pub fn failing(journal: Journal) -> Self {
        Self {
            fail: true,
            ..Self::new(journal)
        }
    }

    pub fn requests(&self) -> Vec<BridgeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BridgeSource for MockBridge {
    async fn bridge(&self, request: &BridgeRequest) -> BridgeResult<BridgeReceipt> {
        self.journal.lock().unwrap().push("bridge".to_string());
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(BridgeError::Ethereum(EthereumError::Reverted(
                "execution reverted".to_string(),
            )));
        }
        Ok(BridgeReceipt {
            tx_hash: mock_bridge_tx(),
            block_number: Some(19_000_000),
            approve_tx_hash: None,
        })
    }
}
