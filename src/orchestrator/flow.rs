//! The cross-chain staking sequence.
//!
//! # Sequence
//! ```text
//! free_balance (baseline)
//!     → bridge (Ethereum, confirmed)
//!     → wait_for_arrival (balance > baseline)
//!     → pick validators
//!     → bond + nominate
//!     → FlowReport
//! ```
//!
//! Errors raised after the bridge transaction confirmed carry its hash:
//! at that point the funds are in flight and the operator has to finish
//! by hand.

use std::str::FromStr;
use std::time::Instant;

use alloy::primitives::{TxHash, U256};
use serde::Serialize;
use subxt::utils::AccountId32;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::bridge::{BridgeError, BridgeReceipt, BridgeRequest, BridgeToken};
use crate::config::validation::MAX_NOMINATIONS;
use crate::config::{FlowConfig, PolkadotConfig};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::orchestrator::arrival::{wait_for_arrival, ArrivalError, ArrivalSettings};
use crate::orchestrator::ports::{BridgeSource, StakingChain};
use crate::orchestrator::status::{FlowStatus, StatusReporter};
use crate::polkadot::{PolkadotAccount, PolkadotError, StakeReceipt};
use crate::units::{parse_amount, to_planck};

/// Parameters of one flow run, already parsed into base units.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub bridge_token: BridgeToken,
    /// Amount to bridge in the token's base units.
    pub bridge_amount: U256,
    /// Planck to bond; `None` bonds whatever arrived.
    pub stake_amount: Option<u128>,
    /// Configured nominations; empty means "ask the chain".
    pub validators: Vec<AccountId32>,
    pub max_validators: usize,
    pub arrival: ArrivalSettings,
}

impl FlowSettings {
    /// Build settings from config. `token_decimals` are those of the
    /// bridged token (18 for ETH).
    pub fn from_config(flow: &FlowConfig, polkadot: &PolkadotConfig, token_decimals: u8) -> Result<Self, FlowError> {
        let bridge_token = BridgeToken::from_str(&flow.token)?;
        let bridge_amount = parse_amount(&flow.amount, token_decimals)
            .map_err(|e| FlowError::Config(format!("flow.amount: {}", e)))?;

        let stake_amount = flow
            .stake_amount
            .as_deref()
            .map(|text| {
                parse_amount(text, polkadot.token_decimals)
                    .and_then(to_planck)
                    .map_err(|e| FlowError::Config(format!("flow.stake_amount: {}", e)))
            })
            .transpose()?;

        let validators = flow
            .validators
            .iter()
            .map(|v| {
                AccountId32::from_str(v)
                    .map_err(|_| FlowError::Config(format!("'{}' is not a valid SS58 address", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bridge_token,
            bridge_amount,
            stake_amount,
            validators,
            max_validators: flow.max_validators.clamp(1, MAX_NOMINATIONS),
            arrival: ArrivalSettings::from(flow),
        })
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub run_id: Uuid,
    pub polkadot_address: String,
    /// Free balance before bridging, in planck.
    pub initial_balance: u128,
    /// Free balance once funds arrived, in planck.
    pub arrived_balance: u128,
    pub bridge: BridgeReceipt,
    pub stake: StakeReceipt,
    pub elapsed_secs: u64,
}

/// Flow failures. Variants holding `bridge_tx` happened after funds left
/// Ethereum.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid flow configuration: {0}")]
    Config(String),

    #[error("Polkadot error: {0}")]
    Polkadot(#[source] PolkadotError),

    #[error("Bridge failed: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Bridged funds ({bridge_tx}) did not arrive: {source}")]
    ArrivalTimeout {
        bridge_tx: TxHash,
        #[source]
        source: ArrivalError,
    },

    #[error("Only {arrived} planck available after bridge {bridge_tx}, {requested} requested")]
    InsufficientStake {
        bridge_tx: TxHash,
        arrived: u128,
        requested: u128,
    },

    #[error("Staking failed after bridge {bridge_tx}: {source}")]
    Staking {
        bridge_tx: TxHash,
        #[source]
        source: PolkadotError,
    },

    #[error("Interrupted{}", .bridge_tx.map(|h| format!(" after bridge {}", h)).unwrap_or_default())]
    Interrupted { bridge_tx: Option<TxHash> },
}

impl FlowError {
    /// Hash of the confirmed bridge transaction, when funds are in flight.
    pub fn bridge_tx(&self) -> Option<TxHash> {
        match self {
            FlowError::ArrivalTimeout { bridge_tx, .. }
            | FlowError::InsufficientStake { bridge_tx, .. }
            | FlowError::Staking { bridge_tx, .. } => Some(*bridge_tx),
            FlowError::Interrupted { bridge_tx } => *bridge_tx,
            _ => None,
        }
    }
}

/// One bridge-then-stake run against a pair of chains.
pub struct CrossChainStake<C, B> {
    chain: C,
    bridge: B,
    account: PolkadotAccount,
    settings: FlowSettings,
    status: StatusReporter,
}

impl<C: StakingChain, B: BridgeSource> CrossChainStake<C, B> {
    pub fn new(chain: C, bridge: B, account: PolkadotAccount, settings: FlowSettings, status: StatusReporter) -> Self {
        Self {
            chain,
            bridge,
            account,
            settings,
            status,
        }
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Execute the sequence. Shutdown is honoured before bridging and while
    /// waiting for arrival; a sent transaction is always awaited.
    pub async fn run(&self, shutdown: &Shutdown) -> Result<FlowReport, FlowError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("flow", %run_id, address = %self.account.address());

        let result = self.execute(run_id, shutdown).instrument(span).await;
        match &result {
            Ok(report) => {
                metrics::record_flow_outcome("completed");
                self.status.set(FlowStatus::Completed {
                    stake_tx: report.stake.extrinsic_hash.clone(),
                });
            }
            Err(e) => {
                metrics::record_flow_outcome(match e {
                    FlowError::Interrupted { .. } => "interrupted",
                    _ => "failed",
                });
                if let Some(hash) = e.bridge_tx() {
                    tracing::error!(bridge_tx = %hash, "Funds were bridged but not staked");
                }
                self.status.set(FlowStatus::Failed { reason: e.to_string() });
            }
        }
        result
    }

    async fn execute(&self, run_id: Uuid, shutdown: &Shutdown) -> Result<FlowReport, FlowError> {
        let started = Instant::now();
        let mut shutdown_rx = shutdown.subscribe();
        let who = self.account.account_id().clone();

        self.status.set(FlowStatus::CheckingBalance);
        let initial_balance = self.chain.free_balance(&who).await.map_err(FlowError::Polkadot)?;
        tracing::info!(balance = initial_balance, "Initial Polkadot balance");

        if shutdown.is_triggered() {
            return Err(FlowError::Interrupted { bridge_tx: None });
        }

        self.status.set(FlowStatus::Bridging);
        let request = BridgeRequest {
            token: self.settings.bridge_token,
            amount: self.settings.bridge_amount,
            recipient: who.clone(),
        };
        let bridge = self.bridge.bridge(&request).await?;
        let bridge_tx = bridge.tx_hash;
        tracing::info!(%bridge_tx, "Bridge transfer confirmed");

        let arrived_balance = wait_for_arrival(
            || self.chain.free_balance(&who),
            initial_balance,
            &self.settings.arrival,
            &mut shutdown_rx,
            &self.status,
        )
        .await
        .map_err(|e| match e {
            ArrivalError::Interrupted => FlowError::Interrupted {
                bridge_tx: Some(bridge_tx),
            },
            other => FlowError::ArrivalTimeout {
                bridge_tx,
                source: other,
            },
        })?;
        self.status.set(FlowStatus::Arrived {
            balance: arrived_balance,
        });

        let arrived = arrived_balance - initial_balance;
        let amount = self.settings.stake_amount.unwrap_or(arrived);
        if amount == 0 || amount > arrived_balance {
            return Err(FlowError::InsufficientStake {
                bridge_tx,
                arrived: arrived_balance,
                requested: amount,
            });
        }

        let validators = self.pick_validators().await.map_err(|source| FlowError::Staking {
            bridge_tx,
            source,
        })?;

        self.status.set(FlowStatus::Staking);
        let stake = self
            .chain
            .bond_and_nominate(&self.account, amount, &validators)
            .await
            .map_err(|source| FlowError::Staking { bridge_tx, source })?;

        Ok(FlowReport {
            run_id,
            polkadot_address: self.account.address(),
            initial_balance,
            arrived_balance,
            bridge,
            stake,
            elapsed_secs: started.elapsed().as_secs(),
        })
    }

    async fn pick_validators(&self) -> Result<Vec<AccountId32>, PolkadotError> {
        if !self.settings.validators.is_empty() {
            tracing::debug!(count = self.settings.validators.len(), "Using configured validators");
            return Ok(self.settings.validators.clone());
        }

        let validators = self.chain.active_validators(self.settings.max_validators).await?;
        if validators.is_empty() {
            return Err(PolkadotError::NoValidators);
        }
        Ok(validators)
    }
}
