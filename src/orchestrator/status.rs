//! Observable flow progress.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;

use crate::observability::metrics;

/// Where a flow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FlowStatus {
    Idle,
    Connecting,
    AccountReady { address: String },
    CheckingBalance,
    Bridging,
    WaitingForArrival { polls: u32 },
    Arrived { balance: u128 },
    Staking,
    Completed { stake_tx: String },
    Failed { reason: String },
}

impl FlowStatus {
    /// Stable label used in metrics.
    pub fn step(&self) -> &'static str {
        match self {
            FlowStatus::Idle => "idle",
            FlowStatus::Connecting => "connecting",
            FlowStatus::AccountReady { .. } => "account_ready",
            FlowStatus::CheckingBalance => "checking_balance",
            FlowStatus::Bridging => "bridging",
            FlowStatus::WaitingForArrival { .. } => "waiting_for_arrival",
            FlowStatus::Arrived { .. } => "arrived",
            FlowStatus::Staking => "staking",
            FlowStatus::Completed { .. } => "completed",
            FlowStatus::Failed { .. } => "failed",
        }
    }

    /// Position in the sequence; a flow never moves to a lower one.
    fn rank(&self) -> u8 {
        match self {
            FlowStatus::Idle => 0,
            FlowStatus::Connecting => 1,
            FlowStatus::AccountReady { .. } => 2,
            FlowStatus::CheckingBalance => 3,
            FlowStatus::Bridging => 4,
            FlowStatus::WaitingForArrival { .. } => 5,
            FlowStatus::Arrived { .. } => 6,
            FlowStatus::Staking => 7,
            FlowStatus::Completed { .. } | FlowStatus::Failed { .. } => 8,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStatus::Completed { .. } | FlowStatus::Failed { .. })
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Idle => write!(f, "Idle"),
            FlowStatus::Connecting => write!(f, "Connecting to Polkadot..."),
            FlowStatus::AccountReady { address } => write!(f, "Connected with account: {}", address),
            FlowStatus::CheckingBalance => write!(f, "Checking balance..."),
            FlowStatus::Bridging => write!(f, "Bridging tokens..."),
            FlowStatus::WaitingForArrival { polls } => {
                write!(f, "Waiting for tokens to arrive ({} checks so far)...", polls)
            }
            FlowStatus::Arrived { .. } => write!(f, "Tokens arrived! Starting staking process..."),
            FlowStatus::Staking => write!(f, "Staking..."),
            FlowStatus::Completed { stake_tx } => write!(f, "Staking successful! Transaction hash: {}", stake_tx),
            FlowStatus::Failed { reason } => write!(f, "Error: {}", reason),
        }
    }
}

/// Publishes [`FlowStatus`] changes to any number of watchers.
///
/// Watchers only see the latest value; [`StatusReporter::history`] keeps
/// every accepted transition. Updates that would move the flow backwards,
/// or past a terminal status, are ignored.
#[derive(Clone)]
pub struct StatusReporter {
    tx: Arc<watch::Sender<FlowStatus>>,
    history: Arc<Mutex<Vec<FlowStatus>>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(FlowStatus::Idle);
        Self {
            tx: Arc::new(tx),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FlowStatus {
        self.tx.borrow().clone()
    }

    /// Every status accepted so far, oldest first.
    pub fn history(&self) -> Vec<FlowStatus> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, status: FlowStatus) {
        let mut history = match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };

        let (terminal, rank) = {
            let current = self.tx.borrow();
            (current.is_terminal(), current.rank())
        };
        if terminal {
            tracing::debug!(ignored = %status, "Flow already finished, ignoring status");
            return;
        }
        if status.rank() < rank {
            tracing::warn!(ignored = %status, "Out-of-order flow status, ignoring");
            return;
        }

        match &status {
            FlowStatus::Failed { .. } => tracing::error!(step = status.step(), "{}", status),
            FlowStatus::WaitingForArrival { .. } => tracing::debug!(step = status.step(), "{}", status),
            _ => tracing::info!(step = status.step(), "{}", status),
        }
        metrics::record_flow_step(status.step());
        history.push(status.clone());
        self.tx.send_replace(status);
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReporter")
            .field("current", &*self.tx.borrow())
            .finish()
    }
}
