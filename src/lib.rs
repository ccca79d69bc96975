//! Dust aggregation and cross-chain staking.
//!
//! Finds small balances on an Ethereum account, bridges value to Polkadot
//! through the Wormhole token bridge and stakes it with a bond + nominate
//! batch.

pub mod bridge;
pub mod config;
pub mod dust;
pub mod ethereum;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod polkadot;
pub mod resilience;
pub mod units;

pub use config::{AppConfig, Secrets};
pub use lifecycle::Shutdown;
pub use orchestrator::{run_from_config, CrossChainStake, FlowError, FlowReport, FlowStatus};
