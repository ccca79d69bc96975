//! Cross-chain staking orchestration.
//!
//! # Data Flow
//! ```text
//! AppConfig + Secrets
//!     → run.rs (connect Polkadot, derive account, build Wormhole bridge)
//!     → flow.rs (baseline → bridge → arrival.rs polling → stake)
//!     → status.rs (FlowStatus on a watch channel)
//! ```
//!
//! The flow only talks to chains through the traits in `ports.rs`.

pub mod arrival;
pub mod flow;
pub mod ports;
pub mod run;
pub mod status;

pub use arrival::{wait_for_arrival, ArrivalError, ArrivalSettings};
pub use flow::{CrossChainStake, FlowError, FlowReport, FlowSettings};
pub use ports::{BridgeSource, StakingChain};
pub use run::run_from_config;
pub use status::{FlowStatus, StatusReporter};
