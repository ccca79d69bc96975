//! Cross-chain bridge subsystem.
//!
//! # Data Flow
//! ```text
//! BridgeRequest (token, amount, Polkadot recipient)
//!     → wormhole.rs (approve, transfer, confirm on Ethereum)
//!     → BridgeReceipt (tx hash, block)
//! ```
//!
//! Arrival on the Polkadot side is observed by the orchestrator, not here.

pub mod types;
pub mod wormhole;

pub use types::{BridgeError, BridgeReceipt, BridgeRequest, BridgeResult, BridgeToken};
pub use wormhole::WormholeBridge;
