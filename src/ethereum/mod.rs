//! Ethereum integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading)
//! Config (RPC URLs, timeouts)
//!     → client.rs (read calls with timeouts and failover)
//!     → transaction.rs (signing provider, gas guard, confirmations)
//! contracts.rs (ERC-20 and token bridge ABIs)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contracts;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::EthereumClient;
pub use types::{ChainId, EthereumError, EthereumResult};
pub use wallet::Wallet;
