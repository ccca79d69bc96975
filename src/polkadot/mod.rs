//! Polkadot relay chain subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (mnemonic / secret URI)
//!     → account.rs (sr25519 keypair, SS58 address)
//! Config (ws URL, timeouts)
//!     → client.rs (connection, balances, validators, submission)
//!     → staking.rs (bond + nominate batch construction)
//! ```

pub mod account;
pub mod client;
pub mod staking;
pub mod types;

pub use account::PolkadotAccount;
pub use client::PolkadotClient;
pub use types::{PolkadotError, PolkadotResult, StakeReceipt};
