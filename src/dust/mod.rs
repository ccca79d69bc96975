//! Dust discovery and selection.
//!
//! # Data Flow
//! ```text
//! DustConfig (watch list, thresholds, static prices)
//!     → scanner.rs (ETH + ERC-20 balances → TokenHolding)
//!     → selection.rs (Selection → AggregationPlan)
//! ```

pub mod scanner;
pub mod selection;
pub mod types;

pub use scanner::DustScanner;
pub use selection::{AggregationPlan, Selection};
pub use types::{classify_native, classify_token, DustError, DustResult, TokenHolding, TokenSpec};
