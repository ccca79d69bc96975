//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a chain node:
//!     → timeouts.rs (every external call has a deadline)
//!     → On failure: retries.rs (idempotent calls only, backoff.rs delays)
//! ```

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_backoff, RetryPolicy};
pub use timeouts::{with_timeout, Elapsed};
