//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap chain calls with a deadline
//! - Keep timeout errors distinct from other errors
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Callers map `Elapsed` into their own error type

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// An operation did not finish before its deadline.
#[derive(Debug, Error)]
#[error("{operation} timed out after {seconds} seconds")]
pub struct Elapsed {
    pub operation: String,
    pub seconds: u64,
}

/// Await `fut`, failing with [`Elapsed`] after `duration`.
pub async fn with_timeout<F, T>(duration: Duration, operation: &str, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await.map_err(|_| {
        tracing::warn!(operation = operation, seconds = duration.as_secs(), "Operation timed out");
        Elapsed {
            operation: operation.to_string(),
            seconds: duration.as_secs(),
        }
    })
}
