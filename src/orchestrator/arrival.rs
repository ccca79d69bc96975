//! Polling the destination balance until bridged funds land.
//!
//! # Timeline
//! ```text
//! t=0            bridge confirmed on Ethereum
//! t=initial      first balance check
//! +interval ...  further checks until balance > baseline
//! t=timeout      give up
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};

use crate::config::FlowConfig;
use crate::observability::metrics;
use crate::orchestrator::status::{FlowStatus, StatusReporter};
use crate::polkadot::PolkadotError;

/// Polling schedule for [`wait_for_arrival`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalSettings {
    pub initial_delay: Duration,
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Query errors tolerated in a row before giving up.
    pub max_consecutive_failures: u32,
}

impl Default for ArrivalSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(60),
            poll_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            max_consecutive_failures: 5,
        }
    }
}

impl From<&FlowConfig> for ArrivalSettings {
    fn from(config: &FlowConfig) -> Self {
        Self {
            initial_delay: Duration::from_secs(config.arrival_initial_delay_secs),
            poll_interval: Duration::from_secs(config.arrival_poll_interval_secs),
            timeout: Duration::from_secs(config.arrival_timeout_secs),
            max_consecutive_failures: config.max_consecutive_poll_failures,
        }
    }
}

/// Why waiting stopped without the funds.
#[derive(Debug, Error)]
pub enum ArrivalError {
    #[error("funds did not arrive within {}s ({polls} checks)", .waited.as_secs())]
    Timeout { waited: Duration, polls: u32 },

    #[error("balance query failed {failures} times in a row: {source}")]
    Query {
        failures: u32,
        #[source]
        source: PolkadotError,
    },

    #[error("interrupted while waiting for funds")]
    Interrupted,
}

/// Poll `query` until it reports a balance strictly above `baseline`.
///
/// Returns the new balance. A check is never scheduled past the timeout.
pub async fn wait_for_arrival<F, Fut>(
    mut query: F,
    baseline: u128,
    settings: &ArrivalSettings,
    shutdown: &mut broadcast::Receiver<()>,
    status: &StatusReporter,
) -> Result<u128, ArrivalError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u128, PolkadotError>>,
{
    let started = Instant::now();
    let deadline = started + settings.timeout;
    let mut wake = started + settings.initial_delay;
    let mut polls = 0u32;
    let mut failures = 0u32;

    tracing::info!(
        baseline,
        initial_delay_secs = settings.initial_delay.as_secs(),
        poll_interval_secs = settings.poll_interval.as_secs(),
        timeout_secs = settings.timeout.as_secs(),
        "Waiting for bridged funds"
    );

    loop {
        if wake > deadline {
            metrics::record_arrival_poll("timeout");
            return Err(ArrivalError::Timeout {
                waited: started.elapsed(),
                polls,
            });
        }

        tokio::select! {
            _ = sleep_until(wake) => {}
            _ = shutdown.recv() => {
                tracing::warn!(polls, "Shutdown requested while waiting for funds");
                return Err(ArrivalError::Interrupted);
            }
        }

        polls += 1;
        status.set(FlowStatus::WaitingForArrival { polls });

        match query().await {
            Ok(balance) if balance > baseline => {
                let waited = started.elapsed();
                metrics::record_arrival_poll("arrived");
                metrics::record_arrival_wait(waited.as_secs_f64());
                tracing::info!(balance, baseline, polls, waited_secs = waited.as_secs(), "Funds arrived");
                return Ok(balance);
            }
            Ok(balance) => {
                failures = 0;
                metrics::record_arrival_poll("pending");
                tracing::debug!(balance, baseline, polls, "Funds not arrived yet");
            }
            Err(e) => {
                failures += 1;
                metrics::record_arrival_poll("error");
                tracing::warn!(error = %e, failures, polls, "Balance check failed");
                if failures >= settings.max_consecutive_failures {
                    return Err(ArrivalError::Query { failures, source: e });
                }
            }
        }

        wake += settings.poll_interval;
    }
}
