//! End-to-end tests of the bridge-then-stake sequence against mock chains.

use std::time::Duration;

use alloy::primitives::U256;
use tokio::time::Instant;

use dust_stake::bridge::BridgeToken;
use dust_stake::lifecycle::Shutdown;
use dust_stake::orchestrator::{
    ArrivalError, ArrivalSettings, CrossChainStake, FlowError, FlowSettings, FlowStatus, StatusReporter,
};
use dust_stake::polkadot::PolkadotError;

mod common;

use common::{alice, journal, mock_bridge_tx, validator, MockBridge, MockChain};

fn settings() -> FlowSettings {
    FlowSettings {
        bridge_token: BridgeToken::Native,
        bridge_amount: U256::from(100_000_000_000_000_000u64),
        stake_amount: None,
        validators: Vec::new(),
        max_validators: 2,
        arrival: ArrivalSettings {
            initial_delay: Duration::from_secs(60),
            poll_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
            max_consecutive_failures: 3,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn test_happy_path_stakes_arrived_delta() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100, 100, 100, 250], vec![validator(1), validator(2), validator(3)]);
    let bridge = MockBridge::new(log.clone());
    let status = StatusReporter::new();
    let flow = CrossChainStake::new(chain.clone(), bridge.clone(), alice(), settings(), status.clone());

    let started = Instant::now();
    let report = flow.run(&Shutdown::new()).await.unwrap();

    assert_eq!(report.initial_balance, 100);
    assert_eq!(report.arrived_balance, 250);
    assert_eq!(report.bridge.tx_hash, mock_bridge_tx());
    assert_eq!(report.stake.amount, 150);
    assert_eq!(report.polkadot_address, alice().address());
    // Baseline, then checks at 60s, 90s and 120s.
    assert_eq!(started.elapsed(), Duration::from_secs(120));

    assert_eq!(chain.validator_queries(), vec![2]);
    assert_eq!(chain.stakes(), vec![(150, vec![validator(1), validator(2)])]);

    let requests = bridge.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(&requests[0].recipient, alice().account_id());

    let calls = log.lock().unwrap().clone();
    assert_eq!(calls.first().map(String::as_str), Some("balance"));
    assert_eq!(calls[1], "bridge");
    assert_eq!(calls.last().map(String::as_str), Some("stake"));

    assert_eq!(
        status.current(),
        FlowStatus::Completed {
            stake_tx: "0x5a5a".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_configured_amount_and_validators() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![0, 500], vec![validator(9)]);
    let mut settings = settings();
    settings.stake_amount = Some(400);
    settings.validators = vec![validator(4), validator(5)];

    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings, StatusReporter::new());
    let report = flow.run(&Shutdown::new()).await.unwrap();

    assert_eq!(report.stake.amount, 400);
    assert!(chain.validator_queries().is_empty());
    assert_eq!(chain.stakes(), vec![(400, vec![validator(4), validator(5)])]);
}

#[tokio::test(start_paused = true)]
async fn test_arrival_timeout_reports_bridge_tx() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100], vec![validator(1)]);
    let status = StatusReporter::new();
    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings(), status.clone());

    let err = flow.run(&Shutdown::new()).await.unwrap_err();

    match &err {
        FlowError::ArrivalTimeout { bridge_tx, source } => {
            assert_eq!(*bridge_tx, mock_bridge_tx());
            assert!(matches!(source, ArrivalError::Timeout { polls: 9, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.bridge_tx(), Some(mock_bridge_tx()));
    assert!(chain.stakes().is_empty());
    assert_eq!(status.current().step(), "failed");
}

#[tokio::test(start_paused = true)]
async fn test_persistent_query_errors_abort_wait() {
    let log = journal();
    let chain = MockChain::scripted(
        log.clone(),
        vec![Ok(100), Err("connection reset".to_string())],
        vec![validator(1)],
        false,
    );
    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings(), StatusReporter::new());

    let err = flow.run(&Shutdown::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::ArrivalTimeout {
            source: ArrivalError::Query { failures: 3, .. },
            ..
        }
    ));
    assert!(chain.stakes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_waiting() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100], vec![validator(1)]);
    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings(), StatusReporter::new());

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(75)).await;
        trigger.trigger();
    });

    let err = flow.run(&shutdown).await.unwrap_err();
    assert!(matches!(err, FlowError::Interrupted { bridge_tx: Some(hash) } if hash == mock_bridge_tx()));
    assert!(chain.stakes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_bridge_sends_nothing() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100], vec![validator(1)]);
    let bridge = MockBridge::new(log);
    let flow = CrossChainStake::new(chain, bridge.clone(), alice(), settings(), StatusReporter::new());

    let shutdown = Shutdown::new();
    shutdown.trigger();

    let err = flow.run(&shutdown).await.unwrap_err();
    assert!(matches!(err, FlowError::Interrupted { bridge_tx: None }));
    assert!(bridge.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_bridge_failure_stops_before_waiting() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100], vec![validator(1)]);
    let flow = CrossChainStake::new(chain.clone(), MockBridge::failing(log.clone()), alice(), settings(), StatusReporter::new());

    let started = Instant::now();
    let err = flow.run(&Shutdown::new()).await.unwrap_err();

    assert!(matches!(err, FlowError::Bridge(_)));
    assert_eq!(err.bridge_tx(), None);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(log.lock().unwrap().clone(), vec!["balance", "bridge"]);
}

#[tokio::test(start_paused = true)]
async fn test_staking_failure_reports_bridge_tx() {
    let log = journal();
    let chain = MockChain::scripted(log.clone(), vec![Ok(0), Ok(80)], vec![validator(1)], true);
    let status = StatusReporter::new();
    let flow = CrossChainStake::new(chain, MockBridge::new(log), alice(), settings(), status.clone());

    let err = flow.run(&Shutdown::new()).await.unwrap_err();

    assert!(matches!(
        err,
        FlowError::Staking {
            bridge_tx,
            source: PolkadotError::Submission(_),
        } if bridge_tx == mock_bridge_tx()
    ));
    match status.current() {
        FlowStatus::Failed { reason } => assert!(reason.contains("Staking failed")),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_active_validators() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![0, 80], Vec::new());
    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings(), StatusReporter::new());

    let err = flow.run(&Shutdown::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Staking {
            source: PolkadotError::NoValidators,
            ..
        }
    ));
    assert!(chain.stakes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stake_amount_above_balance_rejected() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![0, 80], vec![validator(1)]);
    let mut settings = settings();
    settings.stake_amount = Some(1_000);

    let flow = CrossChainStake::new(chain.clone(), MockBridge::new(log), alice(), settings, StatusReporter::new());
    let err = flow.run(&Shutdown::new()).await.unwrap_err();

    assert!(matches!(
        err,
        FlowError::InsufficientStake {
            arrived: 80,
            requested: 1_000,
            ..
        }
    ));
    assert!(chain.stakes().is_empty());
}

fn published_steps(status: &StatusReporter) -> Vec<&'static str> {
    let mut steps: Vec<&'static str> = status.history().iter().map(FlowStatus::step).collect();
    steps.dedup();
    steps
}

#[tokio::test(start_paused = true)]
async fn test_status_sequence_of_successful_run() {
    let log = journal();
    let chain = MockChain::new(log.clone(), vec![100, 100, 100, 250], vec![validator(1)]);
    let status = StatusReporter::new();
    let flow = CrossChainStake::new(chain, MockBridge::new(log), alice(), settings(), status.clone());

    flow.run(&Shutdown::new()).await.unwrap();

    assert_eq!(
        published_steps(&status),
        vec!["checking_balance", "bridging", "waiting_for_arrival", "arrived", "staking", "completed"]
    );
    let polls: Vec<u32> = status
        .history()
        .iter()
        .filter_map(|s| match s {
            FlowStatus::WaitingForArrival { polls } => Some(*polls),
            _ => None,
        })
        .collect();
    assert_eq!(polls, vec![1, 2, 3]);
    assert!(status.history().contains(&FlowStatus::Arrived { balance: 250 }));
}

#[tokio::test(start_paused = true)]
async fn test_status_sequence_ends_at_failed() {
    let log = journal();
    let chain = MockChain::scripted(log.clone(), vec![Ok(0), Ok(80)], vec![validator(1)], true);
    let status = StatusReporter::new();
    let flow = CrossChainStake::new(chain, MockBridge::new(log), alice(), settings(), status.clone());

    flow.run(&Shutdown::new()).await.unwrap_err();
    status.set(FlowStatus::Staking);
    status.set(FlowStatus::Completed {
        stake_tx: "0x01".to_string(),
    });

    assert_eq!(
        published_steps(&status),
        vec!["checking_balance", "bridging", "waiting_for_arrival", "arrived", "staking", "failed"]
    );
    assert_eq!(status.current().step(), "failed");
}

#[test]
fn test_sub_unit_amount_rejected_for_six_decimal_token() {
    use dust_stake::config::{FlowConfig, PolkadotConfig};

    let flow = FlowConfig {
        token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
        amount: "0.0000001".to_string(),
        ..FlowConfig::default()
    };
    assert!(matches!(
        FlowSettings::from_config(&flow, &PolkadotConfig::default(), 6),
        Err(FlowError::Config(_))
    ));
}
