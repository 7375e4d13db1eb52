//! Integration tests for node health assessment
//!
//! Nodes are wiremock servers on localhost; closed ports come from binding
//! port 0 and releasing it.

mod common;

use common::fixtures::*;
use monitor::database::{NodeRecord, NodeStatus};
use monitor::health::NodeHealthAssessor;

const HOST: &str = "127.0.0.1";

fn assessor() -> NodeHealthAssessor {
    NodeHealthAssessor::with_settings(test_settings()).expect("Failed to build assessor")
}

#[tokio::test]
async fn test_healthy_node() {
    let node = MockNodeServer::start().await;
    node.mock_healthy(MAINNET_CHAIN_ID).await;
    let (_seed, seed_port) = open_listener();

    let record = NodeRecord::new(
        random_owner(),
        HOST,
        Some(node.port()),
        Some(node.port()),
        Some(seed_port),
    );
    let reference = reference_snapshot(MAINNET_CHAIN_ID);

    let assessment = assessor().assess(&record, Some(&reference)).await;

    assert_eq!(assessment.status, NodeStatus::Healthy);
    assert!(assessment.errors.is_empty());
    assert_eq!(assessment.synced, Some(true));
    assert_eq!(
        assessment.ledger.map(|ledger| ledger.chain_id),
        Some(MAINNET_CHAIN_ID)
    );
}

#[tokio::test]
async fn test_all_ports_closed() {
    let record = NodeRecord::new(
        random_owner(),
        HOST,
        Some(closed_port()),
        Some(closed_port()),
        Some(closed_port()),
    );

    let assessment = assessor()
        .assess(&record, Some(&reference_snapshot(MAINNET_CHAIN_ID)))
        .await;

    assert_eq!(assessment.status, NodeStatus::Unhealthy);
    assert_eq!(
        assessment.errors,
        errors(&["API port: closed", "Metrics port: closed", "Seed port: closed"])
    );
    assert!(assessment.ledger.is_none());
    assert!(assessment.synced.is_none());
}

#[tokio::test]
async fn test_chain_mismatch_reported_with_closed_ports() {
    let node = MockNodeServer::start().await;
    node.mock_ledger(TESTNET_CHAIN_ID).await;

    let record = NodeRecord::new(
        random_owner(),
        HOST,
        Some(node.port()),
        Some(closed_port()),
        Some(closed_port()),
    );

    let assessment = assessor()
        .assess(&record, Some(&reference_snapshot(MAINNET_CHAIN_ID)))
        .await;

    assert_eq!(
        assessment.errors,
        errors(&["Metrics port: closed", "Node out of date", "Seed port: closed"])
    );
}

#[tokio::test]
async fn test_chain_check_skipped_without_reference() {
    let node = MockNodeServer::start().await;
    node.mock_healthy(TESTNET_CHAIN_ID).await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), Some(node.port()), None);

    let assessment = assessor().assess(&record, None).await;

    assert_eq!(assessment.status, NodeStatus::Healthy);
}

#[tokio::test]
async fn test_out_of_sync_by_6000() {
    let node = MockNodeServer::start().await;
    node.mock_ledger(MAINNET_CHAIN_ID).await;
    node.mock_sync_metrics(106_000, 100_000).await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), Some(node.port()), None);

    let assessment = assessor()
        .assess(&record, Some(&reference_snapshot(MAINNET_CHAIN_ID)))
        .await;

    assert_eq!(assessment.errors, errors(&["Out of sync"]));
    assert_eq!(assessment.synced, Some(false));
}

#[tokio::test]
async fn test_in_sync_by_100() {
    let node = MockNodeServer::start().await;
    node.mock_ledger(MAINNET_CHAIN_ID).await;
    node.mock_sync_metrics(100_100, 100_000).await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), Some(node.port()), None);

    let assessment = assessor()
        .assess(&record, Some(&reference_snapshot(MAINNET_CHAIN_ID)))
        .await;

    assert!(assessment.errors.is_empty());
    assert_eq!(assessment.synced, Some(true));
}

#[tokio::test]
async fn test_missing_sync_series_is_not_an_error() {
    let node = MockNodeServer::start().await;
    node.mock_metrics_body("process_open_fds 112\nup 1\n").await;

    let record = NodeRecord::new(random_owner(), HOST, None, Some(node.port()), None);

    let assessment = assessor().assess(&record, None).await;

    assert_eq!(assessment.status, NodeStatus::Healthy);
    assert!(assessment.synced.is_none());
}

#[tokio::test]
async fn test_api_error_status_is_degraded() {
    let node = MockNodeServer::start().await;
    node.mock_ledger_status(503).await;
    node.mock_sync_metrics(100_000, 100_000).await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), Some(node.port()), None);

    let assessment = assessor()
        .assess(&record, Some(&reference_snapshot(MAINNET_CHAIN_ID)))
        .await;

    // Metrics dimension is still assessed
    assert_eq!(assessment.errors, errors(&["API degraded: HTTP 503"]));
    assert_eq!(assessment.synced, Some(true));
}

#[tokio::test]
async fn test_malformed_ledger_is_degraded() {
    let node = MockNodeServer::start().await;
    node.mock_ledger_malformed().await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), None, None);

    let assessment = assessor().assess(&record, None).await;

    assert_eq!(assessment.errors, errors(&["API degraded: malformed response"]));
}

#[tokio::test]
async fn test_metrics_error_status_is_degraded() {
    let node = MockNodeServer::start().await;
    node.mock_metrics_status(500).await;

    let record = NodeRecord::new(random_owner(), HOST, None, Some(node.port()), None);

    let assessment = assessor().assess(&record, None).await;

    assert_eq!(assessment.errors, errors(&["Metrics degraded: HTTP 500"]));
}

#[tokio::test]
async fn test_unconfigured_ports_are_not_fetched() {
    let node = MockNodeServer::start().await;
    node.expect_no_ledger_calls().await;
    node.expect_no_metrics_calls().await;
    let (_seed, seed_port) = open_listener();

    let record = NodeRecord::new(random_owner(), HOST, None, None, Some(seed_port));

    let assessment = assessor().assess(&record, None).await;

    assert_eq!(assessment.status, NodeStatus::Healthy);
    assert_eq!(node.request_count().await, 0);
}

#[tokio::test]
async fn test_identical_failures_produce_identical_errors() {
    let node = MockNodeServer::start().await;
    node.mock_ledger_status(502).await;

    let record = NodeRecord::new(random_owner(), HOST, Some(node.port()), None, None);
    let assessor = assessor();

    let first = assessor.assess(&record, None).await;
    let second = assessor.assess(&record, None).await;

    assert_eq!(first.errors, second.errors);
}
