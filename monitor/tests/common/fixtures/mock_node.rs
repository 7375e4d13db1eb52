//! Mock node serving the ledger API and the Prometheus metrics endpoint
//!
//! Both endpoints live on one server, so a test node can use the same port
//! as its API and metrics port.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const LEDGER_PATH: &str = "/v1";
pub const METRICS_PATH: &str = "/metrics";

fn ledger_body(chain_id: u64) -> Value {
    json!({
        "chain_id": chain_id,
        "epoch": "5421",
        "ledger_version": "1183529871",
        "oldest_ledger_version": "0",
        "ledger_timestamp": "1719930032412853",
        "node_role": "full_node",
        "oldest_block_height": "0",
        "block_height": "290051002",
        "git_hash": "b2b6a9c3"
    })
}

pub struct MockNodeServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockNodeServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    pub fn ledger_url(&self) -> String {
        format!("{}{}", self.base_url, LEDGER_PATH)
    }

    /// Ledger info as a real node serves it: counters as strings
    pub async fn mock_ledger(&self, chain_id: u64) {
        Mock::given(method("GET"))
            .and(path(LEDGER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(ledger_body(chain_id)))
            .mount(&self.server)
            .await;
    }

    /// Ledger info answered only after `delay`
    pub async fn mock_ledger_delayed(&self, chain_id: u64, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(LEDGER_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ledger_body(chain_id))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_ledger_status(&self, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(LEDGER_PATH))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_ledger_malformed(&self) {
        Mock::given(method("GET"))
            .and(path(LEDGER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&self.server)
            .await;
    }

    /// Fail the test on drop if the ledger endpoint is ever called
    pub async fn expect_no_ledger_calls(&self) {
        Mock::given(method("GET"))
            .and(path(LEDGER_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sync_metrics(&self, synced: u64, applied: u64) {
        self.mock_metrics_body(&sync_exposition(synced, applied)).await;
    }

    pub async fn mock_metrics_body(&self, body: &str) {
        Mock::given(method("GET"))
            .and(path(METRICS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_metrics_status(&self, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(METRICS_PATH))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    pub async fn expect_no_metrics_calls(&self) {
        Mock::given(method("GET"))
            .and(path(METRICS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// A healthy node on chain `chain_id`
    pub async fn mock_healthy(&self, chain_id: u64) {
        self.mock_ledger(chain_id).await;
        self.mock_sync_metrics(100_000, 100_000).await;
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn sync_exposition(synced: u64, applied: u64) -> String {
    format!(
        "# HELP aptos_state_sync_version The versions of the state sync components\n\
         # TYPE aptos_state_sync_version gauge\n\
         aptos_state_sync_version{{type=\"applied_transaction_outputs\"}} {}\n\
         aptos_state_sync_version{{type=\"executed_transactions\"}} 0\n\
         aptos_state_sync_version{{type=\"synced\"}} {}\n\
         # HELP process_open_fds Number of open file descriptors\n\
         # TYPE process_open_fds gauge\n\
         process_open_fds 112\n",
        applied, synced
    )
}
