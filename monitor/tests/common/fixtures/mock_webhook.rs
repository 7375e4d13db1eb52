//! Mock webhook server for testing alert delivery
//!
//! This simulates the notification endpoint that receives alerts,
//! allowing tests to verify which owners were alerted and with what text.

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock webhook server that records alert requests
pub struct MockWebhookServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockWebhookServer {
    /// Create a new mock webhook server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock successful webhook delivery
    pub async fn mock_success(&self) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Mock webhook failure
    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every alert received, in arrival order
    pub async fn get_captured_alerts(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| request.body_json::<Value>().ok())
            .collect()
    }

    /// Get the number of webhook requests received
    pub async fn request_count(&self) -> usize {
        self.get_captured_alerts().await.len()
    }

    /// Alert texts sent to `recipient`
    pub async fn alerts_for(&self, recipient: &str) -> Vec<String> {
        self.get_captured_alerts()
            .await
            .iter()
            .filter(|alert| alert.get("recipient").and_then(Value::as_str) == Some(recipient))
            .filter_map(|alert| alert.get("text").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    /// Clear recorded requests
    pub async fn clear(&self) {
        self.server.reset().await;
        self.mock_success().await;
    }

    /// Get the webhook URL
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.base_url)
    }
}
