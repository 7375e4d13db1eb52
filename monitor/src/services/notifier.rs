//! Outbound alert delivery
//!
//! The notifier is a sink: it accepts `(recipient, text)` and posts it to the
//! configured webhook. Delivery is best effort and its outcome is only logged.

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::alerts::WEBHOOK_TIMEOUT_SECONDS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub text: String,
}

#[derive(Clone)]
pub struct Notifier {
    webhook_url: String,
    client: Client,
}

impl Notifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    pub fn get_webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Deliver `text` to `recipient`. Never fails; the caller treats a
    /// returned call as delivered.
    pub async fn send(&self, recipient: &str, text: &str) {
        let payload = AlertPayload {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            recipient: recipient.to_string(),
            text: text.to_string(),
        };

        if !self.is_enabled() {
            info!("No webhook configured, alert for {} logged only:\n{}", recipient, text);
            return;
        }

        match timeout(
            Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(&payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Alert {} sent to {}", payload.id, recipient);
                } else {
                    warn!(
                        "Alert webhook returned status {} for {}",
                        response.status(),
                        recipient
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to send alert to {}: {}", recipient, e);
            }
            Err(_) => {
                warn!("Alert webhook timeout for {}", recipient);
            }
        }
    }
}
