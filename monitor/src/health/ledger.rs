//! Ledger info fetch via the node API

use reqwest::Client as HttpClient;
use tracing::debug;

use super::types::LedgerInfo;
use crate::errors::FetchError;

/// Fetch ledger info from `url`. The client carries the per-call timeout.
pub async fn fetch_ledger_info(client: &HttpClient, url: &str) -> Result<LedgerInfo, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            code: response.status().as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let info: LedgerInfo = serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    debug!(
        "Ledger at {}: chain {} epoch {} version {}",
        url, info.chain_id, info.epoch, info.ledger_version
    );
    Ok(info)
}
