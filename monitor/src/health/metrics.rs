//! State sync detection from the node's Prometheus metrics
//!
//! Only the text exposition format is supported. The parser is lenient:
//! lines it cannot read are skipped, since a node exposing an unexpected
//! metrics shape must not turn into a false "out of sync".

use reqwest::Client as HttpClient;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::sync_metrics;
use crate::errors::FetchError;

/// One sample line of the exposition format
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: HashMap<String, String>,
    pub value: f64,
}

/// Parse the Prometheus text format into samples.
pub fn parse_exposition(text: &str) -> Vec<Sample> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_sample_line)
        .collect()
}

fn parse_sample_line(line: &str) -> Option<Sample> {
    let name_end = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = &line[name_end..];
    let mut labels = HashMap::new();
    if rest.starts_with('{') {
        let (parsed, consumed) = parse_labels(&rest[1..])?;
        labels = parsed;
        rest = &rest[1 + consumed..];
    }

    // Trailing timestamp, if any, is ignored
    let value = rest.split_whitespace().next()?.parse::<f64>().ok()?;

    Some(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

/// Parse `k="v",...}`; returns the labels and the bytes consumed including
/// the closing brace.
fn parse_labels(input: &str) -> Option<(HashMap<String, String>, usize)> {
    let mut labels = HashMap::new();
    let mut chars = input.char_indices().peekable();

    loop {
        while let Some(&(_, c)) = chars.peek() {
            if c == ',' || c.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }

        let (start, c) = chars.next()?;
        if c == '}' {
            return Some((labels, start + 1));
        }

        let mut key = String::from(c);
        loop {
            let (_, c) = chars.next()?;
            if c == '=' {
                break;
            }
            key.push(c);
        }

        if chars.next()?.1 != '"' {
            return None;
        }

        let mut value = String::new();
        loop {
            let (_, c) = chars.next()?;
            match c {
                '"' => break,
                '\\' => match chars.next()?.1 {
                    'n' => value.push('\n'),
                    other => value.push(other),
                },
                other => value.push(other),
            }
        }

        labels.insert(key.trim().to_string(), value);
    }
}

fn find_series<'a>(samples: &'a [Sample], series_type: &str) -> Option<&'a Sample> {
    samples.iter().find(|sample| {
        sample.name == sync_metrics::FAMILY
            && sample
                .labels
                .get(sync_metrics::DISCRIMINATOR_LABEL)
                .map(|v| v == series_type)
                .unwrap_or(false)
    })
}

/// Synced iff `|synced - applied| < threshold`; None when either series is missing.
pub fn sync_state(samples: &[Sample], out_of_sync_threshold: u64) -> Option<bool> {
    let synced = find_series(samples, sync_metrics::SYNCED)?;
    let applied = find_series(samples, sync_metrics::APPLIED_TRANSACTION_OUTPUTS)?;

    let gap = (synced.value - applied.value).abs();
    Some(gap < out_of_sync_threshold as f64)
}

/// Scrape `url` and derive sync state.
pub async fn fetch_sync_state(
    client: &HttpClient,
    url: &str,
    out_of_sync_threshold: u64,
) -> Result<Option<bool>, FetchError> {
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

    let samples = parse_exposition(&body);
    let state = sync_state(&samples, out_of_sync_threshold);
    if state.is_none() {
        debug!("{} exposes no state sync series, sync status unknown", url);
    }
    Ok(state)
}
