//! HTTP client for the fleet API (the remote query interface).
//!
//! All calls are wrapped in the retry loop from [`crate::retry`] and parse
//! their JSON arrays element-wise: a malformed record is logged and skipped
//! rather than failing the whole batch, so one bad row from a flaky device
//! never blanks the dashboard.

use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::date_range::ResolvedRange;
use crate::error::FetchError;
use crate::models::{AlertRecord, RawBusSummary, Reading};
use crate::retry::retry_with_backoff;

// ---

/// Fleet-wide dashboard snapshot as fetched from the upstream API.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub total_buses: u64,
    pub top_buses: Vec<RawBusSummary>,
}

/// Client for the fleet API, carrying the retry settings from [`Config`].
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    // ---
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl UpstreamClient {
    /// Build a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(UpstreamClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_retry_attempts,
            base_delay: Duration::from_millis(config.base_retry_delay_ms),
        })
    }

    /// Fetch the full alert history.
    pub async fn fetch_alerts(&self) -> Result<Vec<AlertRecord>, FetchError> {
        // ---
        let value = self.get_json("/alerts/all", &[]).await?;
        Ok(parse_records(&value))
    }

    /// Fetch the dashboard snapshot (fleet size plus monitored buses with
    /// raw sensor telemetry).
    pub async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, FetchError> {
        // ---
        let value = self.get_json("/dashboard", &[]).await?;

        let total_buses = value
            .get("totalBuses")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let top_buses = value
            .get("topBuses")
            .map(parse_records)
            .unwrap_or_default();

        Ok(DashboardSnapshot { total_buses, top_buses })
    }

    /// Fetch one bus's reading feed, bounded by an already-resolved range.
    pub async fn fetch_bus_details(
        &self,
        bus_id: &str,
        range: &ResolvedRange,
    ) -> Result<Vec<Reading>, FetchError> {
        // ---
        let mut query: Vec<(&str, String)> = Vec::new();
        if let (Some(start), Some(end)) = (range.start, range.end) {
            query.push(("startDate", start.to_rfc3339()));
            query.push(("endDate", end.to_rfc3339()));
        }

        let path = format!("/buses/{bus_id}/details");
        let value = self.get_json(&path, &query).await?;

        let readings = value
            .get("readings")
            .map(parse_records)
            .unwrap_or_default();
        Ok(readings)
    }

    /// One GET against the fleet API, with retry and error classification.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        // ---
        let url = format!("{}{}", self.base_url, path);

        retry_with_backoff(
            || async {
                debug!("GET {url}");
                let response = self.http.get(&url).query(query).send().await?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(FetchError::Server { status: status.as_u16(), message });
                }

                Ok(response.json::<Value>().await?)
            },
            self.max_attempts,
            self.base_delay,
        )
        .await
    }
}

/// Deserialize a JSON array element-wise, skipping rows that do not parse.
fn parse_records<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    // ---
    let Some(items) = value.as_array() else {
        debug!("expected a JSON array, got: {value}");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("skipping malformed record {i}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        // ---
        let value = json!([
            { "type": "THEFT", "timestamp": "2025-06-01T12:00:00Z" },
            { "type": "REFUEL" },
            { "type": "DROP", "timestamp": "not-a-timestamp" },
            { "timestamp": "2025-06-02T08:30:00Z" }
        ]);

        let records: Vec<AlertRecord> = parse_records(&value);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].alert_type, "THEFT");
        assert_eq!(records[1].alert_type, "UNKNOWN");
    }

    #[test]
    fn non_array_payload_yields_an_empty_batch() {
        // ---
        let records: Vec<AlertRecord> = parse_records(&json!({ "error": "oops" }));
        assert!(records.is_empty());

        let records: Vec<AlertRecord> = parse_records(&Value::Null);
        assert!(records.is_empty());
    }

    #[test]
    fn bus_summaries_parse_with_partial_telemetry() {
        // ---
        let value = json!([
            { "busId": "b-1", "registrationNo": "KA-01", "fuelLevel": 70.0,
              "sensorStatus": "OK", "sensorLastSeen": "2025-06-01T12:00:00Z" },
            { "busId": "b-2", "registrationNo": "KA-02" }
        ]);

        let buses: Vec<RawBusSummary> = parse_records(&value);
        assert_eq!(buses.len(), 2);
        assert!(buses[1].sensor_status.is_none());
        assert!(buses[1].sensor_last_seen.is_none());
    }
}
