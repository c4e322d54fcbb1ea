//! Configuration loader for the `fuelsafe-backend` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

use crate::sensor::SensorThresholds;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional millisecond environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Fleet API base URL (the remote query interface).
    pub api_base_url: String,

    /// Minutes without telemetry before a sensor is considered offline.
    pub offline_threshold_minutes: u32,

    /// Minutes without telemetry before a healthy sensor degrades to a warning.
    pub alert_threshold_minutes: u32,

    /// Rows per page in the alert history view.
    pub page_size: u32,

    /// Maximum attempts per upstream call, first try included.
    pub max_retry_attempts: u32,

    /// Delay before the first retry; doubles on each subsequent one.
    pub base_retry_delay_ms: u64,

    /// Per-request timeout for upstream calls.
    pub request_timeout_ms: u64,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `API_BASE_URL` – fleet API base URL
///
/// Optional:
/// - `SENSOR_OFFLINE_THRESHOLD` – offline staleness cutoff in minutes (default: 30)
/// - `SENSOR_ALERT_THRESHOLD` – warning staleness cutoff in minutes (default: 10)
/// - `PAGE_SIZE` – alert history page size (default: 10)
/// - `MAX_RETRY_ATTEMPTS` – upstream attempts per call (default: 3)
/// - `BASE_RETRY_DELAY_MS` – initial backoff delay (default: 1000)
/// - `REQUEST_TIMEOUT_MS` – upstream request timeout (default: 30000)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_base_url = require_env!("API_BASE_URL");
    let offline_threshold_minutes = parse_env_u32!("SENSOR_OFFLINE_THRESHOLD", 30);
    let alert_threshold_minutes = parse_env_u32!("SENSOR_ALERT_THRESHOLD", 10);
    let page_size = parse_env_u32!("PAGE_SIZE", 10);
    let max_retry_attempts = parse_env_u32!("MAX_RETRY_ATTEMPTS", 3);
    let base_retry_delay_ms = parse_env_u64!("BASE_RETRY_DELAY_MS", 1000);
    let request_timeout_ms = parse_env_u64!("REQUEST_TIMEOUT_MS", 30_000);

    Ok(Config {
        api_base_url,
        offline_threshold_minutes,
        alert_threshold_minutes,
        page_size,
        max_retry_attempts,
        base_retry_delay_ms,
        request_timeout_ms,
    })
}

impl Config {
    /// Staleness thresholds handed to the sensor-health classifier.
    pub fn sensor_thresholds(&self) -> SensorThresholds {
        // ---
        SensorThresholds {
            offline_minutes: self.offline_threshold_minutes,
            alert_minutes: self.alert_threshold_minutes,
        }
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  API_BASE_URL             : {}", self.api_base_url);
        tracing::info!("  SENSOR_OFFLINE_THRESHOLD : {} min", self.offline_threshold_minutes);
        tracing::info!("  SENSOR_ALERT_THRESHOLD   : {} min", self.alert_threshold_minutes);
        tracing::info!("  PAGE_SIZE                : {}", self.page_size);
        tracing::info!("  MAX_RETRY_ATTEMPTS       : {}", self.max_retry_attempts);
        tracing::info!("  BASE_RETRY_DELAY_MS      : {}", self.base_retry_delay_ms);
        tracing::info!("  REQUEST_TIMEOUT_MS       : {}", self.request_timeout_ms);
    }
}
