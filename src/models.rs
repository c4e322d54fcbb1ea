//! Data models for the fleet alert pipeline.
//!
//! Upstream payloads are loosely shaped: fields come and go between firmware
//! revisions, so everything that is not essential deserializes with a default
//! instead of failing the record. The only hard requirement on an alert is
//! its timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sensor::{classify, SensorStatus, SensorThresholds};

// ---

/// A single detected event (theft, refuel, drop, sensor health) tied to one
/// bus and one instant.
///
/// `alert_type` is an open tag set: the documented values are `THEFT`,
/// `REFUEL`, `DROP` and `SENSOR_HEALTH`, but unrecognized tags pass through
/// opaquely rather than being rejected, so newer upstream event kinds still
/// reach the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    // ---
    #[serde(rename = "type", default = "unknown_tag")]
    pub alert_type: String,

    /// Event occurrence time. Immutable once recorded.
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub description: Option<String>,

    /// GPS fix at the time of the event; absent fixes render as "N/A".
    #[serde(default)]
    pub location: Option<Coordinates>,

    /// Owning bus. Many alerts map to one bus.
    #[serde(default)]
    pub bus: BusRef,

    /// `High` / `Medium` / `Low`; unknown values are kept and shown neutrally.
    #[serde(default)]
    pub severity: Option<String>,

    /// Signed fuel delta in liters; positive is a gain.
    #[serde(default)]
    pub fuel_change: Option<f64>,
}

fn unknown_tag() -> String {
    "UNKNOWN".to_string()
}

impl AlertRecord {
    /// Human-facing location string, `"N/A"` when no fix was recorded.
    pub fn location_label(&self) -> String {
        // ---
        match &self.location {
            Some(c) => format!("{:.3}, {:.3}", c.lat, c.long),
            None => "N/A".to_string(),
        }
    }
}

/// GPS coordinate pair. Some upstream firmwares send `lng` instead of `long`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub long: f64,
}

/// Identity of the bus an alert belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRef {
    // ---
    #[serde(default)]
    pub id: String,

    /// Stable registration string the bus filter matches against.
    #[serde(default)]
    pub registration_no: String,

    #[serde(default)]
    pub driver: Option<String>,

    #[serde(default)]
    pub route: Option<String>,
}

// ---

/// Bus summary as the fleet API reports it, sensor telemetry included.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBusSummary {
    // ---
    #[serde(default)]
    pub bus_id: String,
    #[serde(default)]
    pub registration_no: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub route_name: String,
    #[serde(default)]
    pub fuel_level: f64,
    /// Explicit status code from the device, e.g. `OK` or `FAULTY`.
    #[serde(default)]
    pub sensor_status: Option<String>,
    /// Last telemetry timestamp, as reported (possibly garbage).
    #[serde(default)]
    pub sensor_last_seen: Option<String>,
}

/// Bus summary served to the dashboard, with the derived health badge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusSummary {
    // ---
    pub bus_id: String,
    pub registration_no: String,
    pub driver_name: String,
    pub route_name: String,
    pub fuel_level: f64,
    pub status: SensorStatus,
}

impl RawBusSummary {
    /// Derive the dashboard summary, recomputing the health badge from the
    /// current inputs. The badge is never cached between evaluations.
    pub fn into_summary(self, thresholds: &SensorThresholds, now: DateTime<Utc>) -> BusSummary {
        // ---
        let status = classify(
            self.sensor_status.as_deref(),
            self.sensor_last_seen.as_deref(),
            thresholds,
            now,
        );

        BusSummary {
            bus_id: self.bus_id,
            registration_no: self.registration_no,
            driver_name: self.driver_name,
            route_name: self.route_name,
            fuel_level: self.fuel_level,
            status,
        }
    }
}

// ---

/// A fuel-level reading in a bus detail feed. Event markers ride along on
/// readings that coincided with a detected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub fuel_level: f64,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Reading {
    /// Whether this reading carries an event worth flagging on the chart.
    pub fn is_notable(&self) -> bool {
        // ---
        self.event_type.as_deref().is_some_and(|t| t != "UNKNOWN")
    }
}
