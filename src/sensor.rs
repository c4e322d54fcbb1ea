//! Sensor-health classification for fleet fuel sensors.
//!
//! A device's health badge is derived fresh on every evaluation from two
//! inputs: the explicit status code it last reported and the timestamp of
//! its last telemetry. There is no persisted previous state and no
//! transition graph; each call is a pure re-evaluation.
//!
//! The classifier is fail-safe: anything it cannot understand (unknown
//! status codes, unparseable last-seen timestamps) degrades to `Offline`,
//! never to `Normal`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Three-state health verdict shown as a badge on each bus card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Normal,
    Alert,
    Offline,
}

impl SensorStatus {
    /// Display text for the badge.
    pub fn label(&self) -> &'static str {
        // ---
        match self {
            SensorStatus::Normal => "Online",
            SensorStatus::Alert => "Warning",
            SensorStatus::Offline => "Offline",
        }
    }
}

/// Staleness cutoffs, in minutes, injected from [`crate::Config`].
#[derive(Debug, Clone, Copy)]
pub struct SensorThresholds {
    /// Past this age the sensor is offline regardless of its status code.
    pub offline_minutes: u32,
    /// Past this age a healthy sensor degrades to a warning.
    pub alert_minutes: u32,
}

impl Default for SensorThresholds {
    fn default() -> Self {
        SensorThresholds { offline_minutes: 30, alert_minutes: 10 }
    }
}

// ---

/// Classify a sensor from its reported status code and last-seen timestamp.
///
/// Derivation order:
/// 1. the status code sets the base (`OK` → `Normal`, everything else,
///    `OFFLINE`/`FAULTY`/unknown/absent, → `Offline`);
/// 2. a parseable last-seen timestamp may then decay the result: older than
///    the offline cutoff forces `Offline`, older than the alert cutoff turns
///    a `Normal` base into `Alert`;
/// 3. a last-seen value that is present but unparseable forces `Offline`.
///
/// Never fails; bad inputs only ever push the verdict toward `Offline`.
pub fn classify(
    status_code: Option<&str>,
    last_seen: Option<&str>,
    thresholds: &SensorThresholds,
    now: DateTime<Utc>,
) -> SensorStatus {
    // ---
    let mut status = match status_code {
        Some("OK") => SensorStatus::Normal,
        // OFFLINE, FAULTY, unknown codes and missing codes all land here.
        _ => SensorStatus::Offline,
    };

    if let Some(raw) = last_seen {
        match parse_last_seen(raw) {
            Some(seen) => {
                let age_minutes = now.signed_duration_since(seen).num_seconds() as f64 / 60.0;

                if age_minutes > f64::from(thresholds.offline_minutes) {
                    status = SensorStatus::Offline;
                } else if age_minutes > f64::from(thresholds.alert_minutes)
                    && status == SensorStatus::Normal
                {
                    status = SensorStatus::Alert;
                }
            }
            None => {
                tracing::warn!("unparseable sensor last-seen timestamp: {raw:?}");
                status = SensorStatus::Offline;
            }
        }
    }

    status
}

/// Parse a last-seen timestamp as reported by the fleet API.
///
/// RFC 3339 is the documented format; some devices still emit the older
/// space-separated form, which is read as UTC.
fn parse_last_seen(raw: &str) -> Option<DateTime<Utc>> {
    // ---
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn seen(minutes_ago: i64) -> String {
        (now() - Duration::minutes(minutes_ago)).to_rfc3339()
    }

    fn classify_at(status: Option<&str>, last_seen: Option<&str>) -> SensorStatus {
        classify(status, last_seen, &SensorThresholds::default(), now())
    }

    #[test]
    fn fresh_ok_sensor_is_normal() {
        assert_eq!(classify_at(Some("OK"), Some(&seen(0))), SensorStatus::Normal);
        assert_eq!(classify_at(Some("OK"), Some(&seen(5))), SensorStatus::Normal);
    }

    #[test]
    fn stale_ok_sensor_degrades_to_alert() {
        assert_eq!(classify_at(Some("OK"), Some(&seen(15))), SensorStatus::Alert);
    }

    #[test]
    fn very_stale_sensor_is_offline_regardless_of_code() {
        // ---
        assert_eq!(classify_at(Some("OK"), Some(&seen(45))), SensorStatus::Offline);
        assert_eq!(classify_at(Some("FAULTY"), Some(&seen(45))), SensorStatus::Offline);
    }

    #[test]
    fn explicit_offline_code_stays_offline_even_when_fresh() {
        // ---
        assert_eq!(classify_at(Some("OFFLINE"), Some(&seen(0))), SensorStatus::Offline);
        assert_eq!(classify_at(Some("FAULTY"), Some(&seen(0))), SensorStatus::Offline);
    }

    #[test]
    fn unknown_code_is_treated_as_offline() {
        // ---
        // A stale-but-not-offline age must not upgrade a non-normal base.
        assert_eq!(classify_at(Some("DEGRADED"), Some(&seen(15))), SensorStatus::Offline);
    }

    #[test]
    fn missing_everything_is_offline() {
        assert_eq!(classify_at(None, None), SensorStatus::Offline);
    }

    #[test]
    fn missing_last_seen_keeps_the_status_code_base() {
        // ---
        assert_eq!(classify_at(Some("OK"), None), SensorStatus::Normal);
        assert_eq!(classify_at(Some("OFFLINE"), None), SensorStatus::Offline);
    }

    #[test]
    fn unparseable_last_seen_is_fail_safe() {
        // ---
        assert_eq!(classify_at(Some("OK"), Some("not-a-date")), SensorStatus::Offline);
    }

    #[test]
    fn legacy_space_separated_timestamps_parse() {
        // ---
        assert_eq!(
            classify_at(Some("OK"), Some("2025-06-15 11:59:00")),
            SensorStatus::Normal
        );
    }

    #[test]
    fn custom_thresholds_are_respected() {
        // ---
        let tight = SensorThresholds { offline_minutes: 4, alert_minutes: 2 };
        assert_eq!(
            classify(Some("OK"), Some(&seen(3)), &tight, now()),
            SensorStatus::Alert
        );
        assert_eq!(
            classify(Some("OK"), Some(&seen(5)), &tight, now()),
            SensorStatus::Offline
        );
    }

    #[test]
    fn badge_labels() {
        // ---
        assert_eq!(SensorStatus::Normal.label(), "Online");
        assert_eq!(SensorStatus::Alert.label(), "Warning");
        assert_eq!(SensorStatus::Offline.label(), "Offline");
    }

    #[test]
    fn wire_form_is_lowercase() {
        // ---
        assert_eq!(serde_json::to_string(&SensorStatus::Alert).unwrap(), "\"alert\"");
    }
}
