//! Dashboard and per-bus detail endpoints.
//!
//! `/dashboard` serves the fleet overview with each bus's sensor-health
//! badge derived at request time; `/buses/{id}/details` serves a bus's
//! reading feed for the fuel chart along with the notable-event subset.
//! Sibling module of `routes` under EMBP: only the subrouter is exported.

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::date_range::{resolve, DateRangeToken};
use crate::models::{BusSummary, Reading};
use crate::{Config, UpstreamClient};

// ---

pub fn router() -> Router<(UpstreamClient, Config)> {
    // ---
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/buses/{bus_id}/details", get(get_bus_details))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    total_buses: u64,
    top_buses: Vec<BusSummary>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

/// Handle `GET /dashboard`.
///
/// Health badges are recomputed from the raw telemetry on every call; the
/// upstream snapshot never carries a derived status of its own.
async fn get_dashboard(
    State((upstream, config)): State<(UpstreamClient, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /dashboard");

    let snapshot = match upstream.fetch_dashboard().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("failed to fetch dashboard: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiError { error: "failed to fetch data from the fleet API".to_string() }),
            )
                .into_response();
        }
    };

    let thresholds = config.sensor_thresholds();
    let now = Utc::now();
    let top_buses: Vec<BusSummary> = snapshot
        .top_buses
        .into_iter()
        .map(|raw| raw.into_summary(&thresholds, now))
        .collect();

    (
        StatusCode::OK,
        Json(DashboardResponse { total_buses: snapshot.total_buses, top_buses }),
    )
        .into_response()
}

// ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BusDetailsResponse {
    readings: Vec<Reading>,
    /// Readings that carried a real event marker, for the chart overlay.
    events: Vec<Reading>,
}

/// Handle `GET /buses/{bus_id}/details`.
///
/// The detail view always shows the trailing week, so the range is resolved
/// here and passed upstream as concrete instants.
async fn get_bus_details(
    Path(bus_id): Path<String>,
    State((upstream, _config)): State<(UpstreamClient, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /buses/{bus_id}/details");

    let range = resolve(DateRangeToken::Week, None, None);
    let readings = match upstream.fetch_bus_details(&bus_id, &range).await {
        Ok(readings) => readings,
        Err(e) => {
            error!("failed to fetch details for bus {bus_id}: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiError { error: "failed to fetch data from the fleet API".to_string() }),
            )
                .into_response();
        }
    };

    let events: Vec<Reading> = readings.iter().filter(|r| r.is_notable()).cloned().collect();

    (StatusCode::OK, Json(BusDetailsResponse { readings, events })).into_response()
}
