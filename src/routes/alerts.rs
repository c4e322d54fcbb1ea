//! Alert history endpoints.
//!
//! This module owns everything under `/alerts`: the filtered, paginated
//! history view, the type-count stat used by the dashboard cards, and the
//! bus autocomplete suggestions. It is a sibling module in the `routes`
//! directory and follows the Explicit Module Boundary Pattern (EMBP):
//! handlers stay private, the gateway (`mod.rs`) only sees the subrouter.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::date_range::{resolve, DateRangeToken};
use crate::filter::{bus_suggestions, filter_alerts, paginate, AlertQuery};
use crate::{AlertRecord, Config, UpstreamClient};

// ---

pub fn router() -> Router<(UpstreamClient, Config)> {
    // ---
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/count", get(count_alerts))
        .route("/alerts/buses", get(list_bus_suggestions))
}

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize)]
struct AlertsParams {
    // ---
    bus: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    date_range: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    page: Option<usize>,
}

/// Response body for `GET /alerts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlertsResponse {
    alerts: Vec<AlertRecord>,
    page: usize,
    page_count: usize,
    total: usize,
}

/// Summarized failure handed to the rendering layer. The view treats it as
/// "no data", a valid steady state, rather than a crash.
#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn bad_gateway(context: &str, err: impl std::fmt::Display) -> axum::response::Response {
    // ---
    error!("{context}: {err}");
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiError { error: "failed to fetch data from the fleet API".to_string() }),
    )
        .into_response()
}

async fn list_alerts(
    Query(params): Query<AlertsParams>,
    State((upstream, config)): State<(UpstreamClient, Config)>,
) -> impl IntoResponse {
    // ---
    info!(
        "GET /alerts - bus={:?} type={:?} range={:?} page={:?}",
        params.bus, params.event_type, params.date_range, params.page
    );

    let query = AlertQuery {
        bus: params.bus,
        event_type: params.event_type,
        date_range: params.date_range,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    if let Err(e) = query.validate() {
        return (StatusCode::BAD_REQUEST, Json(ApiError { error: e.to_string() }))
            .into_response();
    }

    let records = match upstream.fetch_alerts().await {
        Ok(records) => records,
        Err(e) => return bad_gateway("failed to fetch alerts", e),
    };

    let token = DateRangeToken::parse(query.date_range.as_deref().unwrap_or(""));
    let range = resolve(token, query.start_date, query.end_date);

    let filtered = filter_alerts(records, &query, &range);
    let page = paginate(&filtered, params.page.unwrap_or(1), config.page_size as usize);

    info!(
        "GET /alerts - serving page {}/{} of {} filtered alerts",
        page.page, page.page_count, page.total
    );

    (
        StatusCode::OK,
        Json(AlertsResponse {
            alerts: page.items,
            page: page.page,
            page_count: page.page_count,
            total: page.total,
        }),
    )
        .into_response()
}

// ---

#[derive(Debug, Deserialize)]
struct CountParams {
    #[serde(rename = "type")]
    event_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: usize,
}

/// Handle `GET /alerts/count`, optionally narrowed to one event type.
async fn count_alerts(
    Query(params): Query<CountParams>,
    State((upstream, _config)): State<(UpstreamClient, Config)>,
) -> impl IntoResponse {
    // ---
    let records = match upstream.fetch_alerts().await {
        Ok(records) => records,
        Err(e) => return bad_gateway("failed to fetch alerts for count", e),
    };

    let wanted = params.event_type.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let count = records
        .iter()
        .filter(|a| wanted.is_none_or(|t| a.alert_type == t))
        .count();

    (StatusCode::OK, Json(CountResponse { count })).into_response()
}

/// Handle `GET /alerts/buses`: unique registration numbers for the search
/// box autocomplete, in first-seen order.
async fn list_bus_suggestions(
    State((upstream, _config)): State<(UpstreamClient, Config)>,
) -> impl IntoResponse {
    // ---
    match upstream.fetch_alerts().await {
        Ok(records) => (StatusCode::OK, Json(bus_suggestions(&records))).into_response(),
        Err(e) => bad_gateway("failed to fetch alerts for suggestions", e),
    }
}
