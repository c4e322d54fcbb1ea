//! Alert filtering and pagination.
//!
//! The pipeline narrows an in-memory alert collection with three AND-composed
//! predicates (bus identity, event type, date range) and then slices the
//! result into fixed-size pages. Filtering is pure and order-preserving:
//! the output keeps the source collection's order and depends only on the
//! records' own fields and the query, so re-running it on every input change
//! is safe and cheap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_range::ResolvedRange;
use crate::error::FetchError;
use crate::models::AlertRecord;

// ---

/// Filter inputs for the alert history view.
///
/// `PartialEq` is part of the contract: callers that hold paging state
/// compare the previous and current query to know when to snap back to
/// page 1 (see [`effective_page`]).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlertQuery {
    // ---
    /// Bus registration search string. Required before anything is shown.
    #[serde(default)]
    pub bus: Option<String>,

    /// Exact event-type tag; empty means all types.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,

    /// Raw date-range token as the dropdown sent it.
    #[serde(default)]
    pub date_range: Option<String>,

    /// Custom range boundaries, used only when the token is `custom`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl AlertQuery {
    /// The trimmed bus search term, `None` when no bus has been selected.
    pub fn bus_term(&self) -> Option<&str> {
        // ---
        self.bus
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Reject inputs no filter evaluation could make sense of.
    ///
    /// An inverted custom range is a caller mistake, not a remote fault, so
    /// it surfaces immediately instead of entering the retry loop.
    pub fn validate(&self) -> Result<(), FetchError> {
        // ---
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FetchError::Validation(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }
}

// ---

/// Apply the bus, event-type and date predicates, in that order.
///
/// An absent bus selection short-circuits to an empty result before any
/// predicate work: the alert history deliberately shows nothing until the
/// operator picks a bus, rather than dumping the whole fleet's alerts.
pub fn filter_alerts(
    records: Vec<AlertRecord>,
    query: &AlertQuery,
    range: &ResolvedRange,
) -> Vec<AlertRecord> {
    // ---
    let Some(term) = query.bus_term() else {
        return Vec::new();
    };
    let term = term.to_lowercase();

    let type_filter = query
        .event_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    records
        .into_iter()
        .filter(|alert| alert.bus.registration_no.to_lowercase().contains(&term))
        .filter(|alert| type_filter.is_none_or(|t| alert.alert_type == t))
        .filter(|alert| range.contains(alert.timestamp))
        .collect()
}

/// All registration numbers seen in the alert collection, first-seen order.
///
/// Feeds the bus search box's autocomplete list.
pub fn bus_suggestions(records: &[AlertRecord]) -> Vec<String> {
    // ---
    let mut suggestions: Vec<String> = Vec::new();
    for alert in records {
        let reg = &alert.bus.registration_no;
        if !reg.is_empty() && !suggestions.iter().any(|s| s == reg) {
            suggestions.push(reg.clone());
        }
    }
    suggestions
}

// ---

/// One page of a filtered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually served, after clamping.
    pub page: usize,
    pub page_count: usize,
    /// Size of the filtered set before paging.
    pub total: usize,
}

/// Slice `items` into the requested page.
///
/// A requested page beyond the last one clamps to the last page instead of
/// erroring or returning an empty slice; the result is only empty when the
/// filtered set itself is.
pub fn paginate<T: Clone>(items: &[T], requested_page: usize, page_size: usize) -> Page<T> {
    // ---
    let page_size = page_size.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size);
    let page = requested_page.clamp(1, page_count.max(1));

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let items = if start < total {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page { items, page, page_count, total }
}

/// The page a stateful caller should display next.
///
/// Any change to the filter inputs snaps the view back to page 1; only when
/// the query is unchanged does the requested page stand (still subject to
/// [`paginate`]'s clamping).
pub fn effective_page(
    previous: Option<&AlertQuery>,
    current: &AlertQuery,
    requested: usize,
) -> usize {
    // ---
    match previous {
        Some(prev) if prev == current => requested.max(1),
        _ => 1,
    }
}
