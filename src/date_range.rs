//! Resolution of human-facing time-window tokens into concrete instants.
//!
//! The dashboard's date dropdown speaks in tokens ("Today", "Last 7 Days",
//! "Custom"); the filter pipeline speaks in `[start, end]` instants. This
//! module bridges the two. Resolution is fail-open: a token we do not
//! recognize means "no date constraint", because a display fallback must
//! never hide all data from the user.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

// ---

/// Named time windows offered by the date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeToken {
    /// No date constraint at all.
    All,
    /// The current calendar day.
    Today,
    /// The full previous calendar day.
    Yesterday,
    /// Trailing 7-day window ending now.
    Week,
    /// Trailing 30-day window ending now.
    Month,
    /// Caller-supplied boundary dates.
    Custom,
}

impl DateRangeToken {
    /// Parse a token from user-facing text.
    ///
    /// Matching ignores case and surrounding whitespace and accepts the
    /// display labels the dropdown shows alongside the short token values.
    /// Anything unrecognized resolves to [`DateRangeToken::All`].
    pub fn parse(raw: &str) -> Self {
        // ---
        match raw.trim().to_lowercase().as_str() {
            "today" => DateRangeToken::Today,
            "yesterday" => DateRangeToken::Yesterday,
            "week" | "this week" | "last 7 days" => DateRangeToken::Week,
            "month" | "this month" | "last 30 days" => DateRangeToken::Month,
            "custom" | "custom range" => DateRangeToken::Custom,
            _ => DateRangeToken::All,
        }
    }
}

/// A resolved `[start, end]` pair, normalized to UTC.
///
/// Both bounds unset means "do not filter by date". The pipeline never sees
/// a half-set pair: resolution either produces both bounds or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ResolvedRange {
    /// The "no constraint" range.
    pub fn unbounded() -> Self {
        ResolvedRange { start: None, end: None }
    }

    /// Whether `ts` satisfies this range. Unset bounds pass everything;
    /// set bounds are inclusive on both ends.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        // ---
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= ts && ts <= end,
            _ => true,
        }
    }
}

// ---

/// Resolve a token against the local clock.
///
/// Calendar-day tokens ("Today", "Yesterday") use the machine's local
/// timezone, matching what the operator sees in the dropdown.
pub fn resolve(
    token: DateRangeToken,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
) -> ResolvedRange {
    resolve_at(token, custom_start, custom_end, &Local::now())
}

/// Resolve a token at an explicit `now`, in `now`'s timezone.
///
/// Pure: identical inputs always produce the identical range, which is what
/// lets the pipeline re-run filtering on every input change.
pub fn resolve_at<Tz: TimeZone>(
    token: DateRangeToken,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
    now: &DateTime<Tz>,
) -> ResolvedRange {
    // ---
    let tz = now.timezone();

    match token {
        DateRangeToken::All => ResolvedRange::unbounded(),

        DateRangeToken::Today => calendar_day(&tz, now.date_naive()),

        DateRangeToken::Yesterday => match now.date_naive().pred_opt() {
            Some(day) => calendar_day(&tz, day),
            // Day before the minimum representable date; nothing to bound.
            None => ResolvedRange::unbounded(),
        },

        DateRangeToken::Week => trailing_days(now, 7),

        DateRangeToken::Month => trailing_days(now, 30),

        // A half-specified custom range disables the date predicate entirely
        // rather than applying a one-sided bound.
        DateRangeToken::Custom => match (custom_start, custom_end) {
            (Some(start), Some(end)) => ResolvedRange {
                start: Some(day_floor(&tz, start)),
                end: Some(day_ceil(&tz, end)),
            },
            _ => ResolvedRange::unbounded(),
        },
    }
}

/// `[midnight, next midnight - 1ms]` of the given local day.
fn calendar_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> ResolvedRange {
    ResolvedRange {
        start: Some(day_floor(tz, day)),
        end: Some(day_ceil(tz, day)),
    }
}

/// `[now - days, now]`.
fn trailing_days<Tz: TimeZone>(now: &DateTime<Tz>, days: i64) -> ResolvedRange {
    // ---
    let end = now.with_timezone(&Utc);
    ResolvedRange {
        start: Some(end - Duration::days(days)),
        end: Some(end),
    }
}

/// Local midnight of `day`, as a UTC instant.
fn day_floor<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    to_utc(tz, day.and_time(NaiveTime::MIN))
}

/// Last representable millisecond of `day`, as a UTC instant.
fn day_ceil<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let end = day.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1);
    to_utc(tz, end)
}

/// Map a local wall-clock time to UTC, taking the earlier instant for
/// ambiguous DST transitions and falling back to a UTC reading for times
/// skipped by a transition.
fn to_utc<Tz: TimeZone>(tz: &Tz, naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    // ---
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
