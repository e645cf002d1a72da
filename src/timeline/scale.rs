use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Zoom granularity of the timeline axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
        }
    }

    /// Parse a wire/CLI name into a unit
    pub fn parse(s: &str) -> Option<TimeUnit> {
        match s {
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "quarter" => Some(TimeUnit::Quarter),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic cell of the time axis at the current zoom unit.
/// `date` is the cell's first day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleCell {
    pub date: NaiveDate,
    pub label: String,
    /// Saturday/Sunday; only ever set at day granularity
    pub is_weekend: bool,
}

/// Month labels as rendered on the axis
pub(crate) const MONTH_LABELS: [&str; 12] = [
    "1월", "2월", "3월", "4월", "5월", "6월", "7월", "8월", "9월", "10월", "11월", "12월",
];

// ---------------------------------------------------------------------------
// Date snapping helpers
//
// All of these are plain Duration arithmetic so none of them can fail; the
// fallible NaiveDate constructors are avoided on purpose.
// ---------------------------------------------------------------------------

/// First day of the date's month.
pub(crate) fn month_floor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// First day of the month after the given first-of-month.
pub(crate) fn next_month(first: NaiveDate) -> NaiveDate {
    // 32 days always lands inside the following month
    month_floor(first + Duration::days(32))
}

pub(crate) fn prev_month(first: NaiveDate) -> NaiveDate {
    month_floor(first - Duration::days(1))
}

/// First day of the date's quarter.
pub(crate) fn quarter_floor(date: NaiveDate) -> NaiveDate {
    let mut first = month_floor(date);
    for _ in 0..date.month0() % 3 {
        first = prev_month(first);
    }
    first
}

pub(crate) fn next_quarter(first: NaiveDate) -> NaiveDate {
    next_month(next_month(next_month(first)))
}

pub(crate) fn prev_quarter(first: NaiveDate) -> NaiveDate {
    prev_month(prev_month(prev_month(first)))
}

/// January 1st of the date's year.
pub(crate) fn year_floor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.ordinal0() as i64)
}

pub(crate) fn next_year(first: NaiveDate) -> NaiveDate {
    // 370 days clears a leap year
    year_floor(first + Duration::days(370))
}

pub(crate) fn prev_year(first: NaiveDate) -> NaiveDate {
    year_floor(first - Duration::days(1))
}

/// The Sunday on or before the date (axis weeks anchor on Sunday).
pub(crate) fn week_floor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Quarter number 1-4.
pub(crate) fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

// ---------------------------------------------------------------------------
// Scale generation
// ---------------------------------------------------------------------------

/// Generate the ordered cell sequence covering `[start, end]` at the given
/// unit.
///
/// The range is first snapped outward to unit boundaries, then extended by
/// exactly one extra unit on each side so a task bar touching the edge of
/// the visible range still renders unclipped. Day granularity is the
/// exception: it is not extended, preserving exact project boundaries.
pub fn generate_scale(start: NaiveDate, end: NaiveDate, unit: TimeUnit) -> Vec<ScaleCell> {
    let (snap_start, snap_end) = snap_range(start, end, unit);
    let (lo, hi) = extend_range(snap_start, snap_end, unit);

    let mut cells = Vec::new();
    let mut current = lo;
    while current < hi {
        cells.push(make_cell(current, unit));
        current = advance(current, unit);
    }
    cells
}

/// Snap `[start, end]` outward to unit boundaries. The returned end bound
/// is exclusive (the first day past the covered range).
fn snap_range(start: NaiveDate, end: NaiveDate, unit: TimeUnit) -> (NaiveDate, NaiveDate) {
    match unit {
        TimeUnit::Day => (start, end + Duration::days(1)),
        TimeUnit::Week => {
            let days_past = end.weekday().num_days_from_sunday() as i64;
            (week_floor(start), end + Duration::days(7 - days_past))
        }
        TimeUnit::Month => (month_floor(start), next_month(month_floor(end))),
        TimeUnit::Quarter => (quarter_floor(start), next_quarter(quarter_floor(end))),
        TimeUnit::Year => (year_floor(start), next_year(year_floor(end))),
    }
}

/// Add one buffer unit on each side (day granularity excepted).
fn extend_range(lo: NaiveDate, hi: NaiveDate, unit: TimeUnit) -> (NaiveDate, NaiveDate) {
    match unit {
        TimeUnit::Day => (lo, hi),
        TimeUnit::Week => (lo - Duration::days(7), hi + Duration::days(7)),
        TimeUnit::Month => (prev_month(lo), next_month(hi)),
        TimeUnit::Quarter => (prev_quarter(lo), next_quarter(hi)),
        TimeUnit::Year => (prev_year(lo), next_year(hi)),
    }
}

fn advance(current: NaiveDate, unit: TimeUnit) -> NaiveDate {
    match unit {
        TimeUnit::Day => current + Duration::days(1),
        TimeUnit::Week => current + Duration::days(7),
        TimeUnit::Month => next_month(current),
        TimeUnit::Quarter => next_quarter(current),
        TimeUnit::Year => next_year(current),
    }
}

fn make_cell(date: NaiveDate, unit: TimeUnit) -> ScaleCell {
    let label = match unit {
        TimeUnit::Day => date.day().to_string(),
        // ISO 8601 numbering: the week belongs to the year of its Thursday,
        // so late-December days can land in week 1 of the next year.
        TimeUnit::Week => format!("W{}", date.iso_week().week()),
        TimeUnit::Month => MONTH_LABELS[date.month0() as usize].to_string(),
        TimeUnit::Quarter => format!("Q{}", quarter_of(date)),
        TimeUnit::Year => date.year().to_string(),
    };
    let is_weekend = unit == TimeUnit::Day
        && matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    ScaleCell {
        date,
        label,
        is_weekend,
    }
}
