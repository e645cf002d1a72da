use chrono::Duration;
use serde::Serialize;

use super::scale::{ScaleCell, TimeUnit};
use crate::model::task::DateSpan;

/// Pixel-space geometry of a task bar along the axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarGeometry {
    pub x: f64,
    pub width: f64,
}

/// Minimum bar width as a fraction of one cell, so zero-duration tasks
/// (milestones) stay visible and clickable.
const MIN_WIDTH_RATIO: f64 = 0.1;

/// Map a date span onto the axis cells.
///
/// Day granularity snaps to whole cells: each day is atomic and positions
/// are exact multiples of `cell_width + cell_gap`. Coarser units
/// interpolate proportionally inside the cell containing each boundary.
/// Dates outside the axis clamp to the first/last cell.
pub fn map_position(
    span: DateSpan,
    cells: &[ScaleCell],
    cell_width: f64,
    cell_gap: f64,
    unit: TimeUnit,
) -> BarGeometry {
    if cells.is_empty() {
        return BarGeometry {
            x: 0.0,
            width: cell_width,
        };
    }
    match unit {
        TimeUnit::Day => grid_snapped(span, cells, cell_width, cell_gap),
        _ => proportional(span, cells, cell_width, cell_gap),
    }
}

/// Day zoom: match boundary dates to cell indices exactly. The end index is
/// one past the matched cell so the final day renders at full width.
fn grid_snapped(span: DateSpan, cells: &[ScaleCell], w: f64, gap: f64) -> BarGeometry {
    let len = cells.len();
    let origin = cells[0].date;

    let start_index = cells
        .iter()
        .position(|c| c.date == span.start)
        .unwrap_or_else(|| {
            // Out of range: day cells are consecutive, so the day offset
            // from the origin is the index; clamp it onto the axis.
            (span.start - origin).num_days().clamp(0, len as i64 - 1) as usize
        });

    let end_index = cells
        .iter()
        .position(|c| c.date == span.end)
        .map(|i| i + 1)
        .unwrap_or_else(|| {
            let days = (span.end - origin).num_days() + 1;
            days.clamp(start_index as i64 + 1, len as i64) as usize
        });

    let x = start_index as f64 * (w + gap);
    let end_x = end_index as f64 * (w + gap) - gap;
    BarGeometry {
        x,
        width: (end_x - x).max(MIN_WIDTH_RATIO * w),
    }
}

/// Week/month/quarter/year zoom: locate the cell containing each boundary
/// and interpolate linearly within it. The inclusive end date becomes
/// exclusive by adding one day before interpolating, so a task ending on a
/// cell boundary fills its final cell instead of collapsing.
fn proportional(span: DateSpan, cells: &[ScaleCell], w: f64, gap: f64) -> BarGeometry {
    let len = cells.len();
    let last = len - 1;

    let start_index = if span.start < cells[0].date {
        0
    } else {
        (0..last)
            .find(|&i| span.start >= cells[i].date && span.start < cells[i + 1].date)
            .unwrap_or(last)
    };
    let mut x = start_index as f64 * (w + gap);
    if start_index < last {
        let cell_days = (cells[start_index + 1].date - cells[start_index].date).num_days() as f64;
        let offset = (span.start - cells[start_index].date).num_days() as f64;
        x += (offset / cell_days).clamp(0.0, 1.0) * w;
    }

    let end_index = (0..last)
        .find(|&i| span.end > cells[i].date && span.end <= cells[i + 1].date)
        .map(|i| i + 1)
        .unwrap_or(if span.end >= cells[last].date { len } else { 1 });
    let mut end_x = end_index as f64 * (w + gap) - gap;
    if end_index > 0 && end_index < len {
        let cell_date = cells[end_index - 1].date;
        let cell_days = (cells[end_index].date - cell_date).num_days() as f64;
        let inclusive_end = span.end + Duration::days(1);
        let frac = ((inclusive_end - cell_date).num_days() as f64 / cell_days).clamp(0.0, 1.0);
        end_x = (end_index - 1) as f64 * (w + gap) + frac * w;
    }

    BarGeometry {
        x,
        width: (end_x - x).max(MIN_WIDTH_RATIO * w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::scale::generate_scale;
    use chrono::NaiveDate;

    const W: f64 = 100.0;
    const GAP: f64 = 2.0;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_day_zoom_single_day_snaps_to_its_cell() {
        let cells = generate_scale(date(2025, 1, 10), date(2025, 1, 20), TimeUnit::Day);
        let span = DateSpan::on(cells[2].date);
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Day);
        assert!(close(geometry.x, 2.0 * (W + GAP)));
        assert!(close(geometry.width, W));
    }

    #[test]
    fn test_day_zoom_multi_day_span() {
        let cells = generate_scale(date(2025, 1, 10), date(2025, 1, 20), TimeUnit::Day);
        let span = DateSpan::new(cells[1].date, cells[3].date);
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Day);
        assert!(close(geometry.x, W + GAP));
        // Three full cells plus the two interior gaps
        assert!(close(geometry.width, 3.0 * W + 2.0 * GAP));
    }

    #[test]
    fn test_day_zoom_clamps_out_of_range() {
        let cells = generate_scale(date(2025, 1, 10), date(2025, 1, 20), TimeUnit::Day);
        let span = DateSpan::new(date(2025, 1, 1), date(2025, 1, 11));
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Day);
        assert!(close(geometry.x, 0.0));
        let span = DateSpan::new(date(2025, 1, 19), date(2025, 2, 15));
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Day);
        let end_of_axis = cells.len() as f64 * (W + GAP) - GAP;
        assert!(close(geometry.x + geometry.width, end_of_axis));
    }

    #[test]
    fn test_month_zoom_full_month_fills_its_cell() {
        // Cells: Dec 2024, Jan, Feb, Mar, Apr 2025
        let cells = generate_scale(date(2025, 1, 15), date(2025, 3, 20), TimeUnit::Month);
        let span = DateSpan::new(date(2025, 2, 1), date(2025, 2, 28));
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Month);
        assert!(close(geometry.x, 2.0 * (W + GAP)));
        assert!(close(geometry.width, W));
    }

    #[test]
    fn test_month_zoom_interpolates_partial_month() {
        let cells = generate_scale(date(2025, 1, 15), date(2025, 3, 20), TimeUnit::Month);
        // Jan 16 .. Jan 31: starts 15/31 into the January cell
        let span = DateSpan::new(date(2025, 1, 16), date(2025, 1, 31));
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Month);
        assert!(close(geometry.x, (W + GAP) + 15.0 / 31.0 * W));
        assert!(close(geometry.width, 16.0 / 31.0 * W));
    }

    #[test]
    fn test_zero_duration_gets_minimum_width() {
        let cells = generate_scale(date(2025, 1, 15), date(2025, 3, 20), TimeUnit::Month);
        let span = DateSpan::on(date(2025, 2, 10));
        let geometry = map_position(span, &cells, W, GAP, TimeUnit::Month);
        assert!(close(geometry.width, MIN_WIDTH_RATIO * W));
    }

    #[test]
    fn test_empty_axis_returns_default_geometry() {
        let span = DateSpan::on(date(2025, 2, 10));
        let geometry = map_position(span, &[], W, GAP, TimeUnit::Month);
        assert_eq!(geometry, BarGeometry { x: 0.0, width: W });
    }
}
