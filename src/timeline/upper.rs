use std::hash::Hash;

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use super::scale::{MONTH_LABELS, ScaleCell, TimeUnit, quarter_of};

/// A higher-order band spanning a run of consecutive base cells.
/// `level` orders the bands top to bottom (0 = coarsest).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpperScale {
    pub label: String,
    pub start_index: usize,
    pub span: usize,
    pub level: u8,
}

/// Group base cells into the coarser header bands shown above the axis.
///
/// Which levels exist depends on the base unit: a month axis gets year and
/// quarter bands, a day axis gets year, quarter, month, and ISO-week bands,
/// and a year axis gets none. Spans are counted from the cells actually
/// present, never assumed constant, and each higher-unit key yields exactly
/// one band even though cells are scanned sequentially.
pub fn generate_upper_scales(cells: &[ScaleCell], unit: TimeUnit) -> Vec<UpperScale> {
    if cells.is_empty() {
        return Vec::new();
    }

    let mut bands = Vec::new();
    match unit {
        TimeUnit::Month => {
            bands.extend(band_by(cells, 0, year_key, year_label));
            bands.extend(band_by(cells, 1, quarter_key, quarter_label));
        }
        TimeUnit::Quarter => {
            bands.extend(band_by(cells, 0, year_key, year_label));
        }
        TimeUnit::Week => {
            bands.extend(band_by(cells, 0, year_key, year_label));
            bands.extend(band_by(cells, 1, quarter_key, quarter_label));
            bands.extend(band_by(cells, 2, month_key, month_label));
        }
        TimeUnit::Day => {
            bands.extend(band_by(cells, 0, year_key, year_label));
            bands.extend(band_by(cells, 1, quarter_key, quarter_label));
            bands.extend(band_by(cells, 2, month_key, month_label));
            bands.extend(band_by(cells, 3, week_key, week_label));
        }
        TimeUnit::Year => {}
    }
    bands
}

/// Scan the cells once, accumulating one band per distinct key. The
/// insertion-ordered map keeps bands in first-encounter order, which is what
/// deduplicates runs without a second pass.
fn band_by<K>(
    cells: &[ScaleCell],
    level: u8,
    key: fn(NaiveDate) -> K,
    label: fn(NaiveDate) -> String,
) -> Vec<UpperScale>
where
    K: Hash + Eq,
{
    let mut bands: IndexMap<K, UpperScale> = IndexMap::new();
    for (index, cell) in cells.iter().enumerate() {
        bands
            .entry(key(cell.date))
            .or_insert_with(|| UpperScale {
                label: label(cell.date),
                start_index: index,
                span: 0,
                level,
            })
            .span += 1;
    }
    bands.into_values().collect()
}

fn year_key(date: NaiveDate) -> i32 {
    date.year()
}

fn year_label(date: NaiveDate) -> String {
    date.year().to_string()
}

fn quarter_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), quarter_of(date))
}

fn quarter_label(date: NaiveDate) -> String {
    format!("Q{}", quarter_of(date))
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn month_label(date: NaiveDate) -> String {
    MONTH_LABELS[date.month0() as usize].to_string()
}

/// ISO week-year pairs the key with the week's own year, so the days of a
/// year-straddling week always land in one band.
fn week_key(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

fn week_label(date: NaiveDate) -> String {
    format!("W{}", date.iso_week().week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::scale::generate_scale;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn find<'a>(bands: &'a [UpperScale], level: u8, label: &str) -> &'a UpperScale {
        bands
            .iter()
            .find(|b| b.level == level && b.label == label)
            .unwrap()
    }

    #[test]
    fn test_month_axis_gets_year_and_quarter_bands() {
        // Dec 2024 .. Apr 2025, five cells
        let cells = generate_scale(date(2025, 1, 15), date(2025, 3, 20), TimeUnit::Month);
        let bands = generate_upper_scales(&cells, TimeUnit::Month);

        let y2024 = find(&bands, 0, "2024");
        assert_eq!((y2024.start_index, y2024.span), (0, 1));
        let y2025 = find(&bands, 0, "2025");
        assert_eq!((y2025.start_index, y2025.span), (1, 4));

        let q4 = find(&bands, 1, "Q4");
        assert_eq!((q4.start_index, q4.span), (0, 1));
        let q1 = find(&bands, 1, "Q1");
        assert_eq!((q1.start_index, q1.span), (1, 3));
        let q2 = find(&bands, 1, "Q2");
        assert_eq!((q2.start_index, q2.span), (4, 1));
    }

    #[test]
    fn test_each_key_appears_once() {
        let cells = generate_scale(date(2024, 11, 1), date(2025, 2, 28), TimeUnit::Week);
        let bands = generate_upper_scales(&cells, TimeUnit::Week);
        let mut seen = std::collections::HashSet::new();
        for band in &bands {
            assert!(
                seen.insert((band.level, band.label.clone(), band.start_index)),
                "duplicate band {:?}",
                band
            );
        }
        // Spans at each level must cover every cell exactly once.
        for level in 0..=2 {
            let total: usize = bands
                .iter()
                .filter(|b| b.level == level)
                .map(|b| b.span)
                .sum();
            assert_eq!(total, cells.len(), "level {}", level);
        }
    }

    #[test]
    fn test_day_axis_week_band_crosses_year_boundary() {
        // Dec 30 2024 .. Jan 2 2025 all belong to ISO week 1 of 2025.
        let cells = generate_scale(date(2024, 12, 30), date(2025, 1, 2), TimeUnit::Day);
        assert_eq!(cells.len(), 4);
        let bands = generate_upper_scales(&cells, TimeUnit::Day);

        let weeks: Vec<_> = bands.iter().filter(|b| b.level == 3).collect();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].label, "W1");
        assert_eq!((weeks[0].start_index, weeks[0].span), (0, 4));

        let dec = find(&bands, 2, "12월");
        assert_eq!((dec.start_index, dec.span), (0, 2));
        let jan = find(&bands, 2, "1월");
        assert_eq!((jan.start_index, jan.span), (2, 2));
    }

    #[test]
    fn test_quarter_axis_gets_year_bands_only() {
        let cells = generate_scale(date(2025, 1, 15), date(2025, 3, 20), TimeUnit::Quarter);
        let bands = generate_upper_scales(&cells, TimeUnit::Quarter);
        assert!(bands.iter().all(|b| b.level == 0));
        let y2025 = find(&bands, 0, "2025");
        assert_eq!((y2025.start_index, y2025.span), (1, 2));
    }

    #[test]
    fn test_year_axis_has_no_upper_bands() {
        let cells = generate_scale(date(2025, 1, 1), date(2025, 12, 31), TimeUnit::Year);
        assert!(generate_upper_scales(&cells, TimeUnit::Year).is_empty());
    }
}
