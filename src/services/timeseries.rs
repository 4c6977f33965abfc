// src/services/timeseries.rs
//
// Builds the ordered quarterly time series from normalized records and
// answers period selections against it. Building is pure: the same input
// always yields the same series.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::EconomicRecord;

/// One dated observation with its derived calendar attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub year: i32,
    pub quarter: u32,
    pub record: EconomicRecord,
}

/// Period filter for a selected year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterFilter {
    All,
    Quarter(u32),
}

/// Records ordered ascending by date. The order is load-bearing: the delta
/// calculator reads "previous period" as the second-to-last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

impl TimeSeries {
    /// Records without a parseable date stay in storage but never enter the
    /// series, so they are invisible to every period-filtered view.
    pub fn build(records: &[EconomicRecord]) -> TimeSeries {
        let mut points: Vec<SeriesPoint> = records
            .iter()
            .filter_map(|record| {
                let date = record.date?;
                Some(SeriesPoint {
                    date,
                    year: date.year(),
                    quarter: quarter_of(date),
                    record: record.clone(),
                })
            })
            .collect();
        // Stable sort: same-date entries keep their sheet order.
        points.sort_by_key(|p| p.date);
        TimeSeries { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct years present in the series, ascending. Feeds the year picker.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.points.iter().map(|p| p.year).collect();
        years.dedup();
        years
    }

    /// All points for the given year, optionally narrowed to one quarter,
    /// in ascending date order. An empty result is a valid outcome.
    pub fn select(&self, year: i32, filter: QuarterFilter) -> Vec<&SeriesPoint> {
        self.points
            .iter()
            .filter(|p| p.year == year)
            .filter(|p| match filter {
                QuarterFilter::All => true,
                QuarterFilter::Quarter(q) => p.quarter == q,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: Option<NaiveDate>, apbd: u64) -> EconomicRecord {
        EconomicRecord {
            date,
            apbd_realization: Some(apbd),
            ..EconomicRecord::default()
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(quarter_of(d(2023, 1, 1)), 1);
        assert_eq!(quarter_of(d(2023, 3, 31)), 1);
        assert_eq!(quarter_of(d(2023, 4, 1)), 2);
        assert_eq!(quarter_of(d(2023, 6, 30)), 2);
        assert_eq!(quarter_of(d(2023, 7, 1)), 3);
        assert_eq!(quarter_of(d(2023, 10, 1)), 4);
        assert_eq!(quarter_of(d(2023, 12, 31)), 4);
    }

    #[test]
    fn build_sorts_ascending_and_is_deterministic() {
        let records = vec![
            record(Some(d(2023, 10, 1)), 3),
            record(Some(d(2023, 1, 1)), 1),
            record(Some(d(2023, 4, 1)), 2),
        ];
        let series = TimeSeries::build(&records);
        let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2023, 1, 1), d(2023, 4, 1), d(2023, 10, 1)]);
        assert_eq!(series, TimeSeries::build(&records));
    }

    #[test]
    fn dateless_records_are_excluded_from_the_series() {
        let records = vec![record(None, 7), record(Some(d(2023, 1, 1)), 1)];
        let series = TimeSeries::build(&records);
        assert_eq!(series.points().len(), 1);
        assert!(series.select(2023, QuarterFilter::All).len() == 1);
    }

    #[test]
    fn whole_year_equals_union_of_quarters() {
        let records = vec![
            record(Some(d(2023, 2, 1)), 1),
            record(Some(d(2023, 5, 1)), 2),
            record(Some(d(2023, 8, 1)), 3),
            record(Some(d(2023, 11, 1)), 4),
            record(Some(d(2022, 11, 1)), 9),
        ];
        let series = TimeSeries::build(&records);

        let whole: Vec<NaiveDate> = series
            .select(2023, QuarterFilter::All)
            .iter()
            .map(|p| p.date)
            .collect();
        let mut union: Vec<NaiveDate> = Vec::new();
        for q in 1..=4 {
            union.extend(
                series
                    .select(2023, QuarterFilter::Quarter(q))
                    .iter()
                    .map(|p| p.date),
            );
        }
        union.sort();
        assert_eq!(whole, union);
        assert_eq!(whole.len(), 4);
    }

    #[test]
    fn empty_selection_is_valid() {
        let series = TimeSeries::build(&[record(Some(d(2023, 2, 1)), 1)]);
        assert!(series.select(2020, QuarterFilter::All).is_empty());
        assert!(series.select(2023, QuarterFilter::Quarter(3)).is_empty());
    }

    #[test]
    fn bad_date_rows_survive_storage_but_never_reach_a_view() {
        use crate::services::normalize::{normalize_row, COL_APBD, COL_DATE};
        use crate::services::sheets::{header_for, rows_from_values, values_for};
        use crate::models::RawRow;

        let mut good = RawRow::new();
        good.push(COL_DATE, "01/02/2023");
        good.push(COL_APBD, "100");
        let mut bad = RawRow::new();
        bad.push(COL_DATE, "sometime in March");
        bad.push(COL_APBD, "250");
        let rows = vec![good, bad];

        // Storage round trip keeps both rows intact.
        let header = header_for(&rows);
        let grid: Vec<serde_json::Value> = values_for(&header, &rows)
            .into_iter()
            .map(|cells| serde_json::json!(cells))
            .collect();
        let decoded = rows_from_values(&grid).unwrap();
        assert_eq!(decoded, rows);

        // But the dateless record is invisible to every period view.
        let records: Vec<EconomicRecord> =
            decoded.iter().filter_map(normalize_row).collect();
        assert_eq!(records.len(), 2);
        let series = TimeSeries::build(&records);
        assert_eq!(series.points().len(), 1);
        assert_eq!(series.select(2023, QuarterFilter::All).len(), 1);
    }

    #[test]
    fn years_are_distinct_and_ascending() {
        let records = vec![
            record(Some(d(2024, 2, 1)), 1),
            record(Some(d(2022, 5, 1)), 2),
            record(Some(d(2022, 8, 1)), 3),
        ];
        let series = TimeSeries::build(&records);
        assert_eq!(series.years(), vec![2022, 2024]);
    }
}
