// src/handlers/dashboard.rs
use std::sync::Arc;

use chrono::NaiveDate;
use log::{error, info};
use serde::{Deserialize, Serialize};
use warp::Rejection;

use crate::handlers::error::ApiError;
use crate::models::{DisplayMode, EconomicRecord, HeadlineMetric};
use crate::services::deltas::compute_deltas;
use crate::services::format::{group_thousands, group_thousands_signed};
use crate::services::normalize::{self, COL_APBD, COL_EXPORT, COL_INFLATION, COL_INFRA, COL_IPH, COL_PMA, COL_PMDN, COL_RICE};
use crate::services::sheets::SheetsStore;
use crate::services::timeseries::{QuarterFilter, SeriesPoint, TimeSeries};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub year: i32,
    pub mode: DisplayMode,
    /// Required only when `mode` is `single_quarter`.
    pub quarter: Option<u32>,
}

/// One headline metric for the summary strip: raw values plus the
/// grouped-thousands display text the metric widgets render.
#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub metric: &'static str,
    pub current: Option<u64>,
    pub delta: Option<i64>,
    pub current_text: Option<String>,
    pub delta_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One named line for the trend charts, points in ascending date order.
#[derive(Debug, Serialize)]
pub struct TrendSeries {
    pub name: &'static str,
    pub points: Vec<TrendPoint>,
}

/// A selection with no records is a valid outcome, reported with
/// `empty: true` so the UI can tell it apart from a store failure.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub year: i32,
    pub mode: DisplayMode,
    pub quarter: Option<u32>,
    pub empty: bool,
    pub summary: Vec<MetricSummary>,
    pub trends: Vec<TrendSeries>,
}

/// Resolve the query's mode/quarter pair into a period filter.
pub fn quarter_filter(mode: DisplayMode, quarter: Option<u32>) -> Result<QuarterFilter, String> {
    match mode {
        DisplayMode::WholeYear => Ok(QuarterFilter::All),
        DisplayMode::SingleQuarter => match quarter {
            Some(q @ 1..=4) => Ok(QuarterFilter::Quarter(q)),
            Some(q) => Err(format!("quarter must be 1-4, got {}", q)),
            None => Err("mode=single_quarter requires a quarter parameter".to_string()),
        },
    }
}

/// GET /api/v1/years — distinct years present in the series, ascending.
pub async fn get_years(store: Arc<SheetsStore>) -> Result<impl warp::Reply, Rejection> {
    let series = load_series(&store).await?;
    Ok(warp::reply::json(&series.years()))
}

/// GET /api/v1/dashboard?year=&mode=&quarter= — headline deltas and trend
/// series for the selected period.
pub async fn get_dashboard(
    query: DashboardQuery,
    store: Arc<SheetsStore>,
) -> Result<impl warp::Reply, Rejection> {
    let filter = quarter_filter(query.mode, query.quarter)
        .map_err(|msg| warp::reject::custom(ApiError::bad_request(msg)))?;

    let series = load_series(&store).await?;
    let points = series.select(query.year, filter);
    info!(
        "dashboard selection year={} mode={:?} quarter={:?}: {} records",
        query.year,
        query.mode,
        query.quarter,
        points.len()
    );

    if points.is_empty() {
        return Ok(warp::reply::json(&DashboardResponse {
            year: query.year,
            mode: query.mode,
            quarter: query.quarter,
            empty: true,
            summary: Vec::new(),
            trends: Vec::new(),
        }));
    }

    let deltas = compute_deltas(&points, &HeadlineMetric::ALL);
    let summary = HeadlineMetric::ALL
        .iter()
        .map(|metric| {
            let d = &deltas[metric];
            MetricSummary {
                metric: metric.as_str(),
                current: d.current,
                delta: d.delta,
                current_text: d.current.map(group_thousands),
                delta_text: d.delta.map(group_thousands_signed),
            }
        })
        .collect();

    Ok(warp::reply::json(&DashboardResponse {
        year: query.year,
        mode: query.mode,
        quarter: query.quarter,
        empty: false,
        summary,
        trends: trend_series(&points),
    }))
}

async fn load_series(store: &Arc<SheetsStore>) -> Result<TimeSeries, Rejection> {
    let rows = store.load().await.map_err(|e| {
        error!("failed to load sheet rows: {}", e);
        warp::reject::custom(ApiError::store(e.to_string()))
    })?;
    let records: Vec<EconomicRecord> = rows
        .iter()
        .filter_map(normalize::normalize_row)
        .collect();
    Ok(TimeSeries::build(&records))
}

/// Ordered `(date, value)` pairs per chart line. Missing values are skipped
/// rather than plotted as zero.
fn trend_series(points: &[&SeriesPoint]) -> Vec<TrendSeries> {
    fn line(
        points: &[&SeriesPoint],
        name: &'static str,
        pick: fn(&EconomicRecord) -> Option<f64>,
    ) -> TrendSeries {
        TrendSeries {
            name,
            points: points
                .iter()
                .filter_map(|p| {
                    pick(&p.record).map(|value| TrendPoint {
                        date: p.date,
                        value,
                    })
                })
                .collect(),
        }
    }

    vec![
        line(points, COL_APBD, |r| r.apbd_realization.map(|v| v as f64)),
        line(points, COL_PMA, |r| r.pma_realization.map(|v| v as f64)),
        line(points, COL_PMDN, |r| r.pmdn_realization.map(|v| v as f64)),
        line(points, COL_INFRA, |r| r.infra_spending.map(|v| v as f64)),
        line(points, COL_EXPORT, |r| r.export_value.map(|v| v as f64)),
        line(points, COL_RICE, |r| r.rice_production.map(|v| v as f64)),
        line(points, COL_IPH, |r| r.iph_weekly),
        line(points, COL_INFLATION, |r| r.inflation_monthly),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_year_ignores_quarter() {
        assert_eq!(
            quarter_filter(DisplayMode::WholeYear, None).unwrap(),
            QuarterFilter::All
        );
        assert_eq!(
            quarter_filter(DisplayMode::WholeYear, Some(2)).unwrap(),
            QuarterFilter::All
        );
    }

    #[test]
    fn single_quarter_requires_a_valid_quarter() {
        assert_eq!(
            quarter_filter(DisplayMode::SingleQuarter, Some(3)).unwrap(),
            QuarterFilter::Quarter(3)
        );
        assert!(quarter_filter(DisplayMode::SingleQuarter, Some(5)).is_err());
        assert!(quarter_filter(DisplayMode::SingleQuarter, None).is_err());
    }

    #[test]
    fn trends_skip_missing_values() {
        let record_full = EconomicRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 1),
            apbd_realization: Some(100),
            ..EconomicRecord::default()
        };
        let record_hole = EconomicRecord {
            date: NaiveDate::from_ymd_opt(2023, 4, 1),
            apbd_realization: None,
            ..EconomicRecord::default()
        };
        let series = TimeSeries::build(&[record_full, record_hole]);
        let points: Vec<&SeriesPoint> = series.points().iter().collect();
        let trends = trend_series(&points);
        let apbd = trends.iter().find(|t| t.name == COL_APBD).unwrap();
        assert_eq!(apbd.points.len(), 1);
        assert_eq!(apbd.points[0].value, 100.0);
    }
}
