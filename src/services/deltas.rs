// src/services/deltas.rs
//
// Period-over-period deltas for the headline metrics. Read-only projection
// over an already-filtered, date-ascending slice of the series.

use std::collections::HashMap;

use crate::models::{HeadlineMetric, MetricDelta};
use crate::services::timeseries::SeriesPoint;

/// Latest value and latest-minus-previous delta per requested metric.
///
/// With a single point the previous period is clamped to the latest one, so
/// the delta is exactly zero rather than an error. A missing value on either
/// side of the subtraction yields a `None` delta; nulls never count as zero.
pub fn compute_deltas(
    points: &[&SeriesPoint],
    metrics: &[HeadlineMetric],
) -> HashMap<HeadlineMetric, MetricDelta> {
    let mut out = HashMap::new();
    let Some(&latest) = points.last() else {
        return out;
    };
    let previous = if points.len() >= 2 {
        points[points.len() - 2]
    } else {
        latest
    };

    for &metric in metrics {
        let current = metric.value(&latest.record);
        let delta = match (current, metric.value(&previous.record)) {
            (Some(cur), Some(prev)) => Some(cur as i64 - prev as i64),
            _ => None,
        };
        out.insert(metric, MetricDelta { current, delta });
    }
    out
}
