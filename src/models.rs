// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One quarterly observation as entered through the form.
///
/// Every value field is optional: a field that fails coercion when the sheet
/// is read back becomes `None` for that field only, the record itself is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicRecord {
    pub date: Option<NaiveDate>,
    pub apbd_realization: Option<u64>,
    pub pma_realization: Option<u64>,
    pub pmdn_realization: Option<u64>,
    pub infra_spending: Option<u64>,
    pub iph_weekly: Option<f64>,
    pub inflation_monthly: Option<f64>,
    pub export_value: Option<u64>,
    pub rice_production: Option<u64>,
}

impl EconomicRecord {
    /// True when the record carries no observation at all.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.apbd_realization.is_none()
            && self.pma_realization.is_none()
            && self.pmdn_realization.is_none()
            && self.infra_spending.is_none()
            && self.iph_weekly.is_none()
            && self.inflation_monthly.is_none()
            && self.export_value.is_none()
            && self.rice_production.is_none()
    }
}

/// One untyped sheet row: string keys and values in sheet column order.
///
/// Column order matters because the header written back on `save` is derived
/// from the keys of the first row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        RawRow { fields: Vec::new() }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// A row whose every cell is empty or whitespace is a sheet filler row,
    /// not an observation.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Dashboard view mode selected by the user. Replaces the ambient "current
/// page" state of the form UI with an explicit value carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    WholeYear,
    SingleQuarter,
}

/// The metrics shown with delta indicators on the dashboard summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineMetric {
    Apbd,
    Pma,
    Pmdn,
}

impl HeadlineMetric {
    pub const ALL: [HeadlineMetric; 3] =
        [HeadlineMetric::Apbd, HeadlineMetric::Pma, HeadlineMetric::Pmdn];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadlineMetric::Apbd => "APBD",
            HeadlineMetric::Pma => "PMA",
            HeadlineMetric::Pmdn => "PMDN",
        }
    }

    pub fn value(&self, record: &EconomicRecord) -> Option<u64> {
        match self {
            HeadlineMetric::Apbd => record.apbd_realization,
            HeadlineMetric::Pma => record.pma_realization,
            HeadlineMetric::Pmdn => record.pmdn_realization,
        }
    }
}

/// Latest value and period-over-period change for one headline metric.
/// `delta` is `None` whenever either side of the subtraction is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDelta {
    pub current: Option<u64>,
    pub delta: Option<i64>,
}
