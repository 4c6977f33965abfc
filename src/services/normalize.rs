// src/services/normalize.rs
//
// Converts untyped sheet rows into typed `EconomicRecord`s and back.
// Coercion failures degrade to `None` per field; only a fully blank row is
// rejected (it is a sheet filler row, not an observation).

use chrono::NaiveDate;
use log::debug;

use crate::models::{EconomicRecord, RawRow};

pub const COL_DATE: &str = "Tanggal";
pub const COL_APBD: &str = "Realisasi APBD";
pub const COL_PMA: &str = "Realisasi PMA";
pub const COL_PMDN: &str = "Realisasi PMDN";
pub const COL_INFRA: &str = "Belanja Infrastruktur";
pub const COL_IPH: &str = "IPH Mojokerto";
pub const COL_INFLATION: &str = "Inflasi Kediri";
pub const COL_EXPORT: &str = "Ekspor Luar Negeri";
pub const COL_RICE: &str = "Produksi Padi";

/// Canonical column order for rows written back to the sheet.
pub const COLUMNS: [&str; 9] = [
    COL_DATE,
    COL_APBD,
    COL_PMA,
    COL_PMDN,
    COL_INFRA,
    COL_IPH,
    COL_INFLATION,
    COL_EXPORT,
    COL_RICE,
];

/// Typed view of one sheet row. Returns `None` for blank filler rows.
pub fn normalize_row(row: &RawRow) -> Option<EconomicRecord> {
    if row.is_blank() {
        return None;
    }

    Some(EconomicRecord {
        date: parse_date(row, COL_DATE),
        apbd_realization: parse_amount(row, COL_APBD),
        pma_realization: parse_amount(row, COL_PMA),
        pmdn_realization: parse_amount(row, COL_PMDN),
        infra_spending: parse_amount(row, COL_INFRA),
        iph_weekly: parse_rate(row, COL_IPH),
        inflation_monthly: parse_rate(row, COL_INFLATION),
        export_value: parse_amount(row, COL_EXPORT),
        rice_production: parse_amount(row, COL_RICE),
    })
}

/// Serialization counterpart of `normalize_row`: dates as `DD/MM/YYYY`,
/// integers as decimal text, rates with two fractional digits, missing
/// fields as empty cells, in canonical column order.
pub fn record_to_row(record: &EconomicRecord) -> RawRow {
    let mut row = RawRow::new();
    row.push(
        COL_DATE,
        record
            .date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
    );
    row.push(COL_APBD, amount_text(record.apbd_realization));
    row.push(COL_PMA, amount_text(record.pma_realization));
    row.push(COL_PMDN, amount_text(record.pmdn_realization));
    row.push(COL_INFRA, amount_text(record.infra_spending));
    row.push(COL_IPH, rate_text(record.iph_weekly));
    row.push(COL_INFLATION, rate_text(record.inflation_monthly));
    row.push(COL_EXPORT, amount_text(record.export_value));
    row.push(COL_RICE, amount_text(record.rice_production));
    row
}

fn amount_text(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn rate_text(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(row: &RawRow, column: &str) -> Option<NaiveDate> {
    let text = cell(row, column)?;
    // Day-first, matching how the form writes dates. Dash-separated variants
    // show up when the sheet is edited by hand.
    const FMTS: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }
    debug!("unparseable date '{}' in column '{}'", text, column);
    None
}

fn parse_amount(row: &RawRow, column: &str) -> Option<u64> {
    let text = cell(row, column)?;
    if let Ok(v) = text.parse::<u64>() {
        return Some(v);
    }
    // The upstream writer sometimes emits integral floats ("100.0").
    if let Ok(v) = text.parse::<f64>() {
        if v.is_finite() && v >= 0.0 && v <= u64::MAX as f64 {
            return Some(v.round() as u64);
        }
    }
    debug!("unparseable amount '{}' in column '{}'", text, column);
    None
}

fn parse_rate(row: &RawRow, column: &str) -> Option<f64> {
    let text = cell(row, column)?;
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            debug!("unparseable rate '{}' in column '{}'", text, column);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> RawRow {
        let mut row = RawRow::new();
        row.push(COL_DATE, "05/04/2023");
        row.push(COL_APBD, "1200000");
        row.push(COL_PMA, "350000");
        row.push(COL_PMDN, "410000");
        row.push(COL_INFRA, "98000");
        row.push(COL_IPH, "1.75");
        row.push(COL_INFLATION, "0.42");
        row.push(COL_EXPORT, "220000");
        row.push(COL_RICE, "5300");
        row
    }

    #[test]
    fn parses_day_first_dates() {
        let record = normalize_row(&sample_row()).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 4, 5));
    }

    #[test]
    fn blank_row_is_not_an_observation() {
        let mut row = RawRow::new();
        for col in COLUMNS {
            row.push(col, "  ");
        }
        assert!(normalize_row(&row).is_none());
    }

    #[test]
    fn coercion_failure_nulls_the_field_only() {
        let mut row = RawRow::new();
        row.push(COL_DATE, "05/04/2023");
        row.push(COL_APBD, "not-a-number");
        row.push(COL_PMA, "350000");
        let record = normalize_row(&row).unwrap();
        assert_eq!(record.apbd_realization, None);
        assert_eq!(record.pma_realization, Some(350_000));
        assert!(record.date.is_some());
    }

    #[test]
    fn unparseable_date_becomes_null_but_record_survives() {
        let mut row = RawRow::new();
        row.push(COL_DATE, "2023/04/05");
        row.push(COL_APBD, "100");
        let record = normalize_row(&row).unwrap();
        assert_eq!(record.date, None);
        assert_eq!(record.apbd_realization, Some(100));
    }

    #[test]
    fn accepts_integral_float_text() {
        let mut row = RawRow::new();
        row.push(COL_DATE, "01/01/2023");
        row.push(COL_APBD, "100.0");
        let record = normalize_row(&row).unwrap();
        assert_eq!(record.apbd_realization, Some(100));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut row = RawRow::new();
        row.push(COL_DATE, "01/01/2023");
        row.push(COL_APBD, "-5");
        let record = normalize_row(&row).unwrap();
        assert_eq!(record.apbd_realization, None);
    }

    #[test]
    fn row_round_trip_preserves_the_record() {
        let record = normalize_row(&sample_row()).unwrap();
        let row = record_to_row(&record);
        assert_eq!(normalize_row(&row), Some(record));
    }

    #[test]
    fn record_row_uses_canonical_column_order() {
        let row = record_to_row(&EconomicRecord::default());
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, COLUMNS.to_vec());
    }
}
