// src/handlers/records.rs
use std::sync::Arc;

use chrono::NaiveDate;
use log::{error, info};
use serde::Deserialize;
use warp::Rejection;

use crate::handlers::error::ApiError;
use crate::models::EconomicRecord;
use crate::services::normalize;
use crate::services::sheets::SheetsStore;

/// Form submission payload. Every field is required at this edge; the form
/// always submits a complete observation (numeric inputs default to zero).
#[derive(Debug, Deserialize)]
pub struct SubmitRecord {
    pub date: NaiveDate,
    pub apbd_realization: u64,
    pub pma_realization: u64,
    pub pmdn_realization: u64,
    pub infra_spending: u64,
    pub iph_weekly: f64,
    pub inflation_monthly: f64,
    pub export_value: u64,
    pub rice_production: u64,
}

impl SubmitRecord {
    fn into_record(self) -> EconomicRecord {
        EconomicRecord {
            date: Some(self.date),
            apbd_realization: Some(self.apbd_realization),
            pma_realization: Some(self.pma_realization),
            pmdn_realization: Some(self.pmdn_realization),
            infra_spending: Some(self.infra_spending),
            iph_weekly: Some(self.iph_weekly),
            inflation_monthly: Some(self.inflation_monthly),
            export_value: Some(self.export_value),
            rice_production: Some(self.rice_production),
        }
    }
}

/// GET /api/v1/records — the full normalized record list.
pub async fn get_records(store: Arc<SheetsStore>) -> Result<impl warp::Reply, Rejection> {
    let rows = store.load().await.map_err(|e| {
        error!("failed to load sheet rows: {}", e);
        warp::reject::custom(ApiError::store(e.to_string()))
    })?;

    let records: Vec<EconomicRecord> = rows
        .iter()
        .filter_map(normalize::normalize_row)
        .collect();
    info!("loaded {} records from {} sheet rows", records.len(), rows.len());
    Ok(warp::reply::json(&records))
}

/// POST /api/v1/records — append one observation and rewrite the store.
///
/// The sheet is the sole durable owner, so the handler reloads the current
/// row set, appends, and hands the complete set back to the adapter. If two
/// sessions submit at once the later rewrite wins in full.
pub async fn submit_record(
    store: Arc<SheetsStore>,
    payload: SubmitRecord,
) -> Result<impl warp::Reply, Rejection> {
    let mut rows = store.load().await.map_err(|e| {
        error!("failed to load sheet rows before append: {}", e);
        warp::reject::custom(ApiError::store(e.to_string()))
    })?;

    // Blank filler rows are dropped on rewrite; they carry no observation.
    rows.retain(|r| !r.is_blank());
    rows.push(normalize::record_to_row(&payload.into_record()));

    store.save(&rows).await.map_err(|e| {
        error!("failed to save sheet rows: {}", e);
        warp::reject::custom(ApiError::store(e.to_string()))
    })?;

    info!("appended one record, sheet now holds {} rows", rows.len());
    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "rows": rows.len() })),
        warp::http::StatusCode::CREATED,
    ))
}
