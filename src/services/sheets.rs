// src/services/sheets.rs
//
// Record store adapter over one Google Sheets worksheet. Reads always fetch
// the full row set; writes are a destructive full rewrite (clear, then one
// values update), so callers pass the complete desired row set every time.
// Two concurrent writers therefore race with last-writer-wins semantics;
// the design assumes a single active writer.

use std::fmt;

use log::info;
use reqwest::Client;
use serde_json::json;

use crate::models::RawRow;
use crate::services::google_oauth::fetch_access_token_from_file;

#[derive(Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub service_account_json_path: String,
    /// Worksheet holding the quarterly rows.
    pub sheet_name: String,
}

/// Failure talking to the backing store. Field-level data problems are not
/// store errors; those degrade to nulls during normalization.
#[derive(Debug)]
pub enum StoreError {
    Auth(String),
    Http(reqwest::Error),
    Api { status: u16, body: String },
    Shape(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Auth(msg) => write!(f, "sheets auth failed: {}", msg),
            StoreError::Http(e) => write!(f, "sheets request failed: {}", e),
            StoreError::Api { status, body } => {
                write!(f, "sheets API error (status {}): {}", status, body)
            }
            StoreError::Shape(msg) => write!(f, "unexpected sheet payload: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Http(e)
    }
}

pub struct SheetsStore {
    pub config: SheetsConfig,
    client: Client,
}

impl SheetsStore {
    pub fn new(config: SheetsConfig) -> Self {
        SheetsStore {
            config,
            client: Client::new(),
        }
    }

    async fn auth_token(&self) -> Result<String, StoreError> {
        fetch_access_token_from_file(&self.config.service_account_json_path)
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}{}",
            self.config.spreadsheet_id, self.config.sheet_name, suffix
        )
    }

    /// Fetch every row currently in the worksheet. The first sheet row is the
    /// header; each following row becomes a `RawRow` keyed by header name, in
    /// sheet column order.
    pub async fn load(&self) -> Result<Vec<RawRow>, StoreError> {
        let token = self.auth_token().await?;

        let response = self
            .client
            .get(self.values_url(""))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        let payload: serde_json::Value = response.json().await?;
        match payload["values"].as_array() {
            Some(values) => rows_from_values(values),
            // A brand-new worksheet has no values key at all.
            None => Ok(Vec::new()),
        }
    }

    /// Replace the entire worksheet content with the given rows. The header
    /// is derived from the union of row keys, first-row order winning.
    pub async fn save(&self, rows: &[RawRow]) -> Result<(), StoreError> {
        let token = self.auth_token().await?;

        let header = header_for(rows);
        let values = values_for(&header, rows);

        // Clear then rewrite, mirroring the sheet's own replace semantics.
        let clear_resp = self
            .client
            .post(self.values_url(":clear"))
            .bearer_auth(&token)
            .send()
            .await?;
        if !clear_resp.status().is_success() {
            let status = clear_resp.status().as_u16();
            let body = clear_resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        let body = json!({
            "values": values,
            "majorDimension": "ROWS",
        });

        let update_resp = self
            .client
            .put(self.values_url("?valueInputOption=RAW"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        if !update_resp.status().is_success() {
            let status = update_resp.status().as_u16();
            let body = update_resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }

        info!(
            "rewrote {} data rows to worksheet '{}'",
            rows.len(),
            self.config.sheet_name
        );
        Ok(())
    }
}

/// Header row for a rewrite: the first row's keys in order, then any key
/// seen only in later rows, in encounter order.
pub fn header_for(rows: &[RawRow]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.to_string());
            }
        }
    }
    header
}

/// Cell grid for a rewrite: header first, then each row's values in header
/// order, empty text for keys the row does not carry.
pub fn values_for(header: &[String], rows: &[RawRow]) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(header.to_vec());
    for row in rows {
        values.push(
            header
                .iter()
                .map(|key| row.get(key).unwrap_or_default().to_string())
                .collect(),
        );
    }
    values
}

/// Decode the Sheets API `values` grid into keyed rows. The API omits
/// trailing empty cells, so short rows pad with empty text; a row longer
/// than the header does not fit the row-mapping contract and is fatal.
pub fn rows_from_values(values: &[serde_json::Value]) -> Result<Vec<RawRow>, StoreError> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = cells_of(header_row, 1)?;

    let mut rows = Vec::with_capacity(data_rows.len());
    for (idx, value) in data_rows.iter().enumerate() {
        // +2: sheet rows are 1-based and the header occupies row 1.
        let sheet_row = idx + 2;
        let cells = cells_of(value, sheet_row)?;
        if cells.len() > header.len() {
            return Err(StoreError::Shape(format!(
                "row {} has {} cells but the header has {} columns",
                sheet_row,
                cells.len(),
                header.len()
            )));
        }
        let mut row = RawRow::new();
        for (i, key) in header.iter().enumerate() {
            row.push(key.clone(), cells.get(i).cloned().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(rows)
}

fn cells_of(value: &serde_json::Value, sheet_row: usize) -> Result<Vec<String>, StoreError> {
    let cells = value.as_array().ok_or_else(|| {
        StoreError::Shape(format!("row {} is not an array of cells", sheet_row))
    })?;
    Ok(cells.iter().map(cell_text).collect())
}

fn cell_text(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
