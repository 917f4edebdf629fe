use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::RawRow;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Source of visit-log rows.
///
/// Rows come back in append order (oldest first). Callers must not rely on
/// that order for recency.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_rows(&self, sheet: &str) -> Result<Vec<RawRow>, AppError>;
}

/// Values payload returned by the spreadsheet API.
#[derive(Debug, Default, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    /// First row is the header.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Renders a spreadsheet cell as text. Blank and null cells are "".
pub fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Turns a header row plus data rows into label -> cell maps.
///
/// Short rows simply lack their trailing labels; cells past the header are
/// dropped, as are rows with no content at all.
pub fn rows_from_values(values: &[Vec<Value>]) -> Vec<RawRow> {
    let Some((header, data)) = values.split_first() else {
        return Vec::new();
    };
    let labels: Vec<String> = header
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    data.iter()
        .map(|cells| {
            labels
                .iter()
                .zip(cells.iter())
                .filter(|(label, _)| !label.is_empty())
                .map(|(label, cell)| (label.clone(), cell_to_string(cell)))
                .collect::<RawRow>()
        })
        .filter(|row| row.values().any(|v| !v.trim().is_empty()))
        .collect()
}

/// Client for a spreadsheet exposed through the Google Sheets values API.
#[derive(Clone)]
pub struct SheetsRecordStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
}

impl SheetsRecordStore {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create sheets client")?;

        Ok(Self {
            client,
            base_url: config.sheets_base_url.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_key: config.sheets_api_key.clone(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{sheet}?key=...`, with each path
    /// segment percent-encoded (sheet names carry spaces and accents).
    fn values_url(&self, sheet: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::RecordStoreError(format!("Invalid sheets URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::RecordStoreError("Sheets URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", sheet]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl RecordStore for SheetsRecordStore {
    async fn load_rows(&self, sheet: &str) -> Result<Vec<RawRow>, AppError> {
        let url = self.values_url(sheet)?;

        tracing::info!("Loading rows from sheet '{}'", sheet);
        // Redact key from logs to prevent credential exposure
        tracing::debug!(
            "Sheets URL: {}/v4/spreadsheets/{}/values/{}?key=[REDACTED]",
            self.base_url,
            self.spreadsheet_id,
            sheet
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Sheets request for '{}' failed", sheet))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Sheets API returned error {}: {}", status, error_text);
            return Err(AppError::RecordStoreError(format!(
                "Sheets API returned status {}: {}",
                status, error_text
            )));
        }

        let payload: SheetValues = response
            .json()
            .await
            .context("Failed to parse sheets response")?;

        let rows = rows_from_values(&payload.values);
        tracing::info!(
            "Loaded {} row(s) from {}",
            rows.len(),
            payload.range.as_deref().unwrap_or(sheet)
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_values_maps_headers() {
        let values: Vec<Vec<Value>> = serde_json::from_value(json!([
            ["Fecha", "Nombre", "Teléfono", ""],
            ["1/2/2024", "Ana Ruiz", 5511112222u64, "ignored"],
            ["2/2/2024", "Juan"],
            [],
            ["", "  "]
        ]))
        .unwrap();

        let rows = rows_from_values(&values);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Teléfono"], "5511112222");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1]["Nombre"], "Juan");
        assert!(!rows[1].contains_key("Teléfono"));
    }

    #[test]
    fn test_rows_from_empty_sheet() {
        assert!(rows_from_values(&[]).is_empty());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&json!(null)), "");
        assert_eq!(cell_to_string(&json!("x")), "x");
        assert_eq!(cell_to_string(&json!(12.5)), "12.5");
        assert_eq!(cell_to_string(&json!(true)), "true");
    }

    #[test]
    fn test_values_url_encodes_sheet() {
        let config = Config {
            port: 3000,
            sheets_base_url: "https://sheets.example.com".to_string(),
            spreadsheet_id: "abc".to_string(),
            sheets_api_key: "secret".to_string(),
            clients_sheet: "Recepción 2024".to_string(),
            cache_ttl_secs: 60,
        };
        let store = SheetsRecordStore::new(&config).unwrap();
        let url = store.values_url(&config.clients_sheet).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.example.com/v4/spreadsheets/abc/values/Recepci%C3%B3n%202024?key=secret"
        );
    }
}
