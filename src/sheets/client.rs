use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};

use crate::sheets::{SheetStore, TabInfo};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("tracker-sync/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// Google Sheets v4 values/batchUpdate client, bound to one spreadsheet.
///
/// Auth is a bearer token supplied by the environment; minting it (service
/// account exchange, gcloud, workload identity) is not this tool's job.
pub struct GoogleSheetsClient {
    base: String,
    token: String,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(
        base: impl Into<String>,
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            base: base.into(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn values_url(&self, tab: &str, range: &str) -> String {
        let a1 = if range.is_empty() {
            format!("'{tab}'")
        } else {
            format!("'{tab}'!{range}")
        };
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base, self.spreadsheet_id, a1
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = HTTP_CLIENT
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("failed GET request: {url}"))?;
        read_json_body(url, response).await
    }

    async fn send_json(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("failed request: {url}"))?;
        read_json_body(url, response).await
    }

    async fn sheet_id_by_title(&self, tab: &str) -> Result<i64> {
        let tabs = self.tabs().await?;
        tabs.into_iter()
            .find(|info| info.title == tab)
            .map(|info| info.sheet_id)
            .ok_or_else(|| anyhow!("worksheet not found: {tab}"))
    }
}

async fn read_json_body(url: &str, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {url}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(anyhow!("{url} returned {status}: {preview}"));
    }
    serde_json::from_str(&body).with_context(|| format!("invalid JSON response: {url}"))
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn tabs(&self) -> Result<Vec<TabInfo>> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties",
            self.base, self.spreadsheet_id
        );
        let payload = self.get_json(&url).await?;
        let mut out = Vec::new();
        for sheet in payload["sheets"].as_array().into_iter().flatten() {
            let props = &sheet["properties"];
            let Some(title) = props["title"].as_str() else {
                continue;
            };
            out.push(TabInfo {
                sheet_id: props["sheetId"].as_i64().unwrap_or_default(),
                title: title.to_string(),
                row_count: props["gridProperties"]["rowCount"].as_u64().unwrap_or(0) as u32,
                col_count: props["gridProperties"]["columnCount"].as_u64().unwrap_or(0) as u32,
            });
        }
        Ok(out)
    }

    async fn read_range(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(tab, range);
        let payload = self.get_json(&url).await?;
        let mut rows = Vec::new();
        for row in payload["values"].as_array().into_iter().flatten() {
            let cells = row
                .as_array()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default();
            rows.push(cells);
        }
        Ok(rows)
    }

    async fn write_rows(&self, tab: &str, anchor: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(tab, anchor)
        );
        let body = json!({ "values": rows });
        self.send_json(HTTP_CLIENT.put(&url).json(&body), &url)
            .await
            .with_context(|| format!("failed writing rows to {tab}!{anchor}"))?;
        Ok(())
    }

    async fn update_cell(&self, tab: &str, cell: &str, value: &str) -> Result<()> {
        self.write_rows(tab, cell, vec![vec![value.to_string()]])
            .await
    }

    async fn clear_tab(&self, tab: &str) -> Result<()> {
        let url = format!("{}:clear", self.values_url(tab, ""));
        self.send_json(HTTP_CLIENT.post(&url), &url)
            .await
            .with_context(|| format!("failed clearing {tab}"))?;
        Ok(())
    }

    async fn sort_data(
        &self,
        tab: &str,
        first_data_row: u32,
        first_col: u32,
        sort_col: u32,
        descending: bool,
    ) -> Result<()> {
        let sheet_id = self.sheet_id_by_title(tab).await?;
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base, self.spreadsheet_id
        );
        let body = json!({
            "requests": [{
                "sortRange": {
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": first_data_row.saturating_sub(1),
                        "startColumnIndex": first_col.saturating_sub(1),
                    },
                    "sortSpecs": [{
                        "dimensionIndex": sort_col.saturating_sub(1),
                        "sortOrder": if descending { "DESCENDING" } else { "ASCENDING" },
                    }],
                }
            }]
        });
        self.send_json(HTTP_CLIENT.post(&url).json(&body), &url)
            .await
            .with_context(|| format!("failed sorting {tab}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_ranges_quote_the_tab_title() {
        let client = GoogleSheetsClient::new(DEFAULT_SHEETS_API_BASE, "token", "sheet-id");
        assert_eq!(
            client.values_url("24-25 Tracker", "B5:S"),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/'24-25 Tracker'!B5:S"
        );
        assert_eq!(
            client.values_url("SLA_data_source", ""),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/'SLA_data_source'"
        );
    }

    #[test]
    fn cells_coerce_to_strings() {
        assert_eq!(cell_to_string(&json!("abc")), "abc");
        assert_eq!(cell_to_string(&json!(42)), "42");
        assert_eq!(cell_to_string(&json!(true)), "true");
        assert_eq!(cell_to_string(&Value::Null), "");
    }
}
