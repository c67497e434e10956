use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::model::{OffboardingRecord, SourceRecord, AUDIT_DATE_FORMAT};
use crate::warehouse::dbt::DbtTrigger;
use crate::warehouse::Warehouse;

pub const DEFAULT_BIGQUERY_API_BASE: &str = "https://bigquery.googleapis.com";

const REPORT_ONBOARDING: &str = "rpt_staff__tech_onboarding_tracker_data_source";
const REPORT_OFFBOARDING: &str = "rpt_staff__tech_offboarding_tracker_datasource";
const REPORT_RESCINDED: &str = "rpt_staff__tech_onboarding_tracker_rescinded_offers";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("tracker-sync/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// BigQuery REST (jobs.query) client for the staff report tables.
pub struct BigQueryWarehouse {
    base: String,
    token: String,
    project: String,
    dataset: String,
    dbt: Option<DbtTrigger>,
}

impl BigQueryWarehouse {
    pub fn new(
        base: impl Into<String>,
        token: impl Into<String>,
        project: impl Into<String>,
        dataset: impl Into<String>,
        dbt: Option<DbtTrigger>,
    ) -> Self {
        Self {
            base: base.into(),
            token: token.into(),
            project: project.into(),
            dataset: dataset.into(),
            dbt,
        }
    }

    async fn query_table(&self, table: &str) -> Result<Vec<BTreeMap<String, String>>> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/queries",
            self.base, self.project
        );
        let sql = format!("SELECT * FROM `{}.{}.{}`", self.project, self.dataset, table);
        let body = json!({ "query": sql, "useLegacySql": false });
        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed querying {table}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed reading query response for {table}"))?;
        if !status.is_success() {
            let preview: String = text.chars().take(180).collect();
            return Err(anyhow!("query for {table} returned {status}: {preview}"));
        }
        let payload: Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON from query for {table}"))?;
        decode_rows(&payload).with_context(|| format!("unexpected row shape for {table}"))
    }
}

/// Flatten a jobs.query response into name→value maps. BigQuery renders every
/// scalar as a string inside `rows[].f[].v`; NULL arrives as JSON null.
pub fn decode_rows(payload: &Value) -> Result<Vec<BTreeMap<String, String>>> {
    if payload["jobComplete"] == Value::Bool(false) {
        return Err(anyhow!("query did not complete synchronously"));
    }
    let fields: Vec<String> = payload["schema"]["fields"]
        .as_array()
        .ok_or_else(|| anyhow!("response missing schema.fields"))?
        .iter()
        .filter_map(|f| f["name"].as_str().map(str::to_string))
        .collect();

    let mut out = Vec::new();
    for row in payload["rows"].as_array().into_iter().flatten() {
        let cells = row["f"]
            .as_array()
            .ok_or_else(|| anyhow!("row missing f array"))?;
        let mut decoded = BTreeMap::new();
        for (name, cell) in fields.iter().zip(cells) {
            let value = match &cell["v"] {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            decoded.insert(name.clone(), value);
        }
        out.push(decoded);
    }
    Ok(out)
}

fn field(row: &BTreeMap<String, String>, name: &str) -> String {
    row.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Decode one onboarding datasource row. The start date arrives as an ISO
/// date; unparseable values decode as absent rather than failing the run.
pub fn source_record_from(row: &BTreeMap<String, String>) -> SourceRecord {
    SourceRecord {
        candidate_id: field(row, "job_candidate_id"),
        first_name: field(row, "first_name"),
        last_name: field(row, "last_name"),
        hire_reason: field(row, "hire_reason"),
        email: field(row, "email"),
        work_location: field(row, "assigned_work_location"),
        pay_location: field(row, "assigned_pay_location"),
        start_date: NaiveDate::parse_from_str(&field(row, "start_date"), AUDIT_DATE_FORMAT).ok(),
        title: field(row, "title"),
        former_kipp: field(row, "are_you_a_former_or_current_kipp_employee"),
        sped: field(row, "sped"),
    }
}

pub fn offboarding_record_from(row: &BTreeMap<String, String>) -> OffboardingRecord {
    OffboardingRecord {
        account_id: field(row, "account_id"),
        employee_id: field(row, "local_staff_id"),
        staff_name: field(row, "staff_last_first_name"),
        work_email: field(row, "staff_email"),
        personal_email: field(row, "personal_email"),
        work_phone: field(row, "work_phone"),
        status: field(row, "staff_status"),
        termination_date: field(row, "termination_date"),
        position: field(row, "position_name"),
        work_location: field(row, "work_location_description"),
        pay_location: field(row, "pay_location_description"),
        manager_name: field(row, "supervisor_last_first_name"),
        manager_email: field(row, "supervisor_email"),
        last_updated: field(row, "last_updated"),
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn refresh_upstream(&self) -> Result<()> {
        let Some(dbt) = &self.dbt else {
            info!("no upstream trigger configured; skipping");
            return Ok(());
        };
        dbt.trigger_and_settle(&HTTP_CLIENT).await
    }

    async fn onboarding_source(&self) -> Result<Vec<SourceRecord>> {
        let rows = self.query_table(REPORT_ONBOARDING).await?;
        Ok(rows.iter().map(source_record_from).collect())
    }

    async fn offboarding_source(&self) -> Result<Vec<OffboardingRecord>> {
        let rows = self.query_table(REPORT_OFFBOARDING).await?;
        Ok(rows.iter().map(offboarding_record_from).collect())
    }

    async fn rescinded_offer_ids(&self) -> Result<Vec<String>> {
        let rows = self.query_table(REPORT_RESCINDED).await?;
        Ok(rows
            .iter()
            .map(|row| field(row, "job_candidate_id"))
            .filter(|id| !id.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_query_rows_into_named_fields() {
        let payload = json!({
            "jobComplete": true,
            "schema": { "fields": [
                { "name": "job_candidate_id" },
                { "name": "first_name" },
                { "name": "start_date" }
            ]},
            "rows": [
                { "f": [ { "v": "1001" }, { "v": "Ada" }, { "v": "2024-08-01" } ] },
                { "f": [ { "v": "1002" }, { "v": null }, { "v": null } ] }
            ]
        });

        let rows = decode_rows(&payload).expect("decodes");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["first_name"], "Ada");
        assert_eq!(rows[1]["first_name"], "");

        let record = source_record_from(&rows[0]);
        assert_eq!(record.candidate_id, "1001");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2024, 8, 1));
        assert!(source_record_from(&rows[1]).start_date.is_none());
    }

    #[test]
    fn incomplete_jobs_are_an_error() {
        let payload = json!({ "jobComplete": false, "schema": { "fields": [] } });
        assert!(decode_rows(&payload).is_err());
    }
}
