use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet holding the tracker tabs and SLA_data_source.
    #[serde(default)]
    pub tracker_spreadsheet_id: String,
    /// HR's Master Onboarding Tracker spreadsheet.
    #[serde(default)]
    pub hr_mot_spreadsheet_id: String,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    /// Bearer token for both Google APIs; usually injected via
    /// GOOGLE_ACCESS_TOKEN rather than written here.
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default = "default_bigquery_api_base")]
    pub api_base: String,
    /// dbt Cloud job-trigger URL for the --refresh-warehouse switch; the
    /// switch is a no-op while this is blank.
    #[serde(default)]
    pub dbt_job_url: String,
    #[serde(default)]
    pub dbt_token: String,
    #[serde(default = "default_dbt_settle_secs")]
    pub dbt_settle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Provisioning grace window in days; see sla::metrics.
    #[serde(default = "default_grace_days")]
    pub grace_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook: String,
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
    /// Failure always notifies; success only when this is set.
    #[serde(default = "default_true")]
    pub notify_on_success: bool,
}

/// Values that win over the config file: environment first, then CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub tracker_spreadsheet_id: Option<String>,
    pub hr_mot_spreadsheet_id: Option<String>,
    pub access_token: Option<String>,
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub webhook: Option<String>,
}

impl ConfigOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            tracker_spreadsheet_id: var("TRACKER_SHEETS_ID"),
            hr_mot_spreadsheet_id: var("HR_MOT_SHEETS_ID"),
            access_token: var("GOOGLE_ACCESS_TOKEN"),
            project: var("GBQ_PROJECT"),
            dataset: var("GBQ_DATASET"),
            webhook: var("NOTIFY_WEBHOOK"),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/tracker-sync/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(id) = overrides.tracker_spreadsheet_id {
            self.sheets.tracker_spreadsheet_id = id;
        }
        if let Some(id) = overrides.hr_mot_spreadsheet_id {
            self.sheets.hr_mot_spreadsheet_id = id;
        }
        if let Some(token) = overrides.access_token {
            self.sheets.access_token = token;
        }
        if let Some(project) = overrides.project {
            self.warehouse.project = project;
        }
        if let Some(dataset) = overrides.dataset {
            self.warehouse.dataset = dataset;
        }
        if let Some(webhook) = overrides.webhook {
            self.notify.webhook = webhook;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[sheets]
tracker_spreadsheet_id = "TrackerSpreadsheetIdHere"
hr_mot_spreadsheet_id = "HrMotSpreadsheetIdHere"
api_base = "https://sheets.googleapis.com"
access_token = ""

[warehouse]
project = "your-gcp-project"
dataset = "staff_reporting"
api_base = "https://bigquery.googleapis.com"
dbt_job_url = ""
dbt_token = ""
dbt_settle_secs = 30

[sla]
grace_days = 1

[notify]
webhook = ""
enable_stdout = true
notify_on_success = true
"#;
        template.to_string()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            tracker_spreadsheet_id: String::new(),
            hr_mot_spreadsheet_id: String::new(),
            api_base: default_sheets_api_base(),
            access_token: String::new(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            dataset: String::new(),
            api_base: default_bigquery_api_base(),
            dbt_job_url: String::new(),
            dbt_token: String::new(),
            dbt_settle_secs: default_dbt_settle_secs(),
        }
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            grace_days: default_grace_days(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            enable_stdout: default_true(),
            notify_on_success: default_true(),
        }
    }
}

fn default_sheets_api_base() -> String {
    crate::sheets::client::DEFAULT_SHEETS_API_BASE.to_string()
}

fn default_bigquery_api_base() -> String {
    crate::warehouse::bigquery::DEFAULT_BIGQUERY_API_BASE.to_string()
}

fn default_dbt_settle_secs() -> u64 {
    30
}

fn default_grace_days() -> u64 {
    1
}

fn default_true() -> bool {
    true
}
