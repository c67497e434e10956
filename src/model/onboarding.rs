use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Keyed, RESCINDED_SENTINEL, SHEET_DATE_FORMAT};

/// One row of a "{year} Tracker" tab, keyed by `job_candidate_id`.
///
/// The string fields hold exactly what the sheet holds; `start_date` stays in
/// its sheet form (`%m/%d/%Y`) because change stamping compares the rendered
/// value, not a parsed one. Audit columns are real dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub candidate_id: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_reason: String,
    pub personal_email: String,
    pub work_location: String,
    pub pay_location: String,
    pub start_date: String,
    pub title: String,
    pub former_kipp: String,
    pub sped: String,
    pub cleared: String,
    pub cleared_email_sent: String,
    pub rescinded: String,
    pub date_added: Option<NaiveDate>,
    pub start_date_updated: Option<NaiveDate>,
    pub pay_location_updated: Option<NaiveDate>,
    pub main_updated: Option<NaiveDate>,
}

impl Keyed for OnboardingRecord {
    fn key(&self) -> &str {
        &self.candidate_id
    }
}

impl OnboardingRecord {
    pub fn is_rescinded(&self) -> bool {
        self.rescinded != RESCINDED_SENTINEL && !self.rescinded.trim().is_empty()
    }
}

/// A fresh row from the warehouse recruiting datasource. Re-fetched every
/// run; carries no audit state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub candidate_id: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_reason: String,
    pub email: String,
    pub work_location: String,
    pub pay_location: String,
    pub start_date: Option<NaiveDate>,
    pub title: String,
    pub former_kipp: String,
    pub sped: String,
}

impl Keyed for SourceRecord {
    fn key(&self) -> &str {
        &self.candidate_id
    }
}

impl SourceRecord {
    /// Start date in the tracker's sheet form.
    pub fn start_date_cell(&self) -> String {
        self.start_date
            .map(|d| d.format(SHEET_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Overwrite every field the datasource carries. Fresh wins; audit and
    /// process-state columns are untouched here.
    pub fn apply_to(&self, record: &mut OnboardingRecord) {
        record.first_name = self.first_name.clone();
        record.last_name = self.last_name.clone();
        record.hire_reason = self.hire_reason.clone();
        record.personal_email = self.email.clone();
        record.work_location = self.work_location.clone();
        record.pay_location = self.pay_location.clone();
        record.start_date = self.start_date_cell();
        record.title = self.title.clone();
        record.former_kipp = self.former_kipp.clone();
        record.sped = self.sped.clone();
    }
}

/// Clearance columns pulled from HR's MOT master tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceUpdate {
    pub candidate_id: String,
    pub cleared: String,
    pub cleared_email_sent: String,
}

impl Keyed for ClearanceUpdate {
    fn key(&self) -> &str {
        &self.candidate_id
    }
}
