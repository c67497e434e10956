//! Fixed cell geometry of the tracker spreadsheets.
//!
//! Column order is positionally significant: the write-back paths emit rows
//! in exactly the order the tabs hold them, and the read paths decode by
//! offset. Header-driven reads exist only for the SLA aggregation, which
//! crosses tabs whose tech-owned columns the reconciliation jobs never touch.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Tz;

use crate::model::{ClearanceUpdate, OffboardingRecord, OnboardingRecord, AUDIT_DATE_FORMAT};
use crate::sla::SlaRow;

// Onboarding "{year} Tracker" tabs: header row 4, data from row 5, 18
// columns starting at B. Timestamp in A2.
pub const ONBOARDING_DATA_ROW: u32 = 5;
pub const ONBOARDING_FIRST_COL: u32 = 2;
pub const ONBOARDING_WIDTH: u32 = 18;
pub const ONBOARDING_READ_RANGE: &str = "B5:S";
pub const ONBOARDING_WRITE_ANCHOR: &str = "B5";
pub const ONBOARDING_TIMESTAMP_CELL: &str = "A2";
/// Absolute column of `job_candidate_id` (B), used by the blank-row pre-sort.
pub const ONBOARDING_ID_COL: u32 = 2;
/// Absolute column of `Date Added` (P), the write-back sort key.
pub const ONBOARDING_SORT_COL: u32 = 16;

/// "{year} Cleared" keys: header at C4, ids from C5 down.
pub const ONBOARDING_CLEARED_RANGE: &str = "C5:C";

// HR MOT "Master_{year}" tabs: no header contract, data from row 3, fixed
// 0-based offsets into the full-width row.
pub const MOT_READ_RANGE: &str = "A3:BD";
pub const MOT_ID_IDX: usize = 3;
pub const MOT_CLEARED_IDX: usize = 51;
pub const MOT_CLEARED_EMAIL_IDX: usize = 52;

// "Offboarding Tracker": header row 3, data from row 4, 14 columns starting
// at B. Timestamp in A1.
pub const OFFBOARDING_DATA_ROW: u32 = 4;
pub const OFFBOARDING_FIRST_COL: u32 = 2;
pub const OFFBOARDING_READ_RANGE: &str = "B4:O";
pub const OFFBOARDING_WRITE_ANCHOR: &str = "B4";
pub const OFFBOARDING_TIMESTAMP_CELL: &str = "A1";
pub const OFFBOARDING_ID_COL: u32 = 2;
/// Absolute column of `Last Updated` (O), the write-back sort key.
pub const OFFBOARDING_SORT_COL: u32 = 15;

/// "Offboarding - Cleared" keys: header at C3, ids from C4 down.
pub const OFFBOARDING_CLEARED_RANGE: &str = "C4:C";

// SLA aggregation reads every yearly tab full-width from the header row.
pub const SLA_SOURCE_READ_RANGE: &str = "B4:ZZ";
pub const SLA_TAB: &str = "SLA_data_source";
pub const SLA_WRITE_ANCHOR: &str = "A1";

fn date_cell(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(AUDIT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date_cell(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), AUDIT_DATE_FORMAT).ok()
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn onboarding_to_row(record: &OnboardingRecord) -> Vec<String> {
    vec![
        record.candidate_id.clone(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.hire_reason.clone(),
        record.personal_email.clone(),
        record.work_location.clone(),
        record.pay_location.clone(),
        record.start_date.clone(),
        record.title.clone(),
        record.former_kipp.clone(),
        record.sped.clone(),
        record.cleared.clone(),
        record.cleared_email_sent.clone(),
        record.rescinded.clone(),
        date_cell(record.date_added),
        date_cell(record.start_date_updated),
        date_cell(record.pay_location_updated),
        date_cell(record.main_updated),
    ]
}

pub fn onboarding_from_row(row: &[String]) -> OnboardingRecord {
    OnboardingRecord {
        candidate_id: cell(row, 0),
        first_name: cell(row, 1),
        last_name: cell(row, 2),
        hire_reason: cell(row, 3),
        personal_email: cell(row, 4),
        work_location: cell(row, 5),
        pay_location: cell(row, 6),
        start_date: cell(row, 7),
        title: cell(row, 8),
        former_kipp: cell(row, 9),
        sped: cell(row, 10),
        cleared: cell(row, 11),
        cleared_email_sent: cell(row, 12),
        rescinded: cell(row, 13),
        date_added: parse_date_cell(&cell(row, 14)),
        start_date_updated: parse_date_cell(&cell(row, 15)),
        pay_location_updated: parse_date_cell(&cell(row, 16)),
        main_updated: parse_date_cell(&cell(row, 17)),
    }
}

pub const ONBOARDING_HEADERS: [&str; 18] = [
    "job_candidate_id",
    "First Name",
    "Last Name",
    "New, Returners, Rehire or Transfer",
    "Personal Email",
    "Work Location",
    "Pay Location",
    "Start Date",
    "Title",
    "Former or Current KIPP",
    "SpEd?",
    "Cleared?",
    "Cleared Email Sent",
    "Rescinded",
    "Date Added",
    "Start Date - Last Updated",
    "Pay Location - Last Updated",
    "Main Last Updated",
];

pub fn offboarding_to_row(record: &OffboardingRecord) -> Vec<String> {
    vec![
        record.account_id.clone(),
        record.employee_id.clone(),
        record.staff_name.clone(),
        record.work_email.clone(),
        record.personal_email.clone(),
        record.work_phone.clone(),
        record.status.clone(),
        record.termination_date.clone(),
        record.position.clone(),
        record.work_location.clone(),
        record.pay_location.clone(),
        record.manager_name.clone(),
        record.manager_email.clone(),
        record.last_updated.clone(),
    ]
}

pub fn offboarding_from_row(row: &[String]) -> OffboardingRecord {
    OffboardingRecord {
        account_id: cell(row, 0),
        employee_id: cell(row, 1),
        staff_name: cell(row, 2),
        work_email: cell(row, 3),
        personal_email: cell(row, 4),
        work_phone: cell(row, 5),
        status: cell(row, 6),
        termination_date: cell(row, 7),
        position: cell(row, 8),
        work_location: cell(row, 9),
        pay_location: cell(row, 10),
        manager_name: cell(row, 11),
        manager_email: cell(row, 12),
        last_updated: cell(row, 13),
    }
}

pub const OFFBOARDING_HEADERS: [&str; 14] = [
    "account_id",
    "Employee ID",
    "Staff Name",
    "Work Email",
    "Personal Email",
    "Work Phone",
    "Status",
    "Termination Date",
    "Position",
    "Work Location",
    "Pay Location",
    "Manager Name",
    "Manager Email",
    "Last Updated",
];

/// Decode a MOT master row into its clearance columns. Rows with a blank
/// candidate id are skipped; the cleared-email flag arrives as TRUE/FALSE
/// and is normalized to Yes/No.
pub fn mot_clearance_from_row(row: &[String]) -> Option<ClearanceUpdate> {
    let candidate_id = cell(row, MOT_ID_IDX);
    if candidate_id.is_empty() {
        return None;
    }
    let sent = cell(row, MOT_CLEARED_EMAIL_IDX);
    Some(ClearanceUpdate {
        candidate_id,
        cleared: cell(row, MOT_CLEARED_IDX),
        cleared_email_sent: if sent == "TRUE" { "Yes" } else { "No" }.to_string(),
    })
}

/// Collapse a single-column range into its non-blank key set.
pub fn single_column_ids(rows: &[Vec<String>]) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|row| row.first())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

pub const SLA_OUTPUT_HEADERS: [&str; 31] = [
    "SchoolYear",
    "job_candidate_id",
    "Staff_Name",
    "NewHire_Type",
    "HR_Cleared",
    "Personal_Email",
    "WorkLocation",
    "PayLocation",
    "StartDate",
    "Title",
    "Former_KIPP",
    "SpEd?",
    "ClearedEmailSent",
    "Completion_Status",
    "GLS_Tracking",
    "AssignedTechnician",
    "Computer_Type",
    "Computer_Status",
    "Phone_Type",
    "Phone_Status",
    "DateAdded",
    "StartDate_LastUpdated",
    "PayLocation_LastUpdated",
    "Main_LastUpdated",
    "DateCleared",
    "Hire_Month",
    "StartDateChange_Boolean",
    "LocationChange_Boolean",
    "TechCleared_MetSLA_Boolean",
    "Include_SLA_Denominator",
    "TechCleared_Timeliness",
];

pub fn sla_row_values(row: &SlaRow) -> Vec<String> {
    vec![
        row.school_year.clone(),
        row.candidate_id.clone(),
        row.staff_name.clone(),
        row.newhire_type.clone(),
        row.hr_cleared.clone(),
        row.personal_email.clone(),
        row.work_location.clone(),
        row.pay_location.clone(),
        row.start_date.clone(),
        row.title.clone(),
        row.former_kipp.clone(),
        row.sped.clone(),
        row.cleared_email_sent.clone(),
        row.completion_status.clone(),
        row.gls_tracking.clone(),
        row.assigned_technician.clone(),
        row.computer_type.clone(),
        row.computer_status.clone(),
        row.phone_type.clone(),
        row.phone_status.clone(),
        row.date_added.clone(),
        row.start_date_last_updated.clone(),
        row.pay_location_last_updated.clone(),
        row.main_last_updated.clone(),
        row.date_cleared.clone(),
        row.hire_month.clone(),
        row.start_date_change.to_string(),
        row.location_change.to_string(),
        row.met_sla.map(|v| v.to_string()).unwrap_or_default(),
        row.include_in_denominator.to_string(),
        row.timeliness_days
            .map(|v| v.to_string())
            .unwrap_or_default(),
    ]
}

/// The "last refreshed" stamp written next to each tracker, in Pacific time.
pub fn refresh_timestamp(now: DateTime<Tz>) -> String {
    format!("LAST UPDATED: {}", now.format("%m/%d/%y @ %-I:%M %p"))
}

pub fn pacific_now() -> DateTime<Tz> {
    chrono::Utc::now().with_timezone(&Los_Angeles)
}
