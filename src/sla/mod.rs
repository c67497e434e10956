pub mod aggregate;
pub mod metrics;

use serde::{Deserialize, Serialize};

/// A raw row pulled from one of the yearly Tracker/Cleared tabs, already
/// tagged with its source year. Dates stay in their sheet string forms here;
/// the metrics pass parses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlaSourceRow {
    pub school_year: String,
    pub candidate_id: String,
    pub first_name: String,
    pub last_name: String,
    pub newhire_type: String,
    pub hr_cleared: String,
    pub personal_email: String,
    pub work_location: String,
    pub pay_location: String,
    pub start_date: String,
    pub title: String,
    pub former_kipp: String,
    pub sped: String,
    pub cleared_email_sent: String,
    pub rescinded: String,
    pub completion_status: String,
    pub gls_tracking: String,
    pub assigned_technician: String,
    pub computer_type: String,
    pub computer_status: String,
    pub phone_type: String,
    pub phone_status: String,
    pub date_added: String,
    pub start_date_last_updated: String,
    pub pay_location_last_updated: String,
    pub main_last_updated: String,
    /// Only Cleared tabs carry this; tracker rows aggregate with it blank.
    pub date_cleared: String,
}

/// One row of the SLA_data_source reporting tab: the renamed source columns
/// plus the derived SLA fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaRow {
    pub school_year: String,
    pub candidate_id: String,
    pub staff_name: String,
    pub newhire_type: String,
    pub hr_cleared: String,
    pub personal_email: String,
    pub work_location: String,
    pub pay_location: String,
    pub start_date: String,
    pub title: String,
    pub former_kipp: String,
    pub sped: String,
    pub cleared_email_sent: String,
    pub completion_status: String,
    pub gls_tracking: String,
    pub assigned_technician: String,
    pub computer_type: String,
    pub computer_status: String,
    pub phone_type: String,
    pub phone_status: String,
    pub date_added: String,
    pub start_date_last_updated: String,
    pub pay_location_last_updated: String,
    pub main_last_updated: String,
    /// Re-rendered as ISO; blank while provisioning is still open.
    pub date_cleared: String,
    pub hire_month: String,
    /// 1 when the start date moved after the record was added.
    pub start_date_change: u8,
    /// 1 when the pay location moved after the record was added.
    pub location_change: u8,
    /// 1 met, 0 missed, None still pending (rendered blank).
    pub met_sla: Option<u8>,
    /// 1 when the record counts toward the SLA ratio yet.
    pub include_in_denominator: u8,
    /// Days from start date to clearance; negative means cleared early.
    pub timeliness_days: Option<i64>,
}
