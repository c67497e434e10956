use chrono::{Days, NaiveDate};

use crate::model::{AUDIT_DATE_FORMAT, SHEET_DATE_FORMAT};
use crate::sla::{SlaRow, SlaSourceRow};

/// Derive the SLA reporting row from an aggregated source row.
///
/// `grace_days` is the provisioning grace window: a hire counts as met when
/// clearance landed at least that many days before the start date, and a
/// missing clearance counts as missed once `today + grace` passes the start
/// date.
pub fn derive_row(source: &SlaSourceRow, today: NaiveDate, grace_days: u64) -> SlaRow {
    let start_date = parse_sheet_date(&source.start_date);
    let date_cleared = parse_sheet_date(&source.date_cleared);
    let date_added = parse_audit_date(&source.date_added);
    let start_updated = parse_audit_date(&source.start_date_last_updated);
    let pay_updated = parse_audit_date(&source.pay_location_last_updated);

    let staff_name = format!("{} {}", source.first_name, source.last_name)
        .trim()
        .to_string();
    let hire_month = start_date
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default();

    SlaRow {
        school_year: source.school_year.clone(),
        candidate_id: source.candidate_id.clone(),
        staff_name,
        newhire_type: source.newhire_type.clone(),
        hr_cleared: source.hr_cleared.clone(),
        personal_email: source.personal_email.clone(),
        work_location: source.work_location.clone(),
        pay_location: source.pay_location.clone(),
        start_date: source.start_date.clone(),
        title: source.title.clone(),
        former_kipp: source.former_kipp.clone(),
        sped: source.sped.clone(),
        cleared_email_sent: source.cleared_email_sent.clone(),
        completion_status: source.completion_status.clone(),
        gls_tracking: source.gls_tracking.clone(),
        assigned_technician: source.assigned_technician.clone(),
        computer_type: source.computer_type.clone(),
        computer_status: source.computer_status.clone(),
        phone_type: source.phone_type.clone(),
        phone_status: source.phone_status.clone(),
        date_added: source.date_added.clone(),
        start_date_last_updated: source.start_date_last_updated.clone(),
        pay_location_last_updated: source.pay_location_last_updated.clone(),
        main_last_updated: source.main_last_updated.clone(),
        date_cleared: date_cleared
            .map(|d| d.format(AUDIT_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        hire_month,
        start_date_change: date_moved_after_add(date_added, start_updated),
        location_change: date_moved_after_add(date_added, pay_updated),
        met_sla: eval_met_sla(start_date, date_cleared, today, grace_days),
        include_in_denominator: eval_denominator(start_date, date_cleared, today, grace_days),
        timeliness_days: eval_timeliness(start_date, date_cleared),
    }
}

/// 1 when the tracked field's last-updated date is later than the day the
/// record was added, i.e. the value moved after intake.
fn date_moved_after_add(date_added: Option<NaiveDate>, last_updated: Option<NaiveDate>) -> u8 {
    match (date_added, last_updated) {
        (Some(added), Some(updated)) if added < updated => 1,
        _ => 0,
    }
}

/// Tri-state SLA evaluation.
///
/// Cleared: met iff clearance landed `grace` days (or more) before the start
/// date. Not yet cleared: missed once the deadline has passed, otherwise
/// still pending (None). An unparseable start date leaves a pending row
/// pending and a cleared row missed.
fn eval_met_sla(
    start_date: Option<NaiveDate>,
    date_cleared: Option<NaiveDate>,
    today: NaiveDate,
    grace_days: u64,
) -> Option<u8> {
    match date_cleared {
        Some(cleared) => match start_date {
            Some(start) if plus_days(cleared, grace_days) <= start => Some(1),
            _ => Some(0),
        },
        None => match start_date {
            Some(start) if plus_days(today, grace_days) > start => Some(0),
            _ => None,
        },
    }
}

/// A record joins the SLA denominator once it is resolved (cleared) or
/// overdue (deadline passed with no clearance).
fn eval_denominator(
    start_date: Option<NaiveDate>,
    date_cleared: Option<NaiveDate>,
    today: NaiveDate,
    grace_days: u64,
) -> u8 {
    if date_cleared.is_some() {
        return 1;
    }
    match start_date {
        Some(start) if plus_days(today, grace_days) > start => 1,
        _ => 0,
    }
}

/// Days between clearance and start; negative means provisioned early.
fn eval_timeliness(start_date: Option<NaiveDate>, date_cleared: Option<NaiveDate>) -> Option<i64> {
    match (start_date, date_cleared) {
        (Some(start), Some(cleared)) => Some((cleared - start).num_days()),
        _ => None,
    }
}

fn plus_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), SHEET_DATE_FORMAT).ok()
}

fn parse_audit_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), AUDIT_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(start: &str, cleared: &str) -> SlaSourceRow {
        SlaSourceRow {
            school_year: "2025".to_string(),
            candidate_id: "1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            start_date: start.to_string(),
            date_cleared: cleared.to_string(),
            date_added: "2024-05-01".to_string(),
            start_date_last_updated: "2024-05-01".to_string(),
            pay_location_last_updated: "2024-06-15".to_string(),
            ..SlaSourceRow::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    #[test]
    fn cleared_before_start_meets_sla() {
        let row = derive_row(&source("08/01/2024", "07/25/2024"), today(), 1);
        assert_eq!(row.met_sla, Some(1));
        assert_eq!(row.include_in_denominator, 1);
        assert_eq!(row.timeliness_days, Some(-7));
        assert_eq!(row.date_cleared, "2024-07-25");
    }

    #[test]
    fn cleared_after_start_misses_sla() {
        let row = derive_row(&source("08/01/2024", "08/05/2024"), today(), 1);
        assert_eq!(row.met_sla, Some(0));
        assert_eq!(row.timeliness_days, Some(4));
    }

    #[test]
    fn cleared_on_start_day_misses_with_one_day_grace() {
        let row = derive_row(&source("08/01/2024", "08/01/2024"), today(), 1);
        assert_eq!(row.met_sla, Some(0));
        assert_eq!(row.timeliness_days, Some(0));
    }

    #[test]
    fn uncleared_past_deadline_counts_as_missed() {
        // start date in the past, no clearance: missed and in the denominator
        let row = derive_row(&source("08/01/2024", ""), today(), 1);
        assert_eq!(row.met_sla, Some(0));
        assert_eq!(row.include_in_denominator, 1);
        assert_eq!(row.timeliness_days, None);
        assert!(row.date_cleared.is_empty());
    }

    #[test]
    fn uncleared_future_start_is_pending() {
        let row = derive_row(&source("10/01/2024", ""), today(), 1);
        assert_eq!(row.met_sla, None);
        assert_eq!(row.include_in_denominator, 0);
    }

    #[test]
    fn wider_grace_window_shifts_the_deadline() {
        // today + 3 > 09/03 while today + 1 does not
        let row = derive_row(&source("09/03/2024", ""), today(), 3);
        assert_eq!(row.met_sla, Some(0));
        let row = derive_row(&source("09/03/2024", ""), today(), 1);
        assert_eq!(row.met_sla, None);
    }

    #[test]
    fn change_flags_compare_against_date_added() {
        let row = derive_row(&source("08/01/2024", ""), today(), 1);
        assert_eq!(row.start_date_change, 0);
        assert_eq!(row.location_change, 1);
    }

    #[test]
    fn derives_name_and_hire_month() {
        let row = derive_row(&source("08/01/2024", ""), today(), 1);
        assert_eq!(row.staff_name, "Ada Lovelace");
        assert_eq!(row.hire_month, "August");
    }

    #[test]
    fn unparseable_dates_stay_blank_and_pending() {
        let row = derive_row(&source("TBD", ""), today(), 1);
        assert_eq!(row.met_sla, None);
        assert_eq!(row.include_in_denominator, 0);
        assert_eq!(row.hire_month, "");
    }
}
