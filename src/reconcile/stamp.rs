use chrono::NaiveDate;

use crate::model::{OnboardingRecord, SourceRecord, RESCINDED_SENTINEL};

/// Stamp the tracked-field change dates on a freshly merged record.
///
/// Each tracked field (`Start Date`, `Pay Location`) gets its "- Last
/// Updated" column set to the run date iff the merged value differs from the
/// prior snapshot; otherwise the prior date is retained. `Main Last Updated`
/// is the later of the two.
pub fn stamp_tracked_changes(
    merged: &mut OnboardingRecord,
    prior: &OnboardingRecord,
    run_date: NaiveDate,
) {
    if merged.start_date != prior.start_date {
        merged.start_date_updated = Some(run_date);
    } else {
        merged.start_date_updated = prior.start_date_updated;
    }
    if merged.pay_location != prior.pay_location {
        merged.pay_location_updated = Some(run_date);
    } else {
        merged.pay_location_updated = prior.pay_location_updated;
    }
    recompute_main_updated(merged);
}

/// `Main Last Updated` = the later of the two tracked-field dates.
pub fn recompute_main_updated(record: &mut OnboardingRecord) {
    record.main_updated = match (record.start_date_updated, record.pay_location_updated) {
        (Some(start), Some(pay)) => Some(start.max(pay)),
        (Some(start), None) => Some(start),
        (None, Some(pay)) => Some(pay),
        (None, None) => None,
    };
}

/// Seed a brand-new tracker record from a warehouse row: audit dates all set
/// to the run date, rescinded at its sentinel, clearance columns blank until
/// HR's MOT says otherwise.
pub fn seed_new_record(source: &SourceRecord, run_date: NaiveDate) -> OnboardingRecord {
    OnboardingRecord {
        candidate_id: source.candidate_id.clone(),
        first_name: source.first_name.clone(),
        last_name: source.last_name.clone(),
        hire_reason: source.hire_reason.clone(),
        personal_email: source.email.clone(),
        work_location: source.work_location.clone(),
        pay_location: source.pay_location.clone(),
        start_date: source.start_date_cell(),
        title: source.title.clone(),
        former_kipp: source.former_kipp.clone(),
        sped: source.sped.clone(),
        cleared: String::new(),
        cleared_email_sent: String::new(),
        rescinded: RESCINDED_SENTINEL.to_string(),
        date_added: Some(run_date),
        start_date_updated: Some(run_date),
        pay_location_updated: Some(run_date),
        main_updated: Some(run_date),
    }
}
