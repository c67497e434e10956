use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{ClearanceUpdate, OffboardingRecord, OnboardingRecord, SourceRecord};
use crate::reconcile::stamp::{seed_new_record, stamp_tracked_changes};
use crate::reconcile::{dedup_by_key, index_by_key, ReconcileError};

/// Outcome of a key-indexed merge: the full post-merge table (prior order
/// preserved, new rows appended) plus the counts the run log reports.
#[derive(Debug, Clone)]
pub struct MergeOutcome<T> {
    pub records: Vec<T>,
    pub updated: usize,
    pub added: usize,
}

/// Merge fresh warehouse rows into the prior tracker snapshot.
///
/// Matched keys are overwritten field-by-field (fresh wins) and their tracked
/// fields change-stamped against the prior snapshot; unmatched fresh rows are
/// seeded as new records. Prior rows without a fresh counterpart pass through
/// untouched. `fresh` must already be de-duplicated and cleared-filtered.
pub fn merge_onboarding(
    prior: Vec<OnboardingRecord>,
    fresh: Vec<SourceRecord>,
    run_date: NaiveDate,
) -> Result<MergeOutcome<OnboardingRecord>, ReconcileError> {
    let prior_keys: BTreeSet<String> = prior.iter().map(|r| r.candidate_id.clone()).collect();
    // Validates key uniqueness on the tracker side; the index itself is not
    // consumed because prior order must survive the merge.
    index_by_key("tracker", prior.iter().map(IdOnly::of).collect::<Vec<_>>())?;
    let fresh_index = index_by_key("datasource", fresh)?;

    let mut updated = 0;
    let mut records = Vec::with_capacity(prior.len());
    for mut record in prior {
        if let Some(source) = fresh_index.get(&record.candidate_id) {
            let snapshot = record.clone();
            source.apply_to(&mut record);
            stamp_tracked_changes(&mut record, &snapshot, run_date);
            updated += 1;
        }
        records.push(record);
    }

    let mut added = 0;
    for (key, source) in &fresh_index {
        if !prior_keys.contains(key) {
            records.push(seed_new_record(source, run_date));
            added += 1;
        }
    }

    Ok(MergeOutcome {
        records,
        updated,
        added,
    })
}

/// Overlay HR's MOT clearance columns onto the merged table. Only the two
/// clearance fields move; everything else is tracker-owned.
pub fn apply_clearance(
    records: &mut [OnboardingRecord],
    updates: Vec<ClearanceUpdate>,
) -> Result<usize, ReconcileError> {
    let index = index_by_key("mot", dedup_by_key(updates))?;
    let mut applied = 0;
    for record in records.iter_mut() {
        if let Some(update) = index.get(&record.candidate_id) {
            record.cleared = update.cleared.clone();
            record.cleared_email_sent = update.cleared_email_sent.clone();
            applied += 1;
        }
    }
    Ok(applied)
}

/// Merge the offboarding report into the prior tracker snapshot. The report
/// carries every column, so a matched key is a wholesale replace; no change
/// stamping applies. `fresh` must already be de-duplicated and
/// cleared-filtered.
pub fn merge_offboarding(
    prior: Vec<OffboardingRecord>,
    fresh: Vec<OffboardingRecord>,
) -> Result<MergeOutcome<OffboardingRecord>, ReconcileError> {
    let prior_keys: BTreeSet<String> = prior.iter().map(|r| r.account_id.clone()).collect();
    index_by_key("tracker", prior.iter().map(IdOnly::of).collect::<Vec<_>>())?;
    let fresh_index = index_by_key("datasource", fresh)?;

    let mut updated = 0;
    let mut records = Vec::with_capacity(prior.len());
    for record in prior {
        match fresh_index.get(&record.account_id) {
            Some(replacement) => {
                records.push(replacement.clone());
                updated += 1;
            }
            None => records.push(record),
        }
    }

    let mut added = 0;
    for (key, record) in &fresh_index {
        if !prior_keys.contains(key) {
            records.push(record.clone());
            added += 1;
        }
    }

    Ok(MergeOutcome {
        records,
        updated,
        added,
    })
}

/// Key-only view used to run duplicate detection over a borrowed table.
struct IdOnly(String);

impl IdOnly {
    fn of<T: crate::model::Keyed>(row: &T) -> Self {
        Self(row.key().to_string())
    }
}

impl crate::model::Keyed for IdOnly {
    fn key(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::model::RESCINDED_SENTINEL;

    pub fn tracker_record(id: &str) -> OnboardingRecord {
        OnboardingRecord {
            candidate_id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            hire_reason: "New".to_string(),
            personal_email: "ada@example.com".to_string(),
            work_location: "Bayview".to_string(),
            pay_location: "Bayview".to_string(),
            start_date: "08/01/2024".to_string(),
            title: "Teacher".to_string(),
            former_kipp: "No".to_string(),
            sped: "No".to_string(),
            cleared: String::new(),
            cleared_email_sent: String::new(),
            rescinded: RESCINDED_SENTINEL.to_string(),
            date_added: NaiveDate::from_ymd_opt(2024, 1, 1),
            start_date_updated: NaiveDate::from_ymd_opt(2024, 1, 1),
            pay_location_updated: NaiveDate::from_ymd_opt(2024, 1, 1),
            main_updated: NaiveDate::from_ymd_opt(2024, 1, 1),
        }
    }

    pub fn source_record(id: &str) -> SourceRecord {
        SourceRecord {
            candidate_id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            hire_reason: "New".to_string(),
            email: "ada@example.com".to_string(),
            work_location: "Bayview".to_string(),
            pay_location: "Bayview".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 8, 1),
            title: "Teacher".to_string(),
            former_kipp: "No".to_string(),
            sped: "No".to_string(),
        }
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn fresh_values_win_for_matched_keys() {
        let prior = vec![tracker_record("1")];
        let mut source = source_record("1");
        source.pay_location = "Heartwood".to_string();
        source.title = "Lead Teacher".to_string();

        let outcome = merge_onboarding(prior, vec![source], run_date()).expect("merge");
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 0);
        let merged = &outcome.records[0];
        assert_eq!(merged.pay_location, "Heartwood");
        assert_eq!(merged.title, "Lead Teacher");
        // changed tracked field is stamped with the run date
        assert_eq!(merged.pay_location_updated, Some(run_date()));
        // unchanged tracked field keeps its prior stamp
        assert_eq!(
            merged.start_date_updated,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn worked_example_from_the_tracker() {
        // prior {id=1, pay_location="A", stamped 2024-01-01}; fresh
        // {id=1, pay_location="B"}; run 2024-02-01.
        let mut prior = tracker_record("1");
        prior.pay_location = "A".to_string();
        let mut source = source_record("1");
        source.pay_location = "B".to_string();

        let outcome = merge_onboarding(vec![prior], vec![source], run_date()).expect("merge");
        let merged = &outcome.records[0];
        assert_eq!(merged.pay_location, "B");
        assert_eq!(merged.pay_location_updated, Some(run_date()));
    }

    #[test]
    fn unmatched_fresh_rows_become_new_records() {
        let prior = vec![tracker_record("1")];
        let fresh = vec![source_record("1"), source_record("2")];

        let outcome = merge_onboarding(prior, fresh, run_date()).expect("merge");
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.records.len(), 2);
        let seeded = &outcome.records[1];
        assert_eq!(seeded.candidate_id, "2");
        assert_eq!(seeded.date_added, Some(run_date()));
        assert_eq!(seeded.rescinded, RESCINDED_SENTINEL);
    }

    #[test]
    fn prior_rows_without_fresh_match_pass_through() {
        let prior = vec![tracker_record("1"), tracker_record("2")];
        let fresh = vec![source_record("2")];

        let outcome = merge_onboarding(prior.clone(), fresh, run_date()).expect("merge");
        assert_eq!(outcome.records[0], prior[0]);
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn duplicate_tracker_keys_abort_the_merge() {
        let prior = vec![tracker_record("1"), tracker_record("1")];
        let err = merge_onboarding(prior, vec![], run_date()).expect_err("must fail");
        match err {
            ReconcileError::DuplicateKeys { table, keys } => {
                assert_eq!(table, "tracker");
                assert_eq!(keys, vec!["1".to_string()]);
            }
        }
    }

    #[test]
    fn clearance_overlay_touches_only_clearance_columns() {
        let mut records = vec![tracker_record("1"), tracker_record("2")];
        let updates = vec![ClearanceUpdate {
            candidate_id: "2".to_string(),
            cleared: "Yes".to_string(),
            cleared_email_sent: "Yes".to_string(),
        }];

        let applied = apply_clearance(&mut records, updates).expect("overlay");
        assert_eq!(applied, 1);
        assert_eq!(records[1].cleared, "Yes");
        assert_eq!(records[1].cleared_email_sent, "Yes");
        assert!(records[0].cleared.is_empty());
        assert_eq!(records[1].pay_location, "Bayview");
    }

    fn offboarding_record(id: &str, status: &str) -> OffboardingRecord {
        OffboardingRecord {
            account_id: id.to_string(),
            employee_id: format!("E{id}"),
            staff_name: "Lovelace, Ada".to_string(),
            work_email: "ada@kipp.org".to_string(),
            personal_email: "ada@example.com".to_string(),
            work_phone: String::new(),
            status: status.to_string(),
            termination_date: "06/15/2024".to_string(),
            position: "Teacher".to_string(),
            work_location: "Bayview".to_string(),
            pay_location: "Bayview".to_string(),
            manager_name: "Byron, Annabella".to_string(),
            manager_email: "annabella@kipp.org".to_string(),
            last_updated: "2024-06-01".to_string(),
        }
    }

    #[test]
    fn offboarding_merge_replaces_matched_rows_wholesale() {
        let prior = vec![offboarding_record("10", "Active")];
        let fresh = vec![
            offboarding_record("10", "Terminated"),
            offboarding_record("11", "Active"),
        ];

        let outcome = merge_offboarding(prior, fresh).expect("merge");
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.records[0].status, "Terminated");
        assert_eq!(outcome.records[1].account_id, "11");
    }
}
