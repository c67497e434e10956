use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{OnboardingRecord, RESCINDED_SENTINEL};

/// Mark rescinded offers in the merged table.
///
/// A row is stamped `Yes - {run date}` only when its key is in the rescinded
/// set AND its rescinded column still holds the sentinel; already-marked rows
/// keep their original stamp, so repeated passes are idempotent.
pub fn apply_rescissions(
    records: &mut [OnboardingRecord],
    rescinded_ids: &BTreeSet<String>,
    run_date: NaiveDate,
) -> usize {
    let mut marked = 0;
    for record in records.iter_mut() {
        if rescinded_ids.contains(&record.candidate_id) && record.rescinded == RESCINDED_SENTINEL {
            record.rescinded = format!("Yes - {run_date}");
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::merge::tests::tracker_record;

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn stamps_only_unmarked_matching_rows() {
        let mut records = vec![tracker_record("1"), tracker_record("2")];
        let run_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let marked = apply_rescissions(&mut records, &ids(&["2"]), run_date);
        assert_eq!(marked, 1);
        assert_eq!(records[1].rescinded, "Yes - 2024-02-01");
        assert_eq!(records[0].rescinded, RESCINDED_SENTINEL);
    }

    #[test]
    fn second_pass_never_overwrites_a_stamp() {
        let mut records = vec![tracker_record("1")];
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        apply_rescissions(&mut records, &ids(&["1"]), first);
        let marked = apply_rescissions(&mut records, &ids(&["1"]), later);
        assert_eq!(marked, 0);
        assert_eq!(records[0].rescinded, "Yes - 2024-02-01");
    }
}
