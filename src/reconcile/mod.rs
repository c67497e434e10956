pub mod merge;
pub mod rescind;
pub mod stamp;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::model::Keyed;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("duplicate keys in {table}: {}", keys.join(", "))]
    DuplicateKeys {
        table: &'static str,
        keys: Vec<String>,
    },
}

/// Index rows by key, failing when the same key appears twice. A duplicate
/// makes the key-indexed update ambiguous, so the run aborts with the
/// offending keys rather than reconciling against stale data.
pub fn index_by_key<T: Keyed>(
    table: &'static str,
    rows: Vec<T>,
) -> Result<BTreeMap<String, T>, ReconcileError> {
    let mut index = BTreeMap::new();
    let mut duplicates = BTreeSet::new();
    for row in rows {
        let key = row.key().to_string();
        if index.insert(key.clone(), row).is_some() {
            duplicates.insert(key);
        }
    }
    if duplicates.is_empty() {
        Ok(index)
    } else {
        Err(ReconcileError::DuplicateKeys {
            table,
            keys: duplicates.into_iter().collect(),
        })
    }
}

/// Collapse duplicate keys, first row wins. Applied to external source pulls
/// before indexing; tracker-owned tables go through [`index_by_key`] instead
/// and abort on duplicates.
pub fn dedup_by_key<T: Keyed>(rows: Vec<T>) -> Vec<T> {
    let mut seen = BTreeSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.key().to_string()))
        .collect()
}

/// Anti-join: retain rows whose key is NOT in `excluded`. Blank keys are
/// dropped as well; a row without a key cannot be reconciled.
pub fn exclude_keys<T: Keyed>(rows: Vec<T>, excluded: &BTreeSet<String>) -> Vec<T> {
    rows.into_iter()
        .filter(|row| !row.key().trim().is_empty() && !excluded.contains(row.key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row(&'static str);

    impl Keyed for Row {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn index_rejects_duplicates_with_offending_keys() {
        let rows = vec![Row("a"), Row("b"), Row("a"), Row("c"), Row("c")];
        let err = index_by_key("tracker", rows).expect_err("duplicates must fail");
        match err {
            ReconcileError::DuplicateKeys { table, keys } => {
                assert_eq!(table, "tracker");
                assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
            }
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rows = vec![Row("a"), Row("b"), Row("a")];
        let deduped = dedup_by_key(rows);
        assert_eq!(
            deduped.iter().map(|r| r.0).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn exclude_drops_cleared_and_blank_keys() {
        let cleared: BTreeSet<String> = ["b".to_string()].into_iter().collect();
        let rows = vec![Row("a"), Row("b"), Row(""), Row("c")];
        let kept = exclude_keys(rows, &cleared);
        assert_eq!(kept.iter().map(|r| r.0).collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
