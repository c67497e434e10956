use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::model::{OnboardingRecord, SchoolYear};
use crate::notify::RunReport;
use crate::reconcile::merge::{apply_clearance, merge_onboarding};
use crate::reconcile::rescind::apply_rescissions;
use crate::reconcile::{dedup_by_key, exclude_keys};
use crate::sheets::layout::{
    mot_clearance_from_row, onboarding_from_row, onboarding_to_row, pacific_now,
    refresh_timestamp, single_column_ids, MOT_READ_RANGE, ONBOARDING_CLEARED_RANGE,
    ONBOARDING_DATA_ROW, ONBOARDING_FIRST_COL, ONBOARDING_ID_COL, ONBOARDING_READ_RANGE,
    ONBOARDING_SORT_COL, ONBOARDING_TIMESTAMP_CELL, ONBOARDING_WRITE_ANCHOR,
};
use crate::sheets::SheetStore;
use crate::warehouse::Warehouse;

/// Refresh one school year's onboarding tracker against the recruiting
/// warehouse and HR's MOT.
///
/// Returns the full merged table (what the tracker tab now holds, or would
/// hold under `--dry-run`).
#[allow(clippy::too_many_arguments)]
pub async fn run_onboarding_refresh(
    tracker: &dyn SheetStore,
    hr_mot: &dyn SheetStore,
    warehouse: &dyn Warehouse,
    year: SchoolYear,
    refresh_warehouse: bool,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<Vec<OnboardingRecord>> {
    if refresh_warehouse {
        report.note("Refreshing warehouse before run");
        warehouse.refresh_upstream().await?;
    }

    let tracker_tab = year.tracker_tab();
    if !dry_run {
        // Sort range first to eliminate possible blank rows
        tracker
            .sort_data(
                &tracker_tab,
                ONBOARDING_DATA_ROW,
                ONBOARDING_FIRST_COL,
                ONBOARDING_ID_COL,
                false,
            )
            .await
            .with_context(|| format!("failed pre-sorting {tracker_tab}"))?;
    }
    let prior: Vec<OnboardingRecord> = tracker
        .read_range(&tracker_tab, ONBOARDING_READ_RANGE)
        .await
        .with_context(|| format!("failed reading {tracker_tab}"))?
        .iter()
        .map(|row| onboarding_from_row(row))
        .filter(|record| !record.candidate_id.is_empty())
        .collect();
    report.note(format!(
        "Read {} records from {tracker_tab}",
        prior.len()
    ));

    let fresh = warehouse.onboarding_source().await?;
    let fresh: Vec<_> = fresh
        .into_iter()
        .filter(|record| {
            record
                .start_date
                .map(|d| year.contains_start_date(d))
                .unwrap_or(false)
        })
        .collect();
    let fresh = dedup_by_key(fresh);

    let rescinded: BTreeSet<String> = warehouse.rescinded_offer_ids().await?.into_iter().collect();

    let cleared_rows = tracker
        .read_range(&year.cleared_tab(), ONBOARDING_CLEARED_RANGE)
        .await
        .with_context(|| format!("failed reading {}", year.cleared_tab()))?;
    let cleared_ids = single_column_ids(&cleared_rows);
    let fresh = exclude_keys(fresh, &cleared_ids);
    report.note(format!(
        "Found {} warehouse records to add or update",
        fresh.len()
    ));

    let run_date = pacific_now().date_naive();
    let was_empty = prior.is_empty();
    let outcome = merge_onboarding(prior, fresh, run_date)?;
    if was_empty {
        report.note("Tracker is empty");
    } else {
        report.note(format!("Updated {} existing records", outcome.updated));
    }
    if outcome.added > 0 {
        report.note(format!("Adding {} new records to tracker", outcome.added));
    } else {
        report.note("No new records to add to tracker");
    }

    let mut records = outcome.records;
    if records.is_empty() {
        report.note("No updates found. Nothing to refresh.");
    } else {
        let marked = apply_rescissions(&mut records, &rescinded, run_date);
        if marked > 0 {
            report.note(format!("Marked {marked} rescinded offers"));
        }

        let mot_tab = year.mot_tab();
        let clearance: Vec<_> = hr_mot
            .read_range(&mot_tab, MOT_READ_RANGE)
            .await
            .with_context(|| format!("failed reading {mot_tab}"))?
            .iter()
            .filter_map(|row| mot_clearance_from_row(row))
            .collect();
        let applied = apply_clearance(&mut records, clearance)?;
        report.note(format!("Applied {applied} clearance updates from the MOT"));

        if !dry_run {
            let rows = records.iter().map(onboarding_to_row).collect();
            tracker
                .write_rows(&tracker_tab, ONBOARDING_WRITE_ANCHOR, rows)
                .await?;
            tracker
                .sort_data(
                    &tracker_tab,
                    ONBOARDING_DATA_ROW,
                    ONBOARDING_FIRST_COL,
                    ONBOARDING_SORT_COL,
                    true,
                )
                .await?;
            report.note(format!("Refreshed {tracker_tab}"));
        }
    }

    if !dry_run {
        tracker
            .update_cell(
                &tracker_tab,
                ONBOARDING_TIMESTAMP_CELL,
                &refresh_timestamp(pacific_now()),
            )
            .await?;
    }

    Ok(records)
}
