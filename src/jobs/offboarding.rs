use anyhow::{Context, Result};

use crate::model::OffboardingRecord;
use crate::notify::RunReport;
use crate::reconcile::merge::merge_offboarding;
use crate::reconcile::{dedup_by_key, exclude_keys};
use crate::sheets::layout::{
    offboarding_from_row, offboarding_to_row, pacific_now, refresh_timestamp, single_column_ids,
    OFFBOARDING_CLEARED_RANGE, OFFBOARDING_DATA_ROW, OFFBOARDING_FIRST_COL, OFFBOARDING_ID_COL,
    OFFBOARDING_READ_RANGE, OFFBOARDING_SORT_COL, OFFBOARDING_TIMESTAMP_CELL,
    OFFBOARDING_WRITE_ANCHOR,
};
use crate::sheets::SheetStore;
use crate::warehouse::Warehouse;

const TRACKER_TAB: &str = "Offboarding Tracker";
const CLEARED_TAB: &str = "Offboarding - Cleared";

/// Refresh the offboarding tracker from the warehouse staff report. Same
/// reconciliation shape as onboarding minus change stamping and rescissions.
pub async fn run_offboarding_refresh(
    tracker: &dyn SheetStore,
    warehouse: &dyn Warehouse,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<Vec<OffboardingRecord>> {
    let fresh = dedup_by_key(warehouse.offboarding_source().await?);

    let cleared_rows = tracker
        .read_range(CLEARED_TAB, OFFBOARDING_CLEARED_RANGE)
        .await
        .with_context(|| format!("failed reading {CLEARED_TAB}"))?;
    let cleared_ids = single_column_ids(&cleared_rows);
    let fresh = exclude_keys(fresh, &cleared_ids);
    report.note(format!("Found {} records to add or update", fresh.len()));

    if !dry_run {
        // Sort range first to eliminate possible blank rows
        tracker
            .sort_data(
                TRACKER_TAB,
                OFFBOARDING_DATA_ROW,
                OFFBOARDING_FIRST_COL,
                OFFBOARDING_ID_COL,
                false,
            )
            .await
            .with_context(|| format!("failed pre-sorting {TRACKER_TAB}"))?;
    }
    let prior: Vec<OffboardingRecord> = tracker
        .read_range(TRACKER_TAB, OFFBOARDING_READ_RANGE)
        .await
        .with_context(|| format!("failed reading {TRACKER_TAB}"))?
        .iter()
        .map(|row| offboarding_from_row(row))
        .filter(|record| !record.account_id.is_empty())
        .collect();

    let was_empty = prior.is_empty();
    let outcome = merge_offboarding(prior, fresh)?;
    if was_empty {
        report.note(format!("Tracker sheet {TRACKER_TAB} is empty"));
    } else {
        report.note(format!(
            "Updating sheet {TRACKER_TAB} with fresh data ({} matched)",
            outcome.updated
        ));
    }
    if outcome.added > 0 {
        report.note(format!(
            "Adding {} new records to sheet {TRACKER_TAB}",
            outcome.added
        ));
    } else {
        report.note(format!("No new records to add to tracker sheet {TRACKER_TAB}"));
    }

    let records = outcome.records;
    if records.is_empty() {
        report.note(format!(
            "No updates found. Nothing to refresh in sheet {TRACKER_TAB}"
        ));
    } else if !dry_run {
        let rows = records.iter().map(offboarding_to_row).collect();
        tracker
            .write_rows(TRACKER_TAB, OFFBOARDING_WRITE_ANCHOR, rows)
            .await?;
        tracker
            .sort_data(
                TRACKER_TAB,
                OFFBOARDING_DATA_ROW,
                OFFBOARDING_FIRST_COL,
                OFFBOARDING_SORT_COL,
                true,
            )
            .await?;
        report.note(format!("Finished refreshing tracker sheet {TRACKER_TAB}"));
    }

    if !dry_run {
        tracker
            .update_cell(
                TRACKER_TAB,
                OFFBOARDING_TIMESTAMP_CELL,
                &refresh_timestamp(pacific_now()),
            )
            .await?;
    }

    Ok(records)
}
