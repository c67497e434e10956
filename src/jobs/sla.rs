use anyhow::{Context, Result};

use crate::notify::RunReport;
use crate::sheets::layout::{
    pacific_now, sla_row_values, SLA_OUTPUT_HEADERS, SLA_SOURCE_READ_RANGE, SLA_TAB,
    SLA_WRITE_ANCHOR,
};
use crate::sheets::SheetStore;
use crate::sla::aggregate::{aggregate, classify_tab, decode_tab, TabKind};
use crate::sla::metrics::derive_row;
use crate::sla::SlaRow;

/// Rebuild the SLA_data_source tab from every yearly Tracker/Cleared tab.
pub async fn run_sla_refresh(
    tracker: &dyn SheetStore,
    grace_days: u64,
    report: &mut RunReport,
) -> Result<Vec<SlaRow>> {
    let tabs = tracker.tabs().await?;

    let mut decoded = Vec::new();
    let mut tracker_tabs = 0usize;
    let mut cleared_tabs = 0usize;
    for info in &tabs {
        let Some((year, kind)) = classify_tab(&info.title) else {
            continue;
        };
        match kind {
            TabKind::Tracker => tracker_tabs += 1,
            TabKind::Cleared => cleared_tabs += 1,
        }
        let values = tracker
            .read_range(&info.title, SLA_SOURCE_READ_RANGE)
            .await
            .with_context(|| format!("failed reading {}", info.title))?;
        let Some((header, rows)) = values.split_first() else {
            report.note(format!("{} is empty", info.title));
            continue;
        };
        decoded.push((kind, decode_tab(year, kind, header, rows)));
    }
    report.note(format!(
        "Evaluated {cleared_tabs} cleared and {tracker_tabs} tracker sheets"
    ));

    let combined = aggregate(decoded);
    report.note(format!(
        "Combined sheets into {} rows, rescinded hires removed",
        combined.len()
    ));

    let today = pacific_now().date_naive();
    let rows: Vec<SlaRow> = combined
        .iter()
        .map(|source| derive_row(source, today, grace_days))
        .collect();

    report.note(format!("Inserting {} rows into {SLA_TAB}", rows.len()));
    tracker.clear_tab(SLA_TAB).await?;
    let mut values: Vec<Vec<String>> =
        vec![SLA_OUTPUT_HEADERS.iter().map(|h| h.to_string()).collect()];
    values.extend(rows.iter().map(sla_row_values));
    tracker.write_rows(SLA_TAB, SLA_WRITE_ANCHOR, values).await?;

    Ok(rows)
}
