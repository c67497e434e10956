use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::model::{OffboardingRecord, OnboardingRecord};

/// Compact dry-run view of the merged onboarding tracker.
pub fn render_onboarding_table(records: &[OnboardingRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Candidate",
        "Name",
        "Start Date",
        "Pay Location",
        "Cleared",
        "Rescinded",
        "Main Updated",
    ]);

    for r in records {
        let rescinded_cell = if r.is_rescinded() {
            Cell::new(&r.rescinded).fg(Color::Red)
        } else {
            Cell::new(&r.rescinded)
        };
        table.add_row(Row::from(vec![
            Cell::new(&r.candidate_id),
            Cell::new(format!("{} {}", r.first_name, r.last_name)),
            Cell::new(&r.start_date),
            Cell::new(&r.pay_location),
            Cell::new(&r.cleared),
            rescinded_cell,
            Cell::new(
                r.main_updated
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }
    table.to_string()
}

pub fn render_offboarding_table(records: &[OffboardingRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Account",
        "Staff Name",
        "Status",
        "Termination Date",
        "Position",
        "Manager",
        "Last Updated",
    ]);

    for r in records {
        table.add_row(Row::from(vec![
            Cell::new(&r.account_id),
            Cell::new(&r.staff_name),
            Cell::new(&r.status),
            Cell::new(&r.termination_date),
            Cell::new(&r.position),
            Cell::new(&r.manager_name),
            Cell::new(&r.last_updated),
        ]));
    }
    table.to_string()
}
