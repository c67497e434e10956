use crate::model::{SchoolYear, RESCINDED_SENTINEL};
use crate::sla::SlaSourceRow;

/// Which side of the archive split a yearly tab sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Tracker,
    Cleared,
}

/// Classify a tab by its title. Only "{YY-YY} Tracker" / "{YY-YY} Cleared"
/// titles participate in the SLA source; anything else (the offboarding
/// tabs, SLA_data_source itself, scratch tabs) is skipped.
pub fn classify_tab(title: &str) -> Option<(SchoolYear, TabKind)> {
    let (prefix, suffix) = title.trim().rsplit_once(' ')?;
    let kind = match suffix {
        "Tracker" => TabKind::Tracker,
        "Cleared" => TabKind::Cleared,
        _ => return None,
    };
    let year: SchoolYear = prefix.parse().ok()?;
    Some((year, kind))
}

/// Decode a yearly tab's rows by header name into [`SlaSourceRow`]s.
///
/// The tabs carry tech-owned columns the reconciliation jobs never touch, so
/// this read is header-driven rather than positional; columns a given year's
/// tab lacks decode as blank. Rows with a blank candidate id are dropped.
pub fn decode_tab(
    year: SchoolYear,
    kind: TabKind,
    header: &[String],
    rows: &[Vec<String>],
) -> Vec<SlaSourceRow> {
    let col = |name: &str| -> Option<usize> {
        header.iter().position(|h| h.trim() == name)
    };
    let columns: Vec<(usize, fn(&mut SlaSourceRow, String))> = FIELD_COLUMNS
        .iter()
        .filter_map(|(name, set)| col(name).map(|idx| (idx, *set)))
        .collect();
    let date_cleared_col = match kind {
        TabKind::Cleared => col("Date Cleared"),
        TabKind::Tracker => None,
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut decoded = SlaSourceRow {
            school_year: year.reporting_year(),
            ..SlaSourceRow::default()
        };
        for (idx, set) in &columns {
            let value = row.get(*idx).map(|v| v.trim().to_string()).unwrap_or_default();
            set(&mut decoded, value);
        }
        if let Some(idx) = date_cleared_col {
            decoded.date_cleared = row.get(idx).map(|v| v.trim().to_string()).unwrap_or_default();
        }
        if decoded.candidate_id.is_empty() {
            continue;
        }
        out.push(decoded);
    }
    out
}

/// Union the decoded tabs and drop rescinded hires. Tracker rows join with a
/// blank clearance date; archive rows keep theirs.
pub fn aggregate(tabs: Vec<(TabKind, Vec<SlaSourceRow>)>) -> Vec<SlaSourceRow> {
    let mut combined = Vec::new();
    for (kind, mut rows) in tabs {
        if kind == TabKind::Tracker {
            for row in &mut rows {
                row.date_cleared.clear();
            }
        }
        combined.extend(rows);
    }
    combined.retain(|row| row.rescinded == RESCINDED_SENTINEL || row.rescinded.trim().is_empty());
    combined
}

type FieldSetter = fn(&mut SlaSourceRow, String);

const FIELD_COLUMNS: &[(&str, FieldSetter)] = &[
    ("job_candidate_id", |r, v| r.candidate_id = v),
    ("First Name", |r, v| r.first_name = v),
    ("Last Name", |r, v| r.last_name = v),
    ("New, Returners, Rehire or Transfer", |r, v| {
        r.newhire_type = v
    }),
    ("Cleared?", |r, v| r.hr_cleared = v),
    ("Personal Email", |r, v| r.personal_email = v),
    ("Work Location", |r, v| r.work_location = v),
    ("Pay Location", |r, v| r.pay_location = v),
    ("Start Date", |r, v| r.start_date = v),
    ("Title", |r, v| r.title = v),
    ("Former or Current KIPP", |r, v| r.former_kipp = v),
    ("SpEd?", |r, v| r.sped = v),
    ("Cleared Email Sent", |r, v| r.cleared_email_sent = v),
    ("Rescinded", |r, v| r.rescinded = v),
    ("Completion Status", |r, v| r.completion_status = v),
    ("GLS Tracking #", |r, v| r.gls_tracking = v),
    ("Assigned Technician", |r, v| r.assigned_technician = v),
    ("Computer Type", |r, v| r.computer_type = v),
    ("Computer Status", |r, v| r.computer_status = v),
    ("Phone Type", |r, v| r.phone_type = v),
    ("Phone Status", |r, v| r.phone_status = v),
    ("Date Added", |r, v| r.date_added = v),
    ("Start Date - Last Updated", |r, v| {
        r.start_date_last_updated = v
    }),
    ("Pay Location - Last Updated", |r, v| {
        r.pay_location_last_updated = v
    }),
    ("Main Last Updated", |r, v| r.main_last_updated = v),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_yearly_tabs_only() {
        let (year, kind) = classify_tab("24-25 Tracker").expect("tracker tab");
        assert_eq!(year.to_string(), "24-25");
        assert_eq!(kind, TabKind::Tracker);
        assert_eq!(
            classify_tab("22-23 Cleared").map(|(_, k)| k),
            Some(TabKind::Cleared)
        );
        assert!(classify_tab("Offboarding Tracker").is_none());
        assert!(classify_tab("Offboarding - Cleared").is_none());
        assert!(classify_tab("SLA_data_source").is_none());
    }

    fn header() -> Vec<String> {
        [
            "job_candidate_id",
            "First Name",
            "Last Name",
            "Start Date",
            "Rescinded",
            "Date Cleared",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(id: &str, rescinded: &str, cleared: &str) -> Vec<String> {
        vec![
            id.to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "08/01/2024".to_string(),
            rescinded.to_string(),
            cleared.to_string(),
        ]
    }

    #[test]
    fn decodes_by_header_name_and_tags_year() {
        let year: SchoolYear = "24-25".parse().unwrap();
        let rows = vec![row("1", "--", "07/15/2024"), row("", "--", "")];
        let decoded = decode_tab(year, TabKind::Cleared, &header(), &rows);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].school_year, "2025");
        assert_eq!(decoded[0].first_name, "Ada");
        assert_eq!(decoded[0].date_cleared, "07/15/2024");
    }

    #[test]
    fn tracker_rows_lose_clearance_and_rescinded_rows_drop() {
        let year: SchoolYear = "24-25".parse().unwrap();
        let tracker = decode_tab(
            year,
            TabKind::Tracker,
            &header(),
            &[row("1", "--", "07/15/2024")],
        );
        let cleared = decode_tab(
            year,
            TabKind::Cleared,
            &header(),
            &[
                row("2", "--", "07/20/2024"),
                row("3", "Yes - 2024-05-01", "07/21/2024"),
            ],
        );

        let combined = aggregate(vec![
            (TabKind::Cleared, cleared),
            (TabKind::Tracker, tracker),
        ]);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].candidate_id, "2");
        assert_eq!(combined[0].date_cleared, "07/20/2024");
        assert_eq!(combined[1].candidate_id, "1");
        assert!(combined[1].date_cleared.is_empty());
    }
}
