pub mod offboarding;
pub mod onboarding;
pub mod school_year;

pub use offboarding::OffboardingRecord;
pub use onboarding::{ClearanceUpdate, OnboardingRecord, SourceRecord};
pub use school_year::{SchoolYear, SchoolYearParseError};

/// A record addressable by the primary key of its sheet.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Sentinel written into the rescinded column of rows that have not been
/// rescinded. The dated "Yes - {date}" form replaces it exactly once.
pub const RESCINDED_SENTINEL: &str = "--";

/// Date format used by audit columns (`Date Added`, `* - Last Updated`).
pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format used by the `Start Date` and `Date Cleared` sheet columns.
pub const SHEET_DATE_FORMAT: &str = "%m/%d/%Y";
