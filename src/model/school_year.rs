use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A school year in "YY-YY" form, e.g. "24-25" for the year running from
/// mid-2024 to mid-2025. Tab titles and the candidate start-date window are
/// both derived from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchoolYear {
    start: u16,
    end: u16,
}

#[derive(Debug, Error)]
#[error("invalid school year (expected YY-YY, e.g. 24-25): {0}")]
pub struct SchoolYearParseError(pub String);

impl FromStr for SchoolYear {
    type Err = SchoolYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some((first, second)) = trimmed.split_once('-') else {
            return Err(SchoolYearParseError(s.to_string()));
        };
        let parse_2digit = |piece: &str| -> Option<u16> {
            if piece.len() != 2 {
                return None;
            }
            piece.parse::<u16>().ok().map(|yy| 2000 + yy)
        };
        let (Some(start), Some(end)) = (parse_2digit(first), parse_2digit(second)) else {
            return Err(SchoolYearParseError(s.to_string()));
        };
        if end != start + 1 {
            return Err(SchoolYearParseError(s.to_string()));
        }
        Ok(Self { start, end })
    }
}

impl Display for SchoolYear {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.start % 100, self.end % 100)
    }
}

impl SchoolYear {
    /// Tracker tab title, e.g. "24-25 Tracker".
    pub fn tracker_tab(&self) -> String {
        format!("{self} Tracker")
    }

    /// Archive tab title, e.g. "24-25 Cleared".
    pub fn cleared_tab(&self) -> String {
        format!("{self} Cleared")
    }

    /// HR MOT master tab title, e.g. "Master_24-25".
    pub fn mot_tab(&self) -> String {
        format!("Master_{self}")
    }

    /// Four-digit reporting year, e.g. "2025" for 24-25.
    pub fn reporting_year(&self) -> String {
        self.end.to_string()
    }

    /// Candidate start-date window: June 30 of the opening year (inclusive)
    /// through July 1 of the closing year (exclusive).
    pub fn start_date_window(&self) -> (NaiveDate, NaiveDate) {
        let from = NaiveDate::from_ymd_opt(i32::from(self.start), 6, 30)
            .expect("June 30 is a valid date");
        let until =
            NaiveDate::from_ymd_opt(i32::from(self.end), 7, 1).expect("July 1 is a valid date");
        (from, until)
    }

    /// Whether a candidate start date falls inside this school year.
    pub fn contains_start_date(&self, date: NaiveDate) -> bool {
        let (from, until) = self.start_date_window();
        date >= from && date < until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_round_trip() {
        let year: SchoolYear = "24-25".parse().expect("valid year");
        assert_eq!(year.to_string(), "24-25");
        assert_eq!(year.tracker_tab(), "24-25 Tracker");
        assert_eq!(year.cleared_tab(), "24-25 Cleared");
        assert_eq!(year.mot_tab(), "Master_24-25");
        assert_eq!(year.reporting_year(), "2025");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("2425".parse::<SchoolYear>().is_err());
        assert!("24-26".parse::<SchoolYear>().is_err());
        assert!("Offboarding".parse::<SchoolYear>().is_err());
        assert!("24-".parse::<SchoolYear>().is_err());
    }

    #[test]
    fn start_date_window_brackets_the_year() {
        let year: SchoolYear = "22-23".parse().expect("valid year");
        let inside = NaiveDate::from_ymd_opt(2022, 8, 15).unwrap();
        let before = NaiveDate::from_ymd_opt(2022, 6, 29).unwrap();
        let boundary = NaiveDate::from_ymd_opt(2022, 6, 30).unwrap();
        let after = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert!(year.contains_start_date(inside));
        assert!(year.contains_start_date(boundary));
        assert!(!year.contains_start_date(before));
        assert!(!year.contains_start_date(after));
    }
}
