use anyhow::Result;

use crate::model::{OffboardingRecord, OnboardingRecord};
use crate::sheets::layout::{
    offboarding_to_row, onboarding_to_row, OFFBOARDING_HEADERS, ONBOARDING_HEADERS,
};

/// Render the merged onboarding tracker as CSV, headers matching the sheet.
pub fn onboarding_to_csv(records: &[OnboardingRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(ONBOARDING_HEADERS)?;
    for record in records {
        writer.write_record(onboarding_to_row(record))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn offboarding_to_csv(records: &[OffboardingRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(OFFBOARDING_HEADERS)?;
    for record in records {
        writer.write_record(offboarding_to_row(record))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
