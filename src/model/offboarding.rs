use serde::{Deserialize, Serialize};

use crate::model::Keyed;

/// One row of the "Offboarding Tracker" tab, keyed by `account_id`.
///
/// The offboarding report carries every tracker column, so the same shape
/// serves both the sheet rows and the warehouse rows; a matched key is a
/// wholesale replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffboardingRecord {
    pub account_id: String,
    pub employee_id: String,
    pub staff_name: String,
    pub work_email: String,
    pub personal_email: String,
    pub work_phone: String,
    pub status: String,
    pub termination_date: String,
    pub position: String,
    pub work_location: String,
    pub pay_location: String,
    pub manager_name: String,
    pub manager_email: String,
    pub last_updated: String,
}

impl Keyed for OffboardingRecord {
    fn key(&self) -> &str {
        &self.account_id
    }
}
