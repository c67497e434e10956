pub mod bigquery;
pub mod dbt;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{OffboardingRecord, SourceRecord};

/// The recruiting/HR warehouse: three report tables and an optional
/// upstream-transform trigger. Jobs depend on this trait; the BigQuery REST
/// client is the production implementation.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Kick the upstream transform job and wait for it to settle. A no-op
    /// when no trigger is configured.
    async fn refresh_upstream(&self) -> Result<()>;

    async fn onboarding_source(&self) -> Result<Vec<SourceRecord>>;

    async fn offboarding_source(&self) -> Result<Vec<OffboardingRecord>>;

    async fn rescinded_offer_ids(&self) -> Result<Vec<String>>;
}
