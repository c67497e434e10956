pub mod client;
pub mod layout;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Properties of one worksheet tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabInfo {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    pub col_count: u32,
}

/// One spreadsheet, addressed by tab title and A1 ranges.
///
/// The jobs only ever see this trait; the Google Sheets REST client is the
/// production implementation, and the tests run against in-memory fakes.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn tabs(&self) -> Result<Vec<TabInfo>>;

    /// Read a rectangular range as rows of cell strings. Trailing empty rows
    /// and cells are absent, matching what the values API returns.
    async fn read_range(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>>;

    /// Write a rectangular block with its top-left corner at `anchor`.
    async fn write_rows(&self, tab: &str, anchor: &str, rows: Vec<Vec<String>>) -> Result<()>;

    async fn update_cell(&self, tab: &str, cell: &str, value: &str) -> Result<()>;

    async fn clear_tab(&self, tab: &str) -> Result<()>;

    /// Sort the data block starting at (`first_data_row`, `first_col`), both
    /// 1-based, by the absolute 1-based column `sort_col`.
    async fn sort_data(
        &self,
        tab: &str,
        first_data_row: u32,
        first_col: u32,
        sort_col: u32,
        descending: bool,
    ) -> Result<()>;
}
