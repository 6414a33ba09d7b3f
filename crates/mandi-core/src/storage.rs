use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::{DailyUpdate, NewStockEntry, StockEntry, StockType};

/// Repository seam over the external document store. The store assigns both
/// the opaque `id` and the business `uid` on create.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list_entries(&self, user_id: &str) -> Result<Vec<StockEntry>, CoreError>;

    /// Entries for one (user, stock_type, date) batch key — the match set a
    /// UID sequence is counted against.
    async fn list_entries_for_date(
        &self,
        user_id: &str,
        stock_type: StockType,
        date: NaiveDate,
    ) -> Result<Vec<StockEntry>, CoreError>;

    async fn find_by_uid(
        &self,
        user_id: &str,
        uid: &str,
    ) -> Result<Option<StockEntry>, CoreError>;

    async fn create_entry(&self, entry: NewStockEntry) -> Result<StockEntry, CoreError>;

    async fn update_entry(&self, id: Uuid, update: DailyUpdate) -> Result<(), CoreError>;
}
