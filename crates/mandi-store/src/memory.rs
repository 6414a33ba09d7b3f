use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mandi_core::{
    CoreError, DailyUpdate, EntryStore, NewStockEntry, StockEntry, StockType, format_uid,
    next_sequence,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store for tests and local development. Sequence assignment
/// counts matching entries under the write lock, so creates within one
/// process cannot collide on a UID.
#[derive(Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<HashMap<Uuid, StockEntry>>,
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn list_entries(&self, user_id: &str) -> Result<Vec<StockEntry>, CoreError> {
        let entries = self.entries.read().await;
        let mut matches: Vec<StockEntry> = entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn list_entries_for_date(
        &self,
        user_id: &str,
        stock_type: StockType,
        date: NaiveDate,
    ) -> Result<Vec<StockEntry>, CoreError> {
        let entries = self.entries.read().await;
        let mut matches: Vec<StockEntry> = entries
            .values()
            .filter(|entry| {
                entry.user_id == user_id && entry.stock_type == stock_type && entry.date == date
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn find_by_uid(
        &self,
        user_id: &str,
        uid: &str,
    ) -> Result<Option<StockEntry>, CoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .find(|entry| entry.user_id == user_id && entry.uid == uid)
            .cloned())
    }

    async fn create_entry(&self, entry: NewStockEntry) -> Result<StockEntry, CoreError> {
        entry.validate()?;

        let mut entries = self.entries.write().await;
        let existing = entries
            .values()
            .filter(|candidate| {
                candidate.user_id == entry.user_id
                    && candidate.stock_type == entry.stock_type
                    && candidate.date == entry.date
            })
            .count();
        let uid = format_uid(
            &entry.user_id,
            entry.stock_type,
            entry.date,
            next_sequence(existing),
        );

        let stored = StockEntry {
            id: Uuid::new_v4(),
            uid,
            user_id: entry.user_id,
            date: entry.date,
            stock_type: entry.stock_type,
            vegetable: entry.vegetable,
            quantity: entry.quantity,
            shelf_life: entry.shelf_life,
            purchase_price: entry.purchase_price,
            created_at: Utc::now(),
            last_sold: None,
            selling_price: None,
            waste_predicted: None,
            profit_loss: None,
            waste_reduction: None,
        };
        entries.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_entry(&self, id: Uuid, update: DailyUpdate) -> Result<(), CoreError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| CoreError::repository(anyhow::anyhow!("entry {id} not found")))?;

        entry.last_sold = Some(update.last_sold);
        entry.selling_price = Some(update.selling_price);
        entry.waste_predicted = Some(update.waste_predicted);
        entry.profit_loss = Some(update.profit_loss);
        entry.waste_reduction = Some(update.waste_reduction);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mandi_core::StockType;
    use rust_decimal::Decimal;

    use super::*;

    fn new_entry(user_id: &str, stock_type: StockType) -> NewStockEntry {
        NewStockEntry {
            user_id: user_id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            stock_type,
            vegetable: "Tomatoes".to_string(),
            quantity: Decimal::from(100),
            shelf_life: 5,
            purchase_price: Some(Decimal::from(10)),
        }
    }

    #[tokio::test]
    async fn sequences_increment_per_user_type_and_date() {
        let store = InMemoryEntryStore::default();

        let first = store
            .create_entry(new_entry("u1", StockType::Vegetables))
            .await
            .unwrap();
        let second = store
            .create_entry(new_entry("u1", StockType::Vegetables))
            .await
            .unwrap();
        let other_type = store
            .create_entry(new_entry("u1", StockType::Fruits))
            .await
            .unwrap();

        assert_eq!(first.uid, "u1-Vegetables-2025-01-15-01");
        assert_eq!(second.uid, "u1-Vegetables-2025-01-15-02");
        assert_eq!(other_type.uid, "u1-Fruits-2025-01-15-01");
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_uids() {
        let store = std::sync::Arc::new(InMemoryEntryStore::default());

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_entry(new_entry("u1", StockType::Cereals))
                    .await
                    .unwrap()
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_entry(new_entry("u1", StockType::Cereals))
                    .await
                    .unwrap()
            })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_ne!(a.uid, b.uid);
    }

    #[tokio::test]
    async fn date_scoped_listing_matches_the_sequence_key() {
        let store = InMemoryEntryStore::default();
        store
            .create_entry(new_entry("u1", StockType::Vegetables))
            .await
            .unwrap();
        store
            .create_entry(new_entry("u1", StockType::Fruits))
            .await
            .unwrap();
        store
            .create_entry(new_entry("u2", StockType::Vegetables))
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let matches = store
            .list_entries_for_date("u1", StockType::Vegetables, date)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].uid, "u1-Vegetables-2025-01-15-01");

        let other_day = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();
        assert!(store
            .list_entries_for_date("u1", StockType::Vegetables, other_day)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_user() {
        let store = InMemoryEntryStore::default();
        store
            .create_entry(new_entry("u1", StockType::Vegetables))
            .await
            .unwrap();
        store
            .create_entry(new_entry("u2", StockType::Vegetables))
            .await
            .unwrap();

        let mine = store.list_entries("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "u1");
    }

    #[tokio::test]
    async fn update_cycle_overwrites_previous_prediction() {
        let store = InMemoryEntryStore::default();
        let created = store
            .create_entry(new_entry("u1", StockType::Vegetables))
            .await
            .unwrap();

        let first = DailyUpdate {
            last_sold: Decimal::from(5),
            selling_price: Decimal::from(12),
            waste_predicted: Decimal::from(50),
            profit_loss: Decimal::from(-690),
            waste_reduction: Decimal::ZERO,
        };
        store.update_entry(created.id, first).await.unwrap();

        let second = DailyUpdate {
            last_sold: Decimal::from(8),
            selling_price: Decimal::from(14),
            waste_predicted: Decimal::from(20),
            profit_loss: Decimal::from(-300),
            waste_reduction: Decimal::from(30),
        };
        store.update_entry(created.id, second).await.unwrap();

        let entry = store
            .find_by_uid("u1", &created.uid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.last_sold, Some(Decimal::from(8)));
        assert_eq!(entry.waste_predicted, Some(Decimal::from(20)));
        assert_eq!(entry.waste_reduction, Some(Decimal::from(30)));
    }

    #[tokio::test]
    async fn invalid_new_entry_is_rejected() {
        let store = InMemoryEntryStore::default();
        let mut bad = new_entry("u1", StockType::Vegetables);
        bad.shelf_life = 0;

        assert!(matches!(
            store.create_entry(bad).await,
            Err(CoreError::InvalidEntry(_))
        ));
    }

    #[tokio::test]
    async fn updating_unknown_entry_fails() {
        let store = InMemoryEntryStore::default();
        let update = DailyUpdate {
            last_sold: Decimal::ONE,
            selling_price: Decimal::ONE,
            waste_predicted: Decimal::ZERO,
            profit_loss: Decimal::ZERO,
            waste_reduction: Decimal::ZERO,
        };

        assert!(matches!(
            store.update_entry(Uuid::new_v4(), update).await,
            Err(CoreError::Repository(_))
        ));
    }
}
