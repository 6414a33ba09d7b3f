use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mandi_core::{
    CoreError, DailyUpdate, EntryStore, NewStockEntry, StockEntry, StockType, format_uid,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

const ENTRY_COLUMNS: &str = "id, uid, user_id, stock_date, stock_type, vegetable, quantity, \
     shelf_life, purchase_price, created_at, last_sold, selling_price, waste_predicted, \
     profit_loss, waste_reduction";

/// Postgres-backed store. UID sequences are assigned through an atomic upsert
/// on `uid_sequences` inside the insert transaction, so concurrent creates
/// for one (user, stock_type, date) cannot collide.
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn list_entries(&self, user_id: &str) -> Result<Vec<StockEntry>, CoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM stock_entries WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::repository)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(entry_from_row(&row)?);
        }
        Ok(entries)
    }

    async fn list_entries_for_date(
        &self,
        user_id: &str,
        stock_type: StockType,
        date: NaiveDate,
    ) -> Result<Vec<StockEntry>, CoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM stock_entries \
             WHERE user_id = $1 AND stock_type = $2 AND stock_date = $3 \
             ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(stock_type.as_str())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(CoreError::repository)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(entry_from_row(&row)?);
        }
        Ok(entries)
    }

    async fn find_by_uid(
        &self,
        user_id: &str,
        uid: &str,
    ) -> Result<Option<StockEntry>, CoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM stock_entries WHERE user_id = $1 AND uid = $2"
        ))
        .bind(user_id)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(CoreError::repository)?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn create_entry(&self, entry: NewStockEntry) -> Result<StockEntry, CoreError> {
        entry.validate()?;

        let mut tx = self.pool.begin().await.map_err(CoreError::repository)?;

        let seq_row = sqlx::query(
            r#"
            INSERT INTO uid_sequences (user_id, stock_type, stock_date, last_seq)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (user_id, stock_type, stock_date)
            DO UPDATE SET last_seq = uid_sequences.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.stock_type.as_str())
        .bind(entry.date)
        .fetch_one(&mut *tx)
        .await
        .map_err(CoreError::repository)?;
        let seq: i64 = seq_row.try_get("last_seq").map_err(CoreError::repository)?;

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let uid = format_uid(&entry.user_id, entry.stock_type, entry.date, seq as u32);

        sqlx::query(
            r#"
            INSERT INTO stock_entries (
                id, uid, user_id, stock_date, stock_type, vegetable,
                quantity, shelf_life, purchase_price, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&uid)
        .bind(&entry.user_id)
        .bind(entry.date)
        .bind(entry.stock_type.as_str())
        .bind(&entry.vegetable)
        .bind(entry.quantity)
        .bind(entry.shelf_life)
        .bind(entry.purchase_price)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(CoreError::repository)?;

        tx.commit().await.map_err(CoreError::repository)?;
        info!("entry {} created for {}", uid, entry.user_id);

        Ok(StockEntry {
            id,
            uid,
            user_id: entry.user_id,
            date: entry.date,
            stock_type: entry.stock_type,
            vegetable: entry.vegetable,
            quantity: entry.quantity,
            shelf_life: entry.shelf_life,
            purchase_price: entry.purchase_price,
            created_at,
            last_sold: None,
            selling_price: None,
            waste_predicted: None,
            profit_loss: None,
            waste_reduction: None,
        })
    }

    async fn update_entry(&self, id: Uuid, update: DailyUpdate) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stock_entries
            SET last_sold = $2,
                selling_price = $3,
                waste_predicted = $4,
                profit_loss = $5,
                waste_reduction = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.last_sold)
        .bind(update.selling_price)
        .bind(update.waste_predicted)
        .bind(update.profit_loss)
        .bind(update.waste_reduction)
        .execute(&self.pool)
        .await
        .map_err(CoreError::repository)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::repository(anyhow!("entry {id} not found")));
        }
        info!("entry {} updated", id);

        Ok(())
    }
}

fn entry_from_row(row: &PgRow) -> Result<StockEntry, CoreError> {
    let stock_type_raw: String = row.try_get("stock_type").map_err(CoreError::repository)?;

    Ok(StockEntry {
        id: row.try_get("id").map_err(CoreError::repository)?,
        uid: row.try_get("uid").map_err(CoreError::repository)?,
        user_id: row.try_get("user_id").map_err(CoreError::repository)?,
        date: row.try_get("stock_date").map_err(CoreError::repository)?,
        stock_type: StockType::parse(&stock_type_raw)?,
        vegetable: row.try_get("vegetable").map_err(CoreError::repository)?,
        quantity: row.try_get("quantity").map_err(CoreError::repository)?,
        shelf_life: row.try_get("shelf_life").map_err(CoreError::repository)?,
        purchase_price: row
            .try_get("purchase_price")
            .map_err(CoreError::repository)?,
        created_at: row.try_get("created_at").map_err(CoreError::repository)?,
        last_sold: row.try_get("last_sold").map_err(CoreError::repository)?,
        selling_price: row.try_get("selling_price").map_err(CoreError::repository)?,
        waste_predicted: row
            .try_get("waste_predicted")
            .map_err(CoreError::repository)?,
        profit_loss: row.try_get("profit_loss").map_err(CoreError::repository)?,
        waste_reduction: row
            .try_get("waste_reduction")
            .map_err(CoreError::repository)?,
    })
}
