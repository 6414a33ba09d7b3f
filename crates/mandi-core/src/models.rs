use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

const MAX_SHELF_LIFE_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StockType {
    Fruits,
    Vegetables,
    Cereals,
}

impl StockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockType::Fruits => "Fruits",
            StockType::Vegetables => "Vegetables",
            StockType::Cereals => "Cereals",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim() {
            "Fruits" => Ok(StockType::Fruits),
            "Vegetables" => Ok(StockType::Vegetables),
            "Cereals" => Ok(StockType::Cereals),
            other => Err(CoreError::InvalidEntry(format!(
                "unsupported stock_type: {other}"
            ))),
        }
    }
}

impl fmt::Display for StockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vendor's stocked batch of one item. Core fields are immutable after
/// creation; the update cycle overwrites the five trailing fields in a single
/// assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: Uuid,
    pub uid: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub stock_type: StockType,
    pub vegetable: String,
    pub quantity: Decimal,
    pub shelf_life: i64,
    pub purchase_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub last_sold: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub waste_predicted: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub waste_reduction: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockEntry {
    pub user_id: String,
    pub date: NaiveDate,
    pub stock_type: StockType,
    pub vegetable: String,
    pub quantity: Decimal,
    pub shelf_life: i64,
    pub purchase_price: Option<Decimal>,
}

impl NewStockEntry {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.user_id.trim().is_empty() {
            return Err(CoreError::InvalidEntry("user_id is required".to_string()));
        }
        if self.vegetable.trim().is_empty() {
            return Err(CoreError::InvalidEntry(
                "vegetable is required".to_string(),
            ));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(CoreError::InvalidEntry(
                "quantity must be positive".to_string(),
            ));
        }
        if self.shelf_life <= 0 {
            return Err(CoreError::InvalidEntry(
                "shelf_life must be positive".to_string(),
            ));
        }
        if self.shelf_life > MAX_SHELF_LIFE_DAYS {
            return Err(CoreError::InvalidEntry(format!(
                "shelf_life must be at most {MAX_SHELF_LIFE_DAYS} days"
            )));
        }
        if let Some(purchase_price) = self.purchase_price {
            if purchase_price < Decimal::ZERO {
                return Err(CoreError::InvalidEntry(
                    "purchase_price must be non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Write-back of one update cycle. Values are the display-rounded prediction
/// outputs; they replace whatever the previous cycle stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUpdate {
    pub last_sold: Decimal,
    pub selling_price: Decimal,
    pub waste_predicted: Decimal,
    pub profit_loss: Decimal,
    pub waste_reduction: Decimal,
}
