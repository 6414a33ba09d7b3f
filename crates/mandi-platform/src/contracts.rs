use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub user_id: String,
    pub date: NaiveDate,
    pub stock_type: String,
    pub vegetable: String,
    pub quantity: Option<Decimal>,
    pub shelf_life: Option<i64>,
    pub purchase_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryResponse {
    pub id: Uuid,
    pub uid: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntriesQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryView {
    pub id: Uuid,
    pub uid: String,
    pub date: NaiveDate,
    pub stock_type: String,
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
pub struct ListEntriesResponse {
    pub items: Vec<EntryView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesRequest {
    pub user_id: String,
    pub daily_sold: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub uid: String,
    pub average_stock: Decimal,
    pub remaining_days: i64,
    pub waste_units: Decimal,
    pub sold_units: Decimal,
    pub total_selling_revenue: Decimal,
    pub profit_loss: Decimal,
    pub waste_reduction: Decimal,
    pub waste_predicted_rounded: Decimal,
    pub profit_loss_rounded: Decimal,
    pub waste_reduction_rounded: Decimal,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub waste: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub waste: Decimal,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_inventory: Decimal,
    pub waste_this_month: Decimal,
    pub waste_last_month: Decimal,
    pub waste_reduction: Decimal,
    pub efficiency_rate: Decimal,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub category_breakdown: Vec<CategorySlice>,
}
