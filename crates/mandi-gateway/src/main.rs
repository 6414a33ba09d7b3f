use std::net::SocketAddr;

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use mandi_core::{CoreError, DailyUpdate, EntryStore, NewStockEntry, StockEntry, StockType};
use mandi_dashboard::{DashboardStats, dashboard_stats};
use mandi_platform::{
    CategorySlice, CreateEntryRequest, CreateEntryResponse, DailySalesRequest, DashboardQuery,
    DashboardResponse, EntryView, ListEntriesQuery, ListEntriesResponse, MonthlyTrendPoint,
    PredictionResponse, ServiceConfig, connect_database,
};
use mandi_predict::{DailyReport, predict};
use mandi_store::PgEntryStore;
use rust_decimal::Decimal;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    store: PgEntryStore,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mandi_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config.database_url).await?;

    let state = AppState {
        store: PgEntryStore::new(pool),
    };
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/{uid}/daily-sales", post(submit_daily_sales))
        .route("/dashboard", get(dashboard))
        .with_state(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<Json<CreateEntryResponse>, (StatusCode, String)> {
    let stock_type = StockType::parse(&payload.stock_type).map_err(bad_request)?;
    let quantity = payload
        .quantity
        .ok_or_else(|| bad_request(CoreError::MissingInput("quantity")))?;
    let shelf_life = payload
        .shelf_life
        .ok_or_else(|| bad_request(CoreError::MissingInput("shelf_life")))?;

    let entry = NewStockEntry {
        user_id: payload.user_id,
        date: payload.date,
        stock_type,
        vegetable: payload.vegetable,
        quantity,
        shelf_life,
        purchase_price: payload.purchase_price,
    };
    entry.validate().map_err(bad_request)?;

    let created = state.store.create_entry(entry).await.map_err(core_error)?;

    Ok(Json(CreateEntryResponse {
        id: created.id,
        uid: created.uid,
        created_at: created.created_at,
    }))
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<ListEntriesResponse>, (StatusCode, String)> {
    let entries = state
        .store
        .list_entries(&query.user_id)
        .await
        .map_err(core_error)?;

    Ok(Json(ListEntriesResponse {
        items: entries.into_iter().map(entry_view).collect(),
    }))
}

async fn submit_daily_sales(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(payload): Json<DailySalesRequest>,
) -> Result<Json<PredictionResponse>, (StatusCode, String)> {
    let daily_sold = payload
        .daily_sold
        .ok_or_else(|| bad_request(CoreError::MissingInput("daily_sold")))?;
    let selling_price = payload
        .selling_price
        .ok_or_else(|| bad_request(CoreError::MissingInput("selling_price")))?;
    if daily_sold < Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            "daily_sold must be non-negative".to_string(),
        ));
    }
    if selling_price < Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            "selling_price must be non-negative".to_string(),
        ));
    }

    let entry = state
        .store
        .find_by_uid(&payload.user_id, &uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("entry {uid} not found")))?;

    let report = DailyReport {
        daily_sold,
        selling_price,
    };
    let prediction = predict(&entry, &report, Utc::now()).map_err(core_error)?;
    let rounded = prediction.rounded();

    state
        .store
        .update_entry(
            entry.id,
            DailyUpdate {
                last_sold: report.daily_sold,
                selling_price: report.selling_price,
                waste_predicted: rounded.waste_predicted,
                profit_loss: rounded.profit_loss,
                waste_reduction: rounded.waste_reduction,
            },
        )
        .await
        .map_err(core_error)?;

    Ok(Json(PredictionResponse {
        uid: entry.uid,
        average_stock: prediction.average_stock,
        remaining_days: prediction.remaining_days,
        waste_units: prediction.waste_units,
        sold_units: prediction.sold_units,
        total_selling_revenue: prediction.total_selling_revenue,
        profit_loss: prediction.profit_loss,
        waste_reduction: prediction.waste_reduction,
        waste_predicted_rounded: rounded.waste_predicted,
        profit_loss_rounded: rounded.profit_loss,
        waste_reduction_rounded: rounded.waste_reduction,
        recommendation: prediction.recommendation,
    }))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, (StatusCode, String)> {
    let entries = state
        .store
        .list_entries(&query.user_id)
        .await
        .map_err(core_error)?;
    let stats = dashboard_stats(&entries, Utc::now());

    Ok(Json(dashboard_response(stats)))
}

fn entry_view(entry: StockEntry) -> EntryView {
    EntryView {
        id: entry.id,
        uid: entry.uid,
        date: entry.date,
        stock_type: entry.stock_type.to_string(),
        vegetable: entry.vegetable,
        quantity: entry.quantity,
        shelf_life: entry.shelf_life,
        purchase_price: entry.purchase_price,
        created_at: entry.created_at,
        last_sold: entry.last_sold,
        selling_price: entry.selling_price,
        waste_predicted: entry.waste_predicted,
        profit_loss: entry.profit_loss,
        waste_reduction: entry.waste_reduction,
    }
}

fn dashboard_response(stats: DashboardStats) -> DashboardResponse {
    DashboardResponse {
        total_inventory: stats.total_inventory,
        waste_this_month: stats.waste_this_month,
        waste_last_month: stats.waste_last_month,
        waste_reduction: stats.waste_reduction,
        efficiency_rate: stats.efficiency_rate,
        monthly_trend: stats
            .monthly_trend
            .into_iter()
            .map(|point| MonthlyTrendPoint {
                year: point.year,
                month: point.month,
                label: point.label,
                waste: point.waste,
            })
            .collect(),
        category_breakdown: stats
            .category_breakdown
            .into_iter()
            .map(|category| CategorySlice {
                name: category.name,
                waste: category.waste,
                color: category.color,
            })
            .collect(),
    }
}

fn bad_request(err: CoreError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn core_error(err: CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Repository(cause) => {
            error!("repository failure: {cause:#}");
            internal_error(cause)
        }
        other => (StatusCode::BAD_REQUEST, other.to_string()),
    }
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
