pub mod config;
pub mod contracts;
pub mod db;

pub use config::ServiceConfig;
pub use contracts::{
    CategorySlice, CreateEntryRequest, CreateEntryResponse, DailySalesRequest, DashboardQuery,
    DashboardResponse, EntryView, ListEntriesQuery, ListEntriesResponse, MonthlyTrendPoint,
    PredictionResponse,
};
pub use db::connect_database;
