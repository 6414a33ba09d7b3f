pub mod errors;
pub mod models;
pub mod storage;
pub mod uid;

pub use errors::CoreError;
pub use models::{DailyUpdate, NewStockEntry, StockEntry, StockType};
pub use storage::EntryStore;
pub use uid::{format_uid, next_sequence};
