use chrono::NaiveDate;

use crate::models::StockType;

/// Business key for one entry: `{user_id}-{stock_type}-{date}-{seq}` with the
/// sequence zero-padded to two digits. Sequences of 100 and above keep their
/// natural decimal form.
pub fn format_uid(user_id: &str, stock_type: StockType, date: NaiveDate, seq: u32) -> String {
    format!("{user_id}-{stock_type}-{date}-{seq:02}")
}

/// Next per-(user, stock_type, date) sequence number given how many entries
/// already match.
pub fn next_sequence(existing_matches: usize) -> u32 {
    existing_matches as u32 + 1
}
