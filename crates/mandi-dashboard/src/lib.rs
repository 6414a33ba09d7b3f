use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use mandi_core::StockEntry;
use mandi_predict::{projected_waste_units, round1};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const CHART_COLORS: [&str; 5] = ["#FF6B6B", "#FFD93D", "#6BCB77", "#4D96FF", "#9B59B6"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_inventory: Decimal,
    pub waste_this_month: Decimal,
    pub waste_last_month: Decimal,
    /// Relative change against last month, percent. Negative when waste grew.
    pub waste_reduction: Decimal,
    pub efficiency_rate: Decimal,
    pub monthly_trend: Vec<MonthlyWaste>,
    pub category_breakdown: Vec<CategoryWaste>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyWaste {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub waste: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWaste {
    pub name: String,
    pub waste: Decimal,
    pub color: String,
}

/// Stateless fold over a vendor's full entry set, recomputed on every call.
/// Each entry's waste is projected with its last recorded sold quantity
/// standing in for a fresh daily figure.
pub fn dashboard_stats(entries: &[StockEntry], now: DateTime<Utc>) -> DashboardStats {
    let mut total_inventory = Decimal::ZERO;
    let mut waste_this_month = Decimal::ZERO;
    let mut waste_last_month = Decimal::ZERO;
    let mut monthly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    let mut categories: Vec<CategoryWaste> = Vec::new();

    let current = (now.year(), now.month());
    let previous = previous_month(now.year(), now.month());

    for entry in entries {
        total_inventory += entry.quantity;

        let sold = entry.last_sold.unwrap_or(Decimal::ZERO);
        let waste = projected_waste_units(entry, sold, now);

        let created = (entry.created_at.year(), entry.created_at.month());
        *monthly.entry(created).or_insert(Decimal::ZERO) += waste;

        if created == current {
            waste_this_month += waste;
        } else if created == previous {
            waste_last_month += waste;
        }

        let name = entry.stock_type.as_str();
        match categories.iter_mut().find(|category| category.name == name) {
            Some(category) => category.waste += waste,
            None => categories.push(CategoryWaste {
                name: name.to_string(),
                waste,
                color: String::new(),
            }),
        }
    }

    for (index, category) in categories.iter_mut().enumerate() {
        category.color = CHART_COLORS[index % CHART_COLORS.len()].to_string();
    }

    let hundred = Decimal::from(100);
    let efficiency_rate = if total_inventory > Decimal::ZERO {
        round1((Decimal::ONE - waste_this_month / total_inventory) * hundred)
    } else {
        Decimal::ZERO
    };
    let waste_reduction = if waste_last_month > Decimal::ZERO {
        round1((waste_last_month - waste_this_month) / waste_last_month * hundred)
    } else {
        Decimal::ZERO
    };

    let monthly_trend = monthly
        .into_iter()
        .map(|((year, month), waste)| MonthlyWaste {
            year,
            month,
            label: format!("{} {}", MONTH_NAMES[month as usize - 1], year),
            waste: round1(waste),
        })
        .collect();

    DashboardStats {
        total_inventory: round1(total_inventory),
        waste_this_month: round1(waste_this_month),
        waste_last_month: round1(waste_last_month),
        waste_reduction,
        efficiency_rate,
        monthly_trend,
        category_breakdown: categories,
    }
}

/// Calendar month immediately before (year, month), rolling January back to
/// December of the previous year.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}
