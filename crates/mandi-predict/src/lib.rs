use chrono::{DateTime, Duration, Utc};
use mandi_core::{CoreError, StockEntry};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 86_400_000;

/// One day's sale figures for an entry, already parsed and validated at the
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub daily_sold: Decimal,
    pub selling_price: Decimal,
}

/// Raw engine output. Display rounding is applied via [`Prediction::rounded`];
/// the rounded form is what gets persisted back onto the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub average_stock: Decimal,
    pub remaining_days: i64,
    pub waste_units: Decimal,
    pub sold_units: Decimal,
    pub total_purchase_cost: Decimal,
    pub total_selling_revenue: Decimal,
    pub waste_loss: Decimal,
    pub profit_loss: Decimal,
    pub waste_reduction: Decimal,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoundedPrediction {
    pub waste_predicted: Decimal,
    pub profit_loss: Decimal,
    pub waste_reduction: Decimal,
}

impl Prediction {
    pub fn rounded(&self) -> RoundedPrediction {
        RoundedPrediction {
            waste_predicted: round1(self.waste_units),
            profit_loss: round2(self.profit_loss),
            waste_reduction: round1(self.waste_reduction),
        }
    }
}

/// Projects waste, attributable sales and profit/loss for one entry from a
/// day's sale figures, evaluated against `now`.
pub fn predict(
    entry: &StockEntry,
    report: &DailyReport,
    now: DateTime<Utc>,
) -> Result<Prediction, CoreError> {
    if entry.shelf_life <= 0 {
        return Err(CoreError::InvalidEntry(
            "shelf_life must be positive".to_string(),
        ));
    }
    if entry.quantity <= Decimal::ZERO {
        return Err(CoreError::InvalidEntry(
            "quantity must be positive".to_string(),
        ));
    }

    let average_stock = entry.quantity / Decimal::from(entry.shelf_life);
    let remaining_days = remaining_shelf_days(entry.created_at, entry.shelf_life, now);
    let remaining = Decimal::from(remaining_days);

    let waste_units = ((average_stock - report.daily_sold) * remaining).max(Decimal::ZERO);
    let sold_units = report.daily_sold.min(average_stock * remaining);

    let purchase_price = entry.purchase_price.unwrap_or(Decimal::ZERO);
    let total_purchase_cost = entry.quantity * purchase_price;
    let total_selling_revenue = sold_units * report.selling_price;
    let waste_loss = waste_units * purchase_price;
    let profit_loss = total_selling_revenue - total_purchase_cost - waste_loss;

    let previous_waste = entry.waste_predicted.unwrap_or(Decimal::ZERO);
    let waste_reduction = (previous_waste - waste_units).max(Decimal::ZERO);

    let recommendation = build_recommendation(
        report,
        average_stock,
        remaining,
        waste_units,
        total_selling_revenue,
        total_purchase_cost + waste_loss,
        profit_loss,
        waste_reduction,
    );

    Ok(Prediction {
        average_stock,
        remaining_days,
        waste_units,
        sold_units,
        total_purchase_cost,
        total_selling_revenue,
        waste_loss,
        profit_loss,
        waste_reduction,
        recommendation,
    })
}

/// Waste projection in isolation: the depletion-rate arithmetic of
/// [`predict`] with a caller-chosen sold rate. The dashboard fold substitutes
/// the last recorded sold quantity for a fresh daily figure. Entries that
/// fail the positivity invariant project no waste.
pub fn projected_waste_units(entry: &StockEntry, daily_sold: Decimal, now: DateTime<Utc>) -> Decimal {
    if entry.shelf_life <= 0 || entry.quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let average_stock = entry.quantity / Decimal::from(entry.shelf_life);
    let remaining = Decimal::from(remaining_shelf_days(
        entry.created_at,
        entry.shelf_life,
        now,
    ));
    ((average_stock - daily_sold) * remaining).max(Decimal::ZERO)
}

/// Integer days left before spoilage, floored at zero. Partial days count as
/// a full remaining day.
pub fn remaining_shelf_days(created_at: DateTime<Utc>, shelf_life: i64, now: DateTime<Utc>) -> i64 {
    let expiry = created_at + Duration::days(shelf_life);
    let delta_ms = (expiry - now).num_milliseconds();
    // Equivalent to `delta_ms.div_ceil(MS_PER_DAY)`, which is still unstable for
    // signed integers (`int_roundings`). MS_PER_DAY is a positive constant, so
    // this replicates std's signed ceil-division exactly.
    let quotient = delta_ms / MS_PER_DAY;
    let ceil = if delta_ms % MS_PER_DAY > 0 { quotient + 1 } else { quotient };
    ceil.max(0)
}

#[allow(clippy::too_many_arguments)]
fn build_recommendation(
    report: &DailyReport,
    average_stock: Decimal,
    remaining: Decimal,
    waste_units: Decimal,
    revenue: Decimal,
    costs: Decimal,
    profit_loss: Decimal,
    waste_reduction: Decimal,
) -> String {
    let mut lines = Vec::new();

    if report.daily_sold > average_stock {
        let restock = ((report.daily_sold - average_stock) * remaining)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        lines.push(format!(
            "You may need to restock approx. {restock} kg based on recent sales."
        ));
    } else if report.daily_sold < average_stock && waste_units > Decimal::ZERO {
        lines.push(format!(
            "Sales are underperforming. Current sales ({} kg) are below the expected average of {:.1} kg/day. Risk of higher waste: approx. {:.1} kg may be wasted if sales do not improve.",
            report.daily_sold,
            round1(average_stock),
            round1(waste_units),
        ));
    }

    if report.daily_sold > Decimal::ZERO {
        let revenue_from_sold = report.daily_sold * report.selling_price;
        lines.push(format!(
            "Revenue from {} kg sold: ₹{:.2} (₹{}/kg × {} kg)",
            report.daily_sold,
            round2(revenue_from_sold),
            report.selling_price,
            report.daily_sold,
        ));
    }

    if profit_loss > Decimal::ZERO {
        lines.push(format!(
            "Profit: ₹{:.2} (Revenue: ₹{:.2} - Costs: ₹{:.2})",
            round2(profit_loss),
            round2(revenue),
            round2(costs),
        ));
    } else if profit_loss < Decimal::ZERO {
        lines.push(format!(
            "Loss: ₹{:.2} (Revenue: ₹{:.2} - Costs: ₹{:.2})",
            round2(profit_loss.abs()),
            round2(revenue),
            round2(costs),
        ));
    }

    if waste_reduction > Decimal::ZERO {
        lines.push(format!(
            "Waste reduced: {:.1} kg compared to previous prediction",
            round1(waste_reduction),
        ));
    }

    if lines.is_empty() {
        return "You're within average limits.".to_string();
    }

    lines.join("\n\n")
}

pub fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mandi_core::{StockEntry, StockType};
    use uuid::Uuid;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn entry(quantity: i64, shelf_life: i64, created_at: DateTime<Utc>) -> StockEntry {
        StockEntry {
            id: Uuid::nil(),
            uid: "u1-Vegetables-2025-01-15-01".to_string(),
            user_id: "u1".to_string(),
            date: created_at.date_naive(),
            stock_type: StockType::Vegetables,
            vegetable: "Tomatoes".to_string(),
            quantity: Decimal::from(quantity),
            shelf_life,
            purchase_price: None,
            created_at,
            last_sold: None,
            selling_price: None,
            waste_predicted: None,
            profit_loss: None,
            waste_reduction: None,
        }
    }

    fn report(daily_sold: i64, selling_price: i64) -> DailyReport {
        DailyReport {
            daily_sold: Decimal::from(daily_sold),
            selling_price: Decimal::from(selling_price),
        }
    }

    #[test]
    fn expired_entry_projects_no_waste_and_no_sales() {
        let now = fixed_now();
        let mut stocked = entry(100, 5, now - Duration::days(5));
        stocked.purchase_price = Some(Decimal::from(10));

        let prediction = predict(&stocked, &report(20, 15), now).unwrap();

        assert_eq!(prediction.average_stock, Decimal::from(20));
        assert_eq!(prediction.remaining_days, 0);
        assert_eq!(prediction.waste_units, Decimal::ZERO);
        assert_eq!(prediction.sold_units, Decimal::ZERO);
        assert_eq!(prediction.profit_loss, Decimal::from(-1000));
    }

    #[test]
    fn underselling_projects_waste_across_remaining_days() {
        let now = fixed_now();
        let mut stocked = entry(100, 10, now);
        stocked.purchase_price = Some(Decimal::from(5));

        let prediction = predict(&stocked, &report(5, 12), now).unwrap();

        assert_eq!(prediction.average_stock, Decimal::from(10));
        assert_eq!(prediction.remaining_days, 10);
        assert_eq!(prediction.waste_units, Decimal::from(50));
        assert_eq!(prediction.sold_units, Decimal::from(5));
        assert_eq!(prediction.profit_loss, Decimal::from(-690));
        assert!(prediction.recommendation.contains("underperforming"));
    }

    #[test]
    fn selling_at_average_rate_yields_no_waste_and_no_primary_message() {
        let now = fixed_now();
        let prediction = predict(&entry(100, 10, now), &report(10, 12), now).unwrap();

        assert_eq!(prediction.waste_units, Decimal::ZERO);
        assert!(!prediction.recommendation.contains("restock"));
        assert!(!prediction.recommendation.contains("underperforming"));
    }

    #[test]
    fn overselling_recommends_restock() {
        let now = fixed_now();
        let prediction = predict(&entry(100, 10, now), &report(15, 12), now).unwrap();

        assert_eq!(prediction.waste_units, Decimal::ZERO);
        assert!(prediction.recommendation.contains("restock approx. 50 kg"));
    }

    #[test]
    fn waste_units_never_negative_when_overselling() {
        let now = fixed_now();
        let prediction = predict(&entry(100, 10, now), &report(40, 12), now).unwrap();
        assert_eq!(prediction.waste_units, Decimal::ZERO);
    }

    #[test]
    fn sold_units_capped_by_plausibly_movable_stock() {
        let now = fixed_now();
        let prediction = predict(&entry(10, 10, now - Duration::days(8)), &report(30, 12), now)
            .unwrap();

        // 1 kg/day average, 2 remaining days.
        assert_eq!(prediction.remaining_days, 2);
        assert_eq!(prediction.sold_units, Decimal::from(2));
    }

    #[test]
    fn waste_reduction_measured_against_previous_prediction() {
        let now = fixed_now();
        let mut stocked = entry(100, 10, now);
        stocked.waste_predicted = Some(Decimal::from(80));

        let prediction = predict(&stocked, &report(5, 12), now).unwrap();

        assert_eq!(prediction.waste_units, Decimal::from(50));
        assert_eq!(prediction.waste_reduction, Decimal::from(30));
        assert!(prediction.recommendation.contains("Waste reduced: 30.0 kg"));
    }

    #[test]
    fn waste_increase_reports_zero_reduction() {
        let now = fixed_now();
        let mut stocked = entry(100, 10, now);
        stocked.waste_predicted = Some(Decimal::from(20));

        let prediction = predict(&stocked, &report(5, 12), now).unwrap();
        assert_eq!(prediction.waste_reduction, Decimal::ZERO);
    }

    #[test]
    fn profitable_day_appends_profit_line() {
        let now = fixed_now();
        let mut stocked = entry(100, 10, now);
        stocked.purchase_price = Some(Decimal::from(1));

        // Sells exactly at average with a healthy margin: no waste, pure profit.
        let prediction = predict(&stocked, &report(10, 20), now).unwrap();

        // revenue 10 * 20 = 200, cost 100 * 1 = 100, no waste
        assert_eq!(prediction.profit_loss, Decimal::from(100));
        assert!(prediction.recommendation.contains("Profit: ₹100.00"));
        assert!(prediction.recommendation.contains("Revenue from 10 kg sold"));
    }

    #[test]
    fn zero_shelf_life_is_rejected_before_any_arithmetic() {
        let now = fixed_now();
        let mut stocked = entry(100, 10, now);
        stocked.shelf_life = 0;

        assert!(matches!(
            predict(&stocked, &report(5, 12), now),
            Err(CoreError::InvalidEntry(_))
        ));
    }

    #[test]
    fn partial_remaining_day_rounds_up() {
        let now = fixed_now();
        let stocked = entry(100, 5, now - Duration::hours(12));
        assert_eq!(remaining_shelf_days(stocked.created_at, 5, now), 5);
    }

    #[test]
    fn rounded_form_uses_display_precision() {
        let now = fixed_now();
        let mut stocked = entry(100, 3, now);
        stocked.purchase_price = Some(Decimal::new(25, 1)); // 2.5/kg

        let prediction = predict(&stocked, &report(7, 4), now).unwrap();
        let rounded = prediction.rounded();

        // average 33.33../day, waste (33.33..-7)*3 = 79.0
        assert_eq!(rounded.waste_predicted, Decimal::new(790, 1));
        assert_eq!(rounded.profit_loss, round2(prediction.profit_loss));
    }
}
