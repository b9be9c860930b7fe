//! Sales and inventory reporting.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use retail_core::error::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::models::{InventoryItem, ListInventoryFilter, Sale};
use crate::services::gateway::Gateway;

/// One day of sales. A transaction is one receipt, not one row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Decimal,
    pub transactions: i64,
}

/// Aggregate counts over the whole inventory.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total_items: i64,
    pub total_units: i64,
    /// Cost-price valuation of everything on hand.
    pub stock_value: Decimal,
    pub low_stock_items: i64,
}

/// Daily sales between `from` (inclusive) and `to` (exclusive).
#[instrument(skip(gateway))]
pub async fn daily_sales(
    gateway: &dyn Gateway,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DailySales>, AppError> {
    let sales = gateway.list_sales_between(from, to).await?;
    Ok(group_by_day(&sales))
}

/// Group sale rows by calendar day, counting distinct receipts.
pub fn group_by_day(sales: &[Sale]) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, (Decimal, HashSet<String>, i64)> = BTreeMap::new();
    for sale in sales {
        let entry = days
            .entry(sale.created_at.date_naive())
            .or_insert_with(|| (Decimal::ZERO, HashSet::new(), 0));
        entry.0 += sale.total_price;
        match &sale.receipt_number {
            Some(receipt) => {
                entry.1.insert(receipt.clone());
            }
            // Legacy rows without a receipt each count as one sale.
            None => entry.2 += 1,
        }
    }
    days.into_iter()
        .map(|(date, (total, receipts, orphans))| DailySales {
            date,
            total,
            transactions: receipts.len() as i64 + orphans,
        })
        .collect()
}

/// CSV export of a daily sales report.
pub fn sales_csv(days: &[DailySales]) -> String {
    let mut out = String::from("Date,Total,Transactions\n");
    for day in days {
        out.push_str(&format!(
            "{},{:.2},{}\n",
            day.date, day.total, day.transactions
        ));
    }
    out
}

/// Aggregate the full inventory into one summary.
#[instrument(skip(gateway))]
pub async fn inventory_summary(gateway: &dyn Gateway) -> Result<InventorySummary, AppError> {
    let items = gateway
        .list_inventory(&ListInventoryFilter::default())
        .await?;
    Ok(summarize_inventory(&items))
}

pub fn summarize_inventory(items: &[InventoryItem]) -> InventorySummary {
    InventorySummary {
        total_items: items.len() as i64,
        total_units: items.iter().map(|i| i64::from(i.quantity)).sum(),
        stock_value: items.iter().map(InventoryItem::stock_value).sum(),
        low_stock_items: items.iter().filter(|i| i.is_low_stock()).count() as i64,
    }
}

/// CSV export of the inventory list, one row per item with fitment,
/// valuation and stock status.
pub fn inventory_csv(items: &[InventoryItem]) -> String {
    let mut out = String::from(
        "Part Number,Part Name,Brand,Year Range,Category,Quantity,Cost Price,Selling Price,Stock Value,Status\n",
    );
    for item in items {
        out.push_str(&format!(
            "{},{},{},{},{},{},{:.2},{:.2},{:.2},{}\n",
            csv_field(&item.part_number),
            csv_field(&item.part_name),
            csv_field(item.brand.as_deref().unwrap_or("-")),
            csv_field(item.year_range.as_deref().unwrap_or("-")),
            csv_field(&item.category),
            item.quantity,
            item.cost_price,
            item.selling_price,
            item.stock_value(),
            if item.is_low_stock() { "Low Stock" } else { "OK" }
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sale(day: u32, total: Decimal, receipt: Option<&str>) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            inventory_id: Uuid::new_v4(),
            quantity_sold: 1,
            unit_price: total,
            total_price: total,
            sold_by: Uuid::new_v4(),
            customer_id: None,
            discount_id: None,
            discount_amount: None,
            receipt_number: receipt.map(|r| r.to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn transactions_count_receipts_not_rows() {
        let sales = vec![
            sale(1, dec!(10.00), Some("RCP-A")),
            sale(1, dec!(5.00), Some("RCP-A")),
            sale(1, dec!(7.00), Some("RCP-B")),
            sale(2, dec!(3.00), Some("RCP-C")),
        ];
        let days = group_by_day(&sales);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].total, dec!(22.00));
        assert_eq!(days[0].transactions, 2);
        assert_eq!(days[1].transactions, 1);
    }

    #[test]
    fn rows_without_receipts_count_individually() {
        let sales = vec![sale(1, dec!(4.00), None), sale(1, dec!(4.00), None)];
        let days = group_by_day(&sales);
        assert_eq!(days[0].transactions, 2);
    }

    #[test]
    fn sales_csv_has_the_expected_header() {
        let days = vec![DailySales {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            total: dec!(22.00),
            transactions: 2,
        }];
        let csv = sales_csv(&days);
        assert!(csv.starts_with("Date,Total,Transactions\n"));
        assert!(csv.contains("2026-03-01,22.00,2"));
    }

    #[test]
    fn csv_fields_with_commas_are_quoted() {
        assert_eq!(csv_field("Brake Pad, Front"), "\"Brake Pad, Front\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    fn stocked(quantity: i32, brand: Option<&str>, year_range: Option<&str>) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            part_name: "Brake Pad".to_string(),
            part_number: "BP-1".to_string(),
            category: "Brakes".to_string(),
            category_id: None,
            supplier_id: None,
            brand: brand.map(|b| b.to_string()),
            year_range: year_range.map(|y| y.to_string()),
            quantity,
            cost_price: dec!(4.00),
            selling_price: dec!(9.50),
            reorder_level: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn inventory_csv_includes_fitment_valuation_and_status() {
        let items = vec![
            stocked(10, Some("Bosch"), Some("2015-2020")),
            stocked(1, None, None),
        ];
        let csv = inventory_csv(&items);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Part Number,Part Name,Brand,Year Range,Category,Quantity,Cost Price,Selling Price,Stock Value,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "BP-1,Brake Pad,Bosch,2015-2020,Brakes,10,4.00,9.50,40.00,OK"
        );
        // Missing fitment shows as a dash; quantity at reorder level is low.
        assert_eq!(
            lines.next().unwrap(),
            "BP-1,Brake Pad,-,-,Brakes,1,4.00,9.50,4.00,Low Stock"
        );
    }
}
