//! Receipt assembly and 80mm thermal-printer text rendering.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::StoreSettings;

/// Printable width of an 80mm thermal roll in characters.
const WIDTH: usize = 42;

/// One printed receipt line.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub part_name: String,
    pub part_number: String,
    pub brand: Option<String>,
    pub year_range: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Post-discount, pro-rated line total.
    pub line_total: Decimal,
}

/// A completed checkout, ready to print. Tax is a display-time
/// projection; stored sale rows stay pre-tax.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub discount_code: Option<String>,
    pub discount_amount: Decimal,
    /// Percentage applied, zero when tax is disabled.
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    pub cashier_name: Option<String>,
    pub customer_name: Option<String>,
}

impl Receipt {
    /// Tax and grand total from the discounted subtotal.
    pub fn apply_tax(discounted: Decimal, tax_rate: Decimal) -> (Decimal, Decimal) {
        let tax_amount = (discounted * tax_rate / Decimal::from(100)).round_dp(2);
        (tax_amount, discounted + tax_amount)
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn split_row(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    if used >= width {
        return format!("{} {}", left, right);
    }
    format!("{}{}{}", left, " ".repeat(width - used), right)
}

fn money(amount: Decimal, currency: &str) -> String {
    format!("{} {:.2}", currency, amount)
}

/// Render a receipt for an 80mm printer, 42 characters wide.
pub fn render_text(receipt: &Receipt, settings: &StoreSettings) -> String {
    let divider = "-".repeat(WIDTH);
    let mut out = Vec::new();

    if !settings.business_name.is_empty() {
        out.push(center(&settings.business_name, WIDTH));
    }
    if !settings.business_address.is_empty() {
        out.push(center(&settings.business_address, WIDTH));
    }
    if !settings.business_phone.is_empty() {
        out.push(center(&settings.business_phone, WIDTH));
    }
    out.push(divider.clone());
    out.push(format!("Receipt: {}", receipt.receipt_number));
    out.push(format!(
        "Date: {}",
        receipt.created_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(customer) = &receipt.customer_name {
        out.push(format!("Customer: {}", customer));
    }
    out.push(divider.clone());

    for line in &receipt.lines {
        out.push(line.part_name.clone());
        let mut detail = vec![line.part_number.clone()];
        if let Some(brand) = &line.brand {
            detail.push(brand.clone());
        }
        if let Some(years) = &line.year_range {
            detail.push(years.clone());
        }
        out.push(format!("  {}", detail.join(" | ")));
        out.push(split_row(
            &format!("  {} x {:.2}", line.quantity, line.unit_price),
            &money(line.line_total, &settings.currency),
            WIDTH,
        ));
    }

    out.push(divider.clone());
    out.push(split_row(
        "Subtotal",
        &money(receipt.subtotal, &settings.currency),
        WIDTH,
    ));
    if receipt.discount_amount > Decimal::ZERO {
        let label = match &receipt.discount_code {
            Some(code) => format!("Discount ({})", code),
            None => "Discount".to_string(),
        };
        out.push(split_row(
            &label,
            &format!("-{}", money(receipt.discount_amount, &settings.currency)),
            WIDTH,
        ));
    }
    if receipt.tax_rate > Decimal::ZERO {
        out.push(split_row(
            &format!("Tax ({}%)", receipt.tax_rate),
            &money(receipt.tax_amount, &settings.currency),
            WIDTH,
        ));
    }
    out.push(split_row(
        "TOTAL",
        &money(receipt.total, &settings.currency),
        WIDTH,
    ));
    out.push(divider);
    out.push(format!("Paid by: {}", receipt.payment_method));
    if let Some(cashier) = &receipt.cashier_name {
        out.push(format!("Served by: {}", cashier));
    }
    if !settings.receipt_footer.is_empty() {
        out.push(String::new());
        out.push(center(&settings.receipt_footer, WIDTH));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_receipt() -> Receipt {
        Receipt {
            receipt_number: "RCP-TEST1".to_string(),
            created_at: Utc::now(),
            lines: vec![ReceiptLine {
                part_name: "Oil Filter".to_string(),
                part_number: "OF-100".to_string(),
                brand: Some("Bosch".to_string()),
                year_range: Some("2015-2020".to_string()),
                quantity: 2,
                unit_price: dec!(15.00),
                line_total: dec!(27.00),
            }],
            subtotal: dec!(30.00),
            discount_code: Some("SAVE10".to_string()),
            discount_amount: dec!(3.00),
            tax_rate: dec!(8.5),
            tax_amount: dec!(2.30),
            total: dec!(29.30),
            payment_method: "cash".to_string(),
            cashier_name: Some("Dana".to_string()),
            customer_name: None,
        }
    }

    #[test]
    fn tax_projection_rounds_to_cents() {
        let (tax, total) = Receipt::apply_tax(dec!(27.00), dec!(8.5));
        assert_eq!(tax, dec!(2.30));
        assert_eq!(total, dec!(29.30));
    }

    #[test]
    fn zero_rate_means_no_tax() {
        let (tax, total) = Receipt::apply_tax(dec!(27.00), Decimal::ZERO);
        assert_eq!(tax, Decimal::ZERO);
        assert_eq!(total, dec!(27.00));
    }

    #[test]
    fn rendered_receipt_fits_the_roll() {
        let mut settings = StoreSettings::default();
        settings.business_name = "AutoParts Arizona".to_string();
        settings.receipt_footer = "Thank you!".to_string();
        let text = render_text(&sample_receipt(), &settings);
        for line in text.lines() {
            assert!(line.chars().count() <= WIDTH, "line too wide: {:?}", line);
        }
        assert!(text.contains("Receipt: RCP-TEST1"));
        assert!(text.contains("OF-100 | Bosch | 2015-2020"));
        assert!(text.contains("Discount (SAVE10)"));
        assert!(text.contains("Tax (8.5%)"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn tax_line_is_omitted_when_disabled() {
        let mut receipt = sample_receipt();
        receipt.tax_rate = Decimal::ZERO;
        receipt.tax_amount = Decimal::ZERO;
        receipt.total = dec!(27.00);
        let text = render_text(&receipt, &StoreSettings::default());
        assert!(!text.contains("Tax ("));
    }
}
