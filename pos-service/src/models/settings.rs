//! Store settings.
//!
//! Persisted as loose key/value rows but materialized into one typed
//! struct, loaded at startup and cached in app state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

/// A raw settings row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: Option<String>,
}

/// Typed business settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_address: String,
    #[serde(default)]
    pub business_phone: String,
    #[serde(default)]
    pub business_email: String,
    /// Percentage, e.g. 8.5 for 8.5%. Zero disables tax on receipts.
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub receipt_footer: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            business_address: String::new(),
            business_phone: String::new(),
            business_email: String::new(),
            tax_rate: Decimal::ZERO,
            currency: default_currency(),
            receipt_footer: String::new(),
        }
    }
}

impl StoreSettings {
    /// Build typed settings from raw rows. Unknown keys are ignored,
    /// missing keys fall back to defaults.
    pub fn from_rows(rows: &[SettingRow]) -> Self {
        let mut settings = StoreSettings::default();
        for row in rows {
            let value = row.value.clone().unwrap_or_default();
            match row.key.as_str() {
                "business_name" => settings.business_name = value,
                "business_address" => settings.business_address = value,
                "business_phone" => settings.business_phone = value,
                "business_email" => settings.business_email = value,
                "tax_rate" => match value.parse::<Decimal>() {
                    Ok(rate) => settings.tax_rate = rate,
                    Err(_) => {
                        warn!(value = %value, "Unparseable tax_rate setting, keeping 0");
                    }
                },
                "currency" => {
                    if !value.is_empty() {
                        settings.currency = value;
                    }
                }
                "receipt_footer" => settings.receipt_footer = value,
                _ => {}
            }
        }
        settings
    }

    /// Flatten back into key/value pairs for persistence.
    pub fn to_rows(&self) -> Vec<(String, String)> {
        vec![
            ("business_name".to_string(), self.business_name.clone()),
            (
                "business_address".to_string(),
                self.business_address.clone(),
            ),
            ("business_phone".to_string(), self.business_phone.clone()),
            ("business_email".to_string(), self.business_email.clone()),
            ("tax_rate".to_string(), self.tax_rate.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("receipt_footer".to_string(), self.receipt_footer.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_fills_known_keys_and_ignores_unknown() {
        let rows = vec![
            SettingRow {
                key: "business_name".to_string(),
                value: Some("AutoParts Arizona".to_string()),
            },
            SettingRow {
                key: "tax_rate".to_string(),
                value: Some("8.5".to_string()),
            },
            SettingRow {
                key: "mystery".to_string(),
                value: Some("x".to_string()),
            },
        ];
        let settings = StoreSettings::from_rows(&rows);
        assert_eq!(settings.business_name, "AutoParts Arizona");
        assert_eq!(settings.tax_rate, Decimal::new(85, 1));
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn bad_tax_rate_falls_back_to_zero() {
        let rows = vec![SettingRow {
            key: "tax_rate".to_string(),
            value: Some("not-a-number".to_string()),
        }];
        let settings = StoreSettings::from_rows(&rows);
        assert_eq!(settings.tax_rate, Decimal::ZERO);
    }

    #[test]
    fn round_trips_through_rows() {
        let mut settings = StoreSettings::default();
        settings.business_name = "Shop".to_string();
        settings.tax_rate = Decimal::new(725, 2);
        let rows: Vec<SettingRow> = settings
            .to_rows()
            .into_iter()
            .map(|(key, value)| SettingRow {
                key,
                value: Some(value),
            })
            .collect();
        assert_eq!(StoreSettings::from_rows(&rows), settings);
    }
}
