//! Metrics module for pos-service.
//! Provides Prometheus metrics for checkout, refund and receiving flows.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("pos_db_query_duration_seconds", "Database query duration"),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Checkouts counter by outcome
pub static CHECKOUTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Sales monetary volume by payment method
pub static SALES_AMOUNT_TOTAL: OnceLock<prometheus::CounterVec> = OnceLock::new();

/// Refunds counter
pub static REFUNDS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Units received against purchase orders
pub static ITEMS_RECEIVED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Error counter for alerting
pub static ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    CHECKOUTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("pos_checkouts_total", "Total checkouts by outcome"),
            &["outcome"]
        )
        .expect("Failed to register CHECKOUTS_TOTAL")
    });

    SALES_AMOUNT_TOTAL.get_or_init(|| {
        prometheus::register_counter_vec!(
            prometheus::opts!(
                "pos_sales_amount_total",
                "Total sales amount by payment method"
            ),
            &["payment_method"]
        )
        .expect("Failed to register SALES_AMOUNT_TOTAL")
    });

    REFUNDS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("pos_refunds_total", "Total refunds processed"),
            &["outcome"]
        )
        .expect("Failed to register REFUNDS_TOTAL")
    });

    ITEMS_RECEIVED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pos_items_received_total",
                "Total units received against purchase orders"
            ),
            &["matched"]
        )
        .expect("Failed to register ITEMS_RECEIVED_TOTAL")
    });

    ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("pos_errors_total", "Total errors by type for alerting"),
            &["error_type", "operation"]
        )
        .expect("Failed to register ERRORS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a checkout attempt.
pub fn record_checkout(outcome: &str) {
    if let Some(counter) = CHECKOUTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record the monetary volume of a completed sale.
pub fn record_sale_amount(payment_method: &str, amount: f64) {
    if let Some(counter) = SALES_AMOUNT_TOTAL.get() {
        counter
            .with_label_values(&[payment_method])
            .inc_by(amount.abs());
    }
}

/// Record a refund.
pub fn record_refund(outcome: &str) {
    if let Some(counter) = REFUNDS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record units received against a purchase order.
pub fn record_items_received(matched: bool, units: u64) {
    if let Some(counter) = ITEMS_RECEIVED_TOTAL.get() {
        counter
            .with_label_values(&[if matched { "true" } else { "false" }])
            .inc_by(units);
    }
}

/// Record an error for alerting.
pub fn record_error(error_type: &str, operation: &str) {
    if let Some(counter) = ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type, operation]).inc();
    }
}
