//! Reporting handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::models::ListInventoryFilter;
use crate::services::reports;
use crate::startup::AppState;
use retail_core::error::AppError;

/// Date range plus output format for the sales report.
#[derive(Debug, Deserialize)]
pub struct SalesReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

/// Daily sales totals, JSON or CSV. Defaults to the last 30 days.
///
/// GET /reports/sales
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - Duration::days(30));
    if from > to {
        return Err(AppError::ValidationError(
            "`from` must not be after `to`".to_string(),
        ));
    }
    let days = reports::daily_sales(state.gateway.as_ref(), from, to).await?;
    match query.format {
        ReportFormat::Json => Ok(Json(days).into_response()),
        ReportFormat::Csv => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sales_report.csv\"",
                ),
            ],
            reports::sales_csv(&days),
        )
            .into_response()),
    }
}

/// Aggregate inventory counts and valuation.
///
/// GET /reports/inventory
pub async fn inventory_report(
    State(state): State<AppState>,
) -> Result<Json<reports::InventorySummary>, AppError> {
    Ok(Json(reports::inventory_summary(state.gateway.as_ref()).await?))
}

/// Full inventory as CSV.
///
/// GET /reports/inventory/export
pub async fn inventory_export(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = state
        .gateway
        .list_inventory(&ListInventoryFilter::default())
        .await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory.csv\"",
            ),
        ],
        reports::inventory_csv(&items),
    ))
}
