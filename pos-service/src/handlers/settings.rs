//! Store settings handlers.

use axum::extract::{Json, State};
use rust_decimal::Decimal;

use crate::models::StoreSettings;
use crate::startup::AppState;
use retail_core::error::AppError;

/// Current settings from the in-process cache.
///
/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> Json<StoreSettings> {
    Json(state.settings.read().await.clone())
}

/// Replace the settings: persist every key and refresh the cache.
///
/// PUT /settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<StoreSettings>,
) -> Result<Json<StoreSettings>, AppError> {
    if settings.tax_rate < Decimal::ZERO || settings.tax_rate > Decimal::from(100) {
        return Err(AppError::ValidationError(
            "tax_rate must be between 0 and 100".to_string(),
        ));
    }
    for (key, value) in settings.to_rows() {
        state.gateway.upsert_setting(&key, &value).await?;
    }
    *state.settings.write().await = settings.clone();
    Ok(Json(settings))
}
