//! Activity log handlers.

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::models::{ActivityLog, CreateActivity};
use crate::startup::AppState;
use retail_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// Recent activity, newest first.
///
/// GET /activity
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    Ok(Json(state.gateway.list_activity(query.limit).await?))
}

/// Record a client-side action (logins, exports, manual edits).
///
/// POST /activity
pub async fn record_activity(
    State(state): State<AppState>,
    Json(input): Json<CreateActivity>,
) -> Result<StatusCode, AppError> {
    if input.action.trim().is_empty() {
        return Err(AppError::ValidationError("action is required".to_string()));
    }
    state.gateway.insert_activity(&input).await?;
    Ok(StatusCode::CREATED)
}
