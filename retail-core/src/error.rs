use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Reason a discount code was rejected at apply time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountRejection {
    #[error("discount code not found or inactive")]
    NotFound,

    #[error("discount code has expired")]
    Expired,

    #[error("discount code has reached its usage limit")]
    UsageExceeded,

    #[error("subtotal {subtotal} is below the minimum purchase of {min_purchase}")]
    MinimumNotMet {
        subtotal: Decimal,
        min_purchase: Decimal,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Insufficient stock for {part_name}: requested {requested}, available {available}")]
    InsufficientStock {
        part_name: String,
        requested: i32,
        available: i32,
    },

    #[error("Discount invalid: {0}")]
    DiscountInvalid(#[from] DiscountRejection),

    #[error("Cannot receive more than ordered for {part_name}: ordered {ordered}, already received {received}, requested {requested}")]
    ExceedsOrdered {
        part_name: String,
        ordered: i32,
        received: i32,
        requested: i32,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::ValidationError(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(msg),
            ),
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            err @ AppError::InsufficientStock { .. } => {
                (StatusCode::CONFLICT, err.to_string(), None)
            }
            AppError::DiscountInvalid(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Discount invalid".to_string(),
                Some(rejection.to_string()),
            ),
            err @ AppError::ExceedsOrdered { .. } => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(format!("{:#?}", err)),
            ),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
