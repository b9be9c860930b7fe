//! Category, supplier and customer handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::models::{Category, CategoryInput, Customer, CustomerInput, Supplier, SupplierInput};
use crate::startup::AppState;
use retail_core::error::AppError;

// ============================================================================
// Categories
// ============================================================================

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.gateway.list_categories().await?))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    let category = state.gateway.create_category(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .gateway
        .update_category(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Category not found")))?;
    Ok(Json(category))
}

/// DELETE /categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.gateway.delete_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Category not found")))
    }
}

// ============================================================================
// Suppliers
// ============================================================================

/// GET /suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    Ok(Json(state.gateway.list_suppliers().await?))
}

/// POST /suppliers
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    let supplier = state.gateway.create_supplier(&input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// PUT /suppliers/:id
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = state
        .gateway
        .update_supplier(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Supplier not found")))?;
    Ok(Json(supplier))
}

/// DELETE /suppliers/:id
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.gateway.delete_supplier(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Supplier not found")))
    }
}

// ============================================================================
// Customers
// ============================================================================

/// GET /customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(state.gateway.list_customers().await?))
}

/// GET /customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .gateway
        .get_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;
    Ok(Json(customer))
}

/// POST /customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    let customer = state.gateway.create_customer(&input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .gateway
        .update_customer(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;
    Ok(Json(customer))
}

/// DELETE /customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.gateway.delete_customer(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Customer not found")))
    }
}
