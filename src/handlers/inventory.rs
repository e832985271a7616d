use crate::{
    errors::ServiceError,
    handlers::foods::FoodResponse,
    services::inventory::ExpiryStatus,
    AppState,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItemResponse {
    #[serde(flatten)]
    pub food: FoodResponse,
    pub expiry_status: ExpiryStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct InventoryFilters {
    /// Category equality filter
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpiringParams {
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
}

fn default_days_ahead() -> i64 {
    7
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LowStockParams {
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

fn default_threshold() -> i32 {
    5
}

/// Create the inventory router
pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_inventory))
        .route("/expiring", get(get_expiring_foods))
        .route("/low-stock", get(get_low_stock_foods))
}

/// The inventory view: in-stock foods with computed expiry status
#[utoipa::path(
    get,
    path = "/inventory",
    params(InventoryFilters),
    responses(
        (status = 200, description = "Inventory returned", body = [InventoryItemResponse]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state
        .inventory
        .inventory_view(filters.category.as_deref())
        .await?;

    let items: Vec<InventoryItemResponse> = records
        .into_iter()
        .map(|record| InventoryItemResponse {
            food: FoodResponse::from(record.food),
            expiry_status: record.expiry_status,
        })
        .collect();

    Ok(Json(items))
}

/// Foods expiring within the given horizon
#[utoipa::path(
    get,
    path = "/inventory/expiring",
    params(ExpiringParams),
    responses(
        (status = 200, description = "Expiring foods returned", body = [FoodResponse]),
        (status = 400, description = "Invalid horizon", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_expiring_foods(
    State(state): State<AppState>,
    Query(params): Query<ExpiringParams>,
) -> Result<impl IntoResponse, ServiceError> {
    if !(1..=365).contains(&params.days_ahead) {
        return Err(ServiceError::ValidationError(
            "days_ahead must be between 1 and 365".to_string(),
        ));
    }

    let foods = state.inventory.expiring_foods(params.days_ahead).await?;
    let data: Vec<FoodResponse> = foods.into_iter().map(FoodResponse::from).collect();
    Ok(Json(data))
}

/// Foods at or below the stock threshold
#[utoipa::path(
    get,
    path = "/inventory/low-stock",
    params(LowStockParams),
    responses(
        (status = 200, description = "Low stock foods returned", body = [FoodResponse]),
        (status = 400, description = "Invalid threshold", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_low_stock_foods(
    State(state): State<AppState>,
    Query(params): Query<LowStockParams>,
) -> Result<impl IntoResponse, ServiceError> {
    if params.threshold < 0 {
        return Err(ServiceError::ValidationError(
            "threshold cannot be negative".to_string(),
        ));
    }

    let foods = state.inventory.low_stock_foods(params.threshold).await?;
    let data: Vec<FoodResponse> = foods.into_iter().map(FoodResponse::from).collect();
    Ok(Json(data))
}
