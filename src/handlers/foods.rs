use crate::{
    entities::{food, LogAction},
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, validate_input, PaginationParams},
    services::{
        foods::{FoodChanges, NewFood},
        nutrition_logs::AppendLogEvent,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::nutrition_logs::NutritionLogResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FoodResponse {
    pub id: Uuid,
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
    pub allergens: Vec<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i32,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<food::Model> for FoodResponse {
    fn from(model: food::Model) -> Self {
        let allergens = model.allergen_list();
        Self {
            id: model.id,
            barcode: model.barcode,
            name: model.name,
            brand: model.brand,
            category: model.category,
            calories: model.calories,
            protein: model.protein,
            fat: model.fat,
            carbs: model.carbs,
            fiber: model.fiber,
            sugars: model.sugars,
            sodium: model.sodium,
            allergens,
            expiry_date: model.expiry_date,
            quantity: model.quantity,
            location: model.location,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFoodRequest {
    #[validate(length(min = 1))]
    pub barcode: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub calories: Option<i32>,
    #[validate(range(min = 0.0))]
    pub protein: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fat: Option<f64>,
    #[validate(range(min = 0.0))]
    pub carbs: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fiber: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sugars: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sodium: Option<f64>,
    pub allergens: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub location: Option<String>,
}

impl From<CreateFoodRequest> for NewFood {
    fn from(req: CreateFoodRequest) -> Self {
        NewFood {
            barcode: req.barcode,
            name: req.name,
            brand: req.brand,
            category: req.category,
            calories: req.calories,
            protein: req.protein,
            fat: req.fat,
            carbs: req.carbs,
            fiber: req.fiber,
            sugars: req.sugars,
            sodium: req.sodium,
            allergens: req.allergens,
            expiry_date: req.expiry_date,
            quantity: req.quantity,
            location: req.location,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFoodRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub calories: Option<i32>,
    #[validate(range(min = 0.0))]
    pub protein: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fat: Option<f64>,
    #[validate(range(min = 0.0))]
    pub carbs: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fiber: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sugars: Option<f64>,
    #[validate(range(min = 0.0))]
    pub sodium: Option<f64>,
    pub allergens: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl From<UpdateFoodRequest> for FoodChanges {
    fn from(req: UpdateFoodRequest) -> Self {
        FoodChanges {
            name: req.name,
            brand: req.brand,
            category: req.category,
            calories: req.calories,
            protein: req.protein,
            fat: req.fat,
            carbs: req.carbs,
            fiber: req.fiber,
            sugars: req.sugars,
            sodium: req.sodium,
            allergens: req.allergens,
            expiry_date: req.expiry_date,
            location: req.location,
        }
    }
}

/// Quantity changes go through the ledger: the action carries the sign,
/// the quantity is an unsigned magnitude.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuantityUpdateRequest {
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// One of: added, removed, consumed, expired
    pub action: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityUpdateResponse {
    pub log: NutritionLogResponse,
    pub new_quantity: i32,
    pub food: FoodResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkImportRequest {
    pub data: Vec<CreateFoodRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkImportResponse {
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Substring matched against name and brand
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

/// Create the foods router
pub fn foods_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_foods).post(create_food))
        .route("/search", get(search_foods))
        .route("/bulk-import", post(bulk_import))
        .route("/barcode/:barcode", get(get_food_by_barcode).delete(delete_food_by_barcode))
        .route("/:id", get(get_food).put(update_food).delete(delete_food))
        .route("/:id/quantity", put(update_quantity))
}

/// Create a new food item
#[utoipa::path(
    post,
    path = "/foods",
    request_body = CreateFoodRequest,
    responses(
        (status = 201, description = "Food created", body = FoodResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate barcode", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn create_food(
    State(state): State<AppState>,
    Json(payload): Json<CreateFoodRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let food = state.foods.create_food(payload.into()).await?;
    Ok(created_response(FoodResponse::from(food)))
}

/// List food items with pagination
#[utoipa::path(
    get,
    path = "/foods",
    params(PaginationParams),
    responses(
        (status = 200, description = "Food list returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (foods, total) = state
        .foods
        .list_foods(pagination.page, pagination.per_page)
        .await?;

    let data: Vec<FoodResponse> = foods.into_iter().map(FoodResponse::from).collect();
    Ok(Json(json!({
        "data": data,
        "total": total,
        "page": pagination.page,
        "per_page": pagination.per_page,
    })))
}

/// Search food items by name or brand
#[utoipa::path(
    get,
    path = "/foods/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching foods returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn search_foods(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (foods, total) = state
        .foods
        .search_foods(&params.q, params.page, params.per_page)
        .await?;

    let data: Vec<FoodResponse> = foods.into_iter().map(FoodResponse::from).collect();
    Ok(Json(json!({
        "data": data,
        "total": total,
        "page": params.page,
        "per_page": params.per_page,
    })))
}

/// Get a food item by ID
#[utoipa::path(
    get,
    path = "/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    responses(
        (status = 200, description = "Food returned", body = FoodResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let food = state.foods.get_food(id).await?;
    Ok(Json(FoodResponse::from(food)))
}

/// Get a food item by barcode
#[utoipa::path(
    get,
    path = "/foods/barcode/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode")),
    responses(
        (status = 200, description = "Food returned", body = FoodResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn get_food_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let food = state.foods.get_food_by_barcode(&barcode).await?;
    Ok(Json(FoodResponse::from(food)))
}

/// Update a food item's descriptive fields
#[utoipa::path(
    put,
    path = "/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Food updated", body = FoodResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFoodRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let food = state.foods.update_food(id, payload.into()).await?;
    Ok(Json(FoodResponse::from(food)))
}

/// Apply a quantity change through the nutrition ledger
#[utoipa::path(
    put,
    path = "/foods/{id}/quantity",
    params(("id" = Uuid, Path, description = "Food ID")),
    request_body = QuantityUpdateRequest,
    responses(
        (status = 200, description = "Quantity updated", body = QuantityUpdateResponse),
        (status = 400, description = "Invalid action or quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuantityUpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let action = LogAction::from_str(&payload.action)
        .ok_or_else(|| ServiceError::InvalidAction(payload.action.clone()))?;

    let (entry, new_quantity) = state
        .logs
        .apply_log_event(AppendLogEvent {
            food_id: id,
            quantity: payload.quantity,
            action,
            timestamp: payload.timestamp,
        })
        .await?;

    let food = state.foods.get_food(id).await?;
    Ok(Json(QuantityUpdateResponse {
        log: NutritionLogResponse::from(entry),
        new_quantity,
        food: FoodResponse::from(food),
    }))
}

/// Delete a food item (cascades its nutrition logs)
#[utoipa::path(
    delete,
    path = "/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    responses(
        (status = 204, description = "Food deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.foods.delete_food(id).await?;
    Ok(no_content_response())
}

/// Delete all food items with a given barcode
#[utoipa::path(
    delete,
    path = "/foods/barcode/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode")),
    responses(
        (status = 200, description = "Foods deleted"),
        (status = 404, description = "No foods with this barcode", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn delete_food_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let deleted = state.foods.delete_food_by_barcode(&barcode).await?;
    if deleted == 0 {
        return Err(ServiceError::NotFound(format!(
            "No food items found with barcode {}",
            barcode
        )));
    }
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("All food items with barcode {} have been deleted", barcode),
            "deleted": deleted,
        })),
    ))
}

/// Bulk import foods, upserting on barcode
#[utoipa::path(
    post,
    path = "/foods/bulk-import",
    request_body = BulkImportRequest,
    responses(
        (status = 200, description = "Import summary", body = BulkImportResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn bulk_import(
    State(state): State<AppState>,
    Json(payload): Json<BulkImportRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let records: Vec<NewFood> = payload.data.into_iter().map(NewFood::from).collect();
    let summary = state.foods.bulk_import(records).await?;

    Ok(Json(BulkImportResponse {
        total_rows: summary.total_rows,
        inserted: summary.inserted,
        updated: summary.updated,
        errors: summary.errors,
        error_details: summary.error_details,
    }))
}
