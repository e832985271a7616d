use crate::{
    entities::{nutrition_log, LogAction},
    errors::ServiceError,
    handlers::common::{created_response, validate_input},
    services::nutrition_logs::AppendLogEvent,
    AppState,
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NutritionLogResponse {
    pub id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    pub timestamp: DateTime<Utc>,
    pub action: String,
}

impl From<nutrition_log::Model> for NutritionLogResponse {
    fn from(model: nutrition_log::Model) -> Self {
        Self {
            id: model.id,
            food_id: model.food_id,
            quantity: model.quantity,
            timestamp: model.timestamp,
            action: model.action,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNutritionLogRequest {
    pub food_id: Uuid,
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// One of: added, removed, consumed, expired
    pub action: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateNutritionLogResponse {
    pub log: NutritionLogResponse,
    pub new_quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogFilters {
    /// Restrict to entries for one food
    pub food_id: Option<Uuid>,
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

/// Create the nutrition logs router
pub fn nutrition_logs_router() -> Router<AppState> {
    Router::new().route("/", get(list_nutrition_logs).post(create_nutrition_log))
}

/// Append a nutrition log event; the referenced food's quantity moves with it
#[utoipa::path(
    post,
    path = "/nutrition-logs",
    request_body = CreateNutritionLogRequest,
    responses(
        (status = 201, description = "Log entry appended", body = CreateNutritionLogResponse),
        (status = 400, description = "Invalid action or quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Food not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "nutrition-logs"
)]
pub async fn create_nutrition_log(
    State(state): State<AppState>,
    Json(payload): Json<CreateNutritionLogRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let action = LogAction::from_str(&payload.action)
        .ok_or_else(|| ServiceError::InvalidAction(payload.action.clone()))?;

    let (entry, new_quantity) = state
        .logs
        .apply_log_event(AppendLogEvent {
            food_id: payload.food_id,
            quantity: payload.quantity,
            action,
            timestamp: payload.timestamp,
        })
        .await?;

    Ok(created_response(CreateNutritionLogResponse {
        log: NutritionLogResponse::from(entry),
        new_quantity,
    }))
}

/// List nutrition log entries, newest first
#[utoipa::path(
    get,
    path = "/nutrition-logs",
    params(LogFilters),
    responses(
        (status = 200, description = "Log entries returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "nutrition-logs"
)]
pub async fn list_nutrition_logs(
    State(state): State<AppState>,
    Query(filters): Query<LogFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (logs, total) = state
        .logs
        .list_logs(filters.food_id, filters.page, filters.per_page)
        .await?;

    let data: Vec<NutritionLogResponse> =
        logs.into_iter().map(NutritionLogResponse::from).collect();
    Ok(Json(json!({
        "data": data,
        "total": total,
        "page": filters.page,
        "per_page": filters.per_page,
    })))
}
