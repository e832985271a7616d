use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::foods::create_food,
        handlers::foods::list_foods,
        handlers::foods::search_foods,
        handlers::foods::get_food,
        handlers::foods::get_food_by_barcode,
        handlers::foods::update_food,
        handlers::foods::update_quantity,
        handlers::foods::delete_food,
        handlers::foods::delete_food_by_barcode,
        handlers::foods::bulk_import,
        handlers::nutrition_logs::create_nutrition_log,
        handlers::nutrition_logs::list_nutrition_logs,
        handlers::inventory::get_inventory,
        handlers::inventory::get_expiring_foods,
        handlers::inventory::get_low_stock_foods,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::foods::FoodResponse,
        handlers::foods::CreateFoodRequest,
        handlers::foods::UpdateFoodRequest,
        handlers::foods::QuantityUpdateRequest,
        handlers::foods::QuantityUpdateResponse,
        handlers::foods::BulkImportRequest,
        handlers::foods::BulkImportResponse,
        handlers::nutrition_logs::NutritionLogResponse,
        handlers::nutrition_logs::CreateNutritionLogRequest,
        handlers::nutrition_logs::CreateNutritionLogResponse,
        handlers::inventory::InventoryItemResponse,
        crate::services::inventory::ExpiryStatus,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "foods", description = "Food catalog CRUD, search and bulk import"),
        (name = "nutrition-logs", description = "Append-only nutrition ledger"),
        (name = "inventory", description = "Read-only inventory projections"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Food Tracking API",
        description = "API for managing food inventory and nutrition tracking",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
