use crate::{
    entities::food::{self, Entity as Food},
    errors::ServiceError,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Fields for creating a food item. `quantity` seeds the derived counter;
/// afterwards it only moves through ledger events.
#[derive(Debug, Clone, Default)]
pub struct NewFood {
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
    pub allergens: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: Option<i32>,
    pub location: Option<String>,
}

/// Descriptive fields that may be updated in place. Quantity is deliberately
/// absent: it changes only via nutrition log events.
#[derive(Debug, Clone, Default)]
pub struct FoodChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub sugars: Option<f64>,
    pub sodium: Option<f64>,
    pub allergens: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl FoodChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.calories.is_none()
            && self.protein.is_none()
            && self.fat.is_none()
            && self.carbs.is_none()
            && self.fiber.is_none()
            && self.sugars.is_none()
            && self.sodium.is_none()
            && self.allergens.is_none()
            && self.expiry_date.is_none()
            && self.location.is_none()
    }
}

/// Outcome of a bulk import run.
#[derive(Debug, Clone, Default)]
pub struct BulkImportSummary {
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

/// Service for the food catalog: CRUD, search and bulk import.
#[derive(Clone)]
pub struct FoodService {
    db: Arc<DatabaseConnection>,
}

impl FoodService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Creates a new food item. A duplicate barcode is a conflict.
    #[instrument(skip(self, data), fields(barcode = %data.barcode))]
    pub async fn create_food(&self, data: NewFood) -> Result<food::Model, ServiceError> {
        validate_new_food(&data)?;

        let barcode = data.barcode.clone();
        let model = active_model_from_new(data);
        let food = model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::Conflict(format!("Food with barcode {} already exists", barcode))
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(food_id = %food.id, name = %food.name, "created food item");
        Ok(food)
    }

    pub async fn get_food(&self, id: Uuid) -> Result<food::Model, ServiceError> {
        Food::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Food {} not found", id)))
    }

    pub async fn get_food_by_barcode(&self, barcode: &str) -> Result<food::Model, ServiceError> {
        Food::find()
            .filter(food::Column::Barcode.eq(barcode))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Food with barcode {} not found", barcode))
            })
    }

    /// Lists foods ordered by creation time, newest first.
    #[instrument(skip(self))]
    pub async fn list_foods(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<food::Model>, u64), ServiceError> {
        let paginator = Food::find()
            .order_by(food::Column::CreatedAt, Order::Desc)
            .paginate(self.db.as_ref(), per_page.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let foods = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((foods, total))
    }

    /// Case-insensitive substring search over name and brand.
    #[instrument(skip(self))]
    pub async fn search_foods(
        &self,
        query: &str,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<food::Model>, u64), ServiceError> {
        let paginator = Food::find()
            .filter(
                Condition::any()
                    .add(food::Column::Name.contains(query))
                    .add(food::Column::Brand.contains(query)),
            )
            .order_by(food::Column::Name, Order::Asc)
            .paginate(self.db.as_ref(), per_page.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let foods = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((foods, total))
    }

    /// Updates descriptive fields in place.
    #[instrument(skip(self, changes))]
    pub async fn update_food(
        &self,
        id: Uuid,
        changes: FoodChanges,
    ) -> Result<food::Model, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::ValidationError(
                "No update data provided".to_string(),
            ));
        }
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Food name cannot be empty".to_string(),
                ));
            }
        }

        let food = self.get_food(id).await?;
        let mut active: food::ActiveModel = food.into();
        apply_changes(&mut active, changes);

        let food = active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        info!(food_id = %food.id, "updated food item");
        Ok(food)
    }

    /// Deletes a food item; its nutrition log entries go with it.
    #[instrument(skip(self))]
    pub async fn delete_food(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Food::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Food {} not found", id)));
        }
        info!(food_id = %id, "deleted food item");
        Ok(())
    }

    /// Deletes all foods carrying the given barcode. Returns how many rows
    /// were removed.
    #[instrument(skip(self))]
    pub async fn delete_food_by_barcode(&self, barcode: &str) -> Result<u64, ServiceError> {
        let result = Food::delete_many()
            .filter(food::Column::Barcode.eq(barcode))
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected > 0 {
            info!(barcode, deleted = result.rows_affected, "deleted foods by barcode");
        }
        Ok(result.rows_affected)
    }

    /// Upserts a batch of records keyed on barcode. An existing barcode takes
    /// the update path rather than erroring; per-record failures are counted
    /// and reported, not fatal to the batch.
    #[instrument(skip(self, records), fields(total = records.len()))]
    pub async fn bulk_import(&self, records: Vec<NewFood>) -> Result<BulkImportSummary, ServiceError> {
        let mut summary = BulkImportSummary {
            total_rows: records.len(),
            ..Default::default()
        };

        for (index, record) in records.into_iter().enumerate() {
            match self.import_one(record).await {
                Ok(ImportOutcome::Inserted) => summary.inserted += 1,
                Ok(ImportOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    summary.errors += 1;
                    summary.error_details.push(format!("Row {}: {}", index, e));
                }
            }
        }

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            errors = summary.errors,
            "bulk import completed"
        );
        Ok(summary)
    }

    async fn import_one(&self, record: NewFood) -> Result<ImportOutcome, ServiceError> {
        validate_new_food(&record)?;

        let existing = Food::find()
            .filter(food::Column::Barcode.eq(record.barcode.as_str()))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        match existing {
            Some(found) => {
                let mut active: food::ActiveModel = found.into();
                active.name = Set(record.name);
                apply_changes(
                    &mut active,
                    FoodChanges {
                        name: None,
                        brand: record.brand,
                        category: record.category,
                        calories: record.calories,
                        protein: record.protein,
                        fat: record.fat,
                        carbs: record.carbs,
                        fiber: record.fiber,
                        sugars: record.sugars,
                        sodium: record.sodium,
                        allergens: record.allergens,
                        expiry_date: record.expiry_date,
                        location: record.location,
                    },
                );
                active
                    .update(self.db.as_ref())
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(ImportOutcome::Updated)
            }
            None => {
                active_model_from_new(record)
                    .insert(self.db.as_ref())
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(ImportOutcome::Inserted)
            }
        }
    }
}

enum ImportOutcome {
    Inserted,
    Updated,
}

fn validate_new_food(data: &NewFood) -> Result<(), ServiceError> {
    if data.barcode.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Barcode is required".to_string(),
        ));
    }
    if data.name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Food name is required".to_string(),
        ));
    }
    if data.quantity.is_some_and(|q| q < 0) {
        return Err(ServiceError::ValidationError(
            "Quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn active_model_from_new(data: NewFood) -> food::ActiveModel {
    food::ActiveModel {
        barcode: Set(data.barcode),
        name: Set(data.name),
        brand: Set(data.brand),
        category: Set(data.category),
        calories: Set(data.calories),
        protein: Set(data.protein),
        fat: Set(data.fat),
        carbs: Set(data.carbs),
        fiber: Set(data.fiber),
        sugars: Set(data.sugars),
        sodium: Set(data.sodium),
        allergens: Set(data.allergens.map(|a| serde_json::json!(a))),
        expiry_date: Set(data.expiry_date),
        quantity: Set(data.quantity.unwrap_or(0)),
        location: Set(data.location),
        ..Default::default()
    }
}

fn apply_changes(active: &mut food::ActiveModel, changes: FoodChanges) {
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(brand) = changes.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(category) = changes.category {
        active.category = Set(Some(category));
    }
    if let Some(calories) = changes.calories {
        active.calories = Set(Some(calories));
    }
    if let Some(protein) = changes.protein {
        active.protein = Set(Some(protein));
    }
    if let Some(fat) = changes.fat {
        active.fat = Set(Some(fat));
    }
    if let Some(carbs) = changes.carbs {
        active.carbs = Set(Some(carbs));
    }
    if let Some(fiber) = changes.fiber {
        active.fiber = Set(Some(fiber));
    }
    if let Some(sugars) = changes.sugars {
        active.sugars = Set(Some(sugars));
    }
    if let Some(sodium) = changes.sodium {
        active.sodium = Set(Some(sodium));
    }
    if let Some(allergens) = changes.allergens {
        active.allergens = Set(Some(serde_json::json!(allergens)));
    }
    if let Some(expiry_date) = changes.expiry_date {
        active.expiry_date = Set(Some(expiry_date));
    }
    if let Some(location) = changes.location {
        active.location = Set(Some(location));
    }
}
