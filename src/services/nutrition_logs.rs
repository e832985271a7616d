use crate::{
    entities::{
        food::{self, Entity as Food},
        nutrition_log::{self, Entity as NutritionLog, LogAction},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Retries for the optimistic quantity update before giving up.
const MAX_APPLY_RETRIES: u32 = 3;

/// A ledger event to append. The quantity is an unsigned magnitude; the
/// direction of the change is implied by the action.
#[derive(Debug, Clone)]
pub struct AppendLogEvent {
    pub food_id: Uuid,
    pub quantity: i32,
    pub action: LogAction,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Service for the nutrition ledger and the derived catalog quantity.
///
/// Every appended event atomically updates the referenced food's quantity:
/// the ledger insert and the catalog update commit together or not at all.
#[derive(Clone)]
pub struct NutritionLogService {
    db: Arc<DatabaseConnection>,
}

impl NutritionLogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Appends a ledger event and applies its effect to the food's quantity.
    ///
    /// `added` increases the quantity by the event magnitude; `removed`,
    /// `consumed` and `expired` decrease it, floored at zero. Over-subtraction
    /// clamps rather than failing. Returns the stored entry and the new
    /// quantity. Not idempotent: re-applying the same event moves the
    /// quantity again.
    #[instrument(skip(self), fields(food_id = %event.food_id, action = event.action.as_str()))]
    pub async fn apply_log_event(
        &self,
        event: AppendLogEvent,
    ) -> Result<(nutrition_log::Model, i32), ServiceError> {
        if event.quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Event quantity must be a non-negative magnitude, got {}",
                event.quantity
            )));
        }

        // The read-modify-write below is guarded by a compare-and-swap on the
        // quantity column; a concurrent writer rolls this attempt back and we
        // retry with a fresh read.
        for _ in 0..MAX_APPLY_RETRIES {
            match self.try_apply(&event).await {
                Err(ServiceError::ConcurrentModification(_)) => continue,
                other => return other,
            }
        }
        Err(ServiceError::ConcurrentModification(event.food_id))
    }

    async fn try_apply(
        &self,
        event: &AppendLogEvent,
    ) -> Result<(nutrition_log::Model, i32), ServiceError> {
        let db = self.db.as_ref();
        let event = event.clone();

        db.transaction::<_, (nutrition_log::Model, i32), ServiceError>(move |txn| {
            Box::pin(async move {
                let food = Food::find_by_id(event.food_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Food {} not found", event.food_id))
                    })?;

                let current = food.quantity;
                let new_quantity = if event.action.is_addition() {
                    current.saturating_add(event.quantity)
                } else {
                    (current - event.quantity).max(0)
                };

                if !event.action.is_addition() && event.quantity > current {
                    warn!(
                        food_id = %food.id,
                        shortfall = event.quantity - current,
                        "reduction exceeds current stock, clamping quantity to zero"
                    );
                }

                let entry = nutrition_log::ActiveModel {
                    food_id: Set(event.food_id),
                    quantity: Set(event.quantity),
                    action: Set(event.action.as_str().to_string()),
                    timestamp: match event.timestamp {
                        Some(ts) => Set(ts),
                        None => ActiveValue::NotSet,
                    },
                    ..Default::default()
                };
                let entry = entry.insert(txn).await.map_err(ServiceError::db_error)?;

                let updated = Food::update_many()
                    .col_expr(food::Column::Quantity, Expr::value(new_quantity))
                    .filter(food::Column::Id.eq(event.food_id))
                    .filter(food::Column::Quantity.eq(current))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                if updated.rows_affected == 0 {
                    // Another writer moved the quantity under us. Abort so
                    // the ledger insert rolls back with this attempt.
                    return Err(ServiceError::ConcurrentModification(event.food_id));
                }

                info!(
                    food_id = %event.food_id,
                    action = event.action.as_str(),
                    quantity = event.quantity,
                    new_quantity,
                    "applied nutrition log event"
                );

                Ok((entry, new_quantity))
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    /// Lists ledger entries, newest first, optionally filtered by food.
    #[instrument(skip(self))]
    pub async fn list_logs(
        &self,
        food_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<nutrition_log::Model>, u64), ServiceError> {
        let db = self.db.as_ref();

        let mut query = NutritionLog::find();
        if let Some(food_id) = food_id {
            query = query.filter(nutrition_log::Column::FoodId.eq(food_id));
        }

        let paginator = query
            .order_by(nutrition_log::Column::Timestamp, Order::Desc)
            .paginate(db, per_page.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let logs = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((logs, total))
    }
}
