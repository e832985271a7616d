use crate::{
    entities::food::{self, Entity as Food},
    errors::ServiceError,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    sea_query::NullOrdering, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Days within which an unexpired item counts as "Expires soon".
const EXPIRES_SOON_WINDOW_DAYS: i64 = 7;

/// Read-time classification of a food's expiry date. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExpiryStatus {
    #[serde(rename = "No expiry date")]
    NoExpiryDate,
    #[serde(rename = "Expired")]
    Expired,
    #[serde(rename = "Expires soon")]
    ExpiresSoon,
    #[serde(rename = "Fresh")]
    Fresh,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::NoExpiryDate => "No expiry date",
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::ExpiresSoon => "Expires soon",
            ExpiryStatus::Fresh => "Fresh",
        }
    }
}

/// Classifies an expiry date relative to `today`. The "Expires soon" window
/// is inclusive on both ends: today through today + 7 days.
pub fn classify_expiry(expiry_date: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    match expiry_date {
        None => ExpiryStatus::NoExpiryDate,
        Some(date) if date < today => ExpiryStatus::Expired,
        Some(date) if date <= today + Duration::days(EXPIRES_SOON_WINDOW_DAYS) => {
            ExpiryStatus::ExpiresSoon
        }
        Some(_) => ExpiryStatus::Fresh,
    }
}

/// An in-stock food joined with its computed expiry classification.
#[derive(Debug, Clone)]
pub struct InventoryRecord {
    pub food: food::Model,
    pub expiry_status: ExpiryStatus,
}

/// Read-only projections over the food catalog.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The inventory view: foods with stock on hand, each with an expiry
    /// status computed against today's date. Zero-quantity items are
    /// excluded even though they remain in the catalog. Ordered by expiry
    /// date ascending, undated items last.
    #[instrument(skip(self))]
    pub async fn inventory_view(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<InventoryRecord>, ServiceError> {
        let mut query = Food::find().filter(food::Column::Quantity.gt(0));
        if let Some(category) = category {
            query = query.filter(food::Column::Category.eq(category));
        }

        let foods = query
            .order_by_with_nulls(food::Column::ExpiryDate, Order::Asc, NullOrdering::Last)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let today = Utc::now().date_naive();
        Ok(foods
            .into_iter()
            .map(|food| InventoryRecord {
                expiry_status: classify_expiry(food.expiry_date, today),
                food,
            })
            .collect())
    }

    /// In-stock foods expiring between today and `days_ahead` days out,
    /// soonest first.
    #[instrument(skip(self))]
    pub async fn expiring_foods(&self, days_ahead: i64) -> Result<Vec<food::Model>, ServiceError> {
        let today = Utc::now().date_naive();
        let horizon = today + Duration::days(days_ahead);

        Food::find()
            .filter(food::Column::ExpiryDate.gte(today))
            .filter(food::Column::ExpiryDate.lte(horizon))
            .filter(food::Column::Quantity.gt(0))
            .order_by(food::Column::ExpiryDate, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Foods at or below the stock threshold, lowest first.
    #[instrument(skip(self))]
    pub async fn low_stock_foods(&self, threshold: i32) -> Result<Vec<food::Model>, ServiceError> {
        Food::find()
            .filter(food::Column::Quantity.lte(threshold))
            .filter(food::Column::Quantity.gte(0))
            .order_by(food::Column::Quantity, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
