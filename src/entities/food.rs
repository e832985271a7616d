use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trackable food item. `quantity` is derived from the nutrition ledger
/// and must never be written directly outside of event application.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "foods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
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
    #[sea_orm(column_type = "Json", nullable)]
    pub allergens: Option<Json>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i32,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::nutrition_log::Entity")]
    NutritionLog,
}

impl Related<super::nutrition_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NutritionLog.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.id {
            active_model.id = Set(Uuid::new_v4());
        }
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

impl Model {
    /// Allergens decoded from their JSON column representation.
    pub fn allergen_list(&self) -> Vec<String> {
        self.allergens
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}
