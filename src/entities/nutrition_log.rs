use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of ledger actions. `added` increases the food's quantity,
/// the other three decrease it with a floor at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Added,
    Removed,
    Consumed,
    Expired,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Added => "added",
            LogAction::Removed => "removed",
            LogAction::Consumed => "consumed",
            LogAction::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "added" => Some(LogAction::Added),
            "removed" => Some(LogAction::Removed),
            "consumed" => Some(LogAction::Consumed),
            "expired" => Some(LogAction::Expired),
            _ => None,
        }
    }

    /// Whether this action increases the catalog quantity.
    pub fn is_addition(&self) -> bool {
        matches!(self, LogAction::Added)
    }
}

/// Append-only ledger row. Entries are never updated or deleted individually;
/// they are removed only by cascade when the referenced food is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nutrition_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    pub timestamp: DateTime<Utc>,
    // Stored as a string in the DB (with a check constraint), converted
    // to/from LogAction at the service boundary.
    pub action: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::food::Entity",
        from = "Column::FoodId",
        to = "super::food::Column::Id",
        on_delete = "Cascade"
    )]
    Food,
}

impl Related<super::food::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Food.def()
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
        if let ActiveValue::NotSet = active_model.timestamp {
            active_model.timestamp = Set(Utc::now());
        }
        Ok(active_model)
    }
}

impl Model {
    pub fn action(&self) -> Option<LogAction> {
        LogAction::from_str(&self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_strings() {
        for action in [
            LogAction::Added,
            LogAction::Removed,
            LogAction::Consumed,
            LogAction::Expired,
        ] {
            assert_eq!(LogAction::from_str(action.as_str()), Some(action));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(LogAction::from_str("discarded"), None);
        assert_eq!(LogAction::from_str(""), None);
        assert_eq!(LogAction::from_str("Added"), None);
    }
}
