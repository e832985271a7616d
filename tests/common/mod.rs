use foodtrack_api::{
    db::DbPool,
    migrator::Migrator,
    services::{foods::NewFood, FoodService, InventoryService, NutritionLogService},
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

pub struct TestContext {
    pub db: Arc<DbPool>,
    pub foods: FoodService,
    pub logs: NutritionLogService,
    pub inventory: InventoryService,
}

/// Fresh in-memory database with the full schema applied. A single pooled
/// connection keeps each test isolated from the others.
pub async fn setup() -> TestContext {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Arc::new(
        Database::connect(opt)
            .await
            .expect("Failed to open in-memory database"),
    );
    Migrator::up(db.as_ref(), None)
        .await
        .expect("Failed to run migrations");

    TestContext {
        foods: FoodService::new(db.clone()),
        logs: NutritionLogService::new(db.clone()),
        inventory: InventoryService::new(db.clone()),
        db,
    }
}

#[allow(dead_code)]
pub fn sample_food(barcode: &str, name: &str) -> NewFood {
    NewFood {
        barcode: barcode.to_string(),
        name: name.to_string(),
        ..Default::default()
    }
}
