use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_foods_table::Migration),
            Box::new(m20250301_000002_create_nutrition_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_foods_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_foods_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create foods table aligned with entities::food Model
            manager
                .create_table(
                    Table::create()
                        .table(Foods::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Foods::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Foods::Barcode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Foods::Name).string().not_null())
                        .col(ColumnDef::new(Foods::Brand).string().null())
                        .col(ColumnDef::new(Foods::Category).string().null())
                        .col(ColumnDef::new(Foods::Calories).integer().null())
                        .col(ColumnDef::new(Foods::Protein).double().null())
                        .col(ColumnDef::new(Foods::Fat).double().null())
                        .col(ColumnDef::new(Foods::Carbs).double().null())
                        .col(ColumnDef::new(Foods::Fiber).double().null())
                        .col(ColumnDef::new(Foods::Sugars).double().null())
                        .col(ColumnDef::new(Foods::Sodium).double().null())
                        .col(ColumnDef::new(Foods::Allergens).json().null())
                        .col(ColumnDef::new(Foods::ExpiryDate).date().null())
                        .col(
                            ColumnDef::new(Foods::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Foods::Location).string().null())
                        .col(
                            ColumnDef::new(Foods::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_foods_barcode")
                        .table(Foods::Table)
                        .col(Foods::Barcode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_foods_category")
                        .table(Foods::Table)
                        .col(Foods::Category)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_foods_expiry_date")
                        .table(Foods::Table)
                        .col(Foods::ExpiryDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Foods::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Foods {
        Table,
        Id,
        Barcode,
        Name,
        Brand,
        Category,
        Calories,
        Protein,
        Fat,
        Carbs,
        Fiber,
        Sugars,
        Sodium,
        Allergens,
        ExpiryDate,
        Quantity,
        Location,
        CreatedAt,
    }
}

mod m20250301_000002_create_nutrition_logs_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_foods_table::Foods;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_nutrition_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Append-only ledger. The action column carries a check constraint
            // mirroring the LogAction enum, and deleting a food cascades here.
            manager
                .create_table(
                    Table::create()
                        .table(NutritionLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(NutritionLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(NutritionLogs::FoodId).uuid().not_null())
                        .col(
                            ColumnDef::new(NutritionLogs::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NutritionLogs::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(NutritionLogs::Action)
                                .string()
                                .not_null()
                                .check(Expr::col(NutritionLogs::Action).is_in([
                                    "added", "removed", "consumed", "expired",
                                ])),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_nutrition_logs_food_id")
                                .from(NutritionLogs::Table, NutritionLogs::FoodId)
                                .to(Foods::Table, Foods::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_nutrition_logs_food_id")
                        .table(NutritionLogs::Table)
                        .col(NutritionLogs::FoodId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_nutrition_logs_timestamp")
                        .table(NutritionLogs::Table)
                        .col(NutritionLogs::Timestamp)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_nutrition_logs_action")
                        .table(NutritionLogs::Table)
                        .col(NutritionLogs::Action)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(NutritionLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum NutritionLogs {
        Table,
        Id,
        FoodId,
        Quantity,
        Timestamp,
        Action,
    }
}
