pub mod foods;
pub mod inventory;
pub mod nutrition_logs;

pub use foods::FoodService;
pub use inventory::InventoryService;
pub use nutrition_logs::NutritionLogService;
