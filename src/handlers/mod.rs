pub mod common;
pub mod foods;
pub mod health;
pub mod inventory;
pub mod nutrition_logs;
