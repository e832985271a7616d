pub mod food;
pub mod nutrition_log;

pub use nutrition_log::LogAction;
