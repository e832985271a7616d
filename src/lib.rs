//! Food Tracking API Library
//!
//! Catalog CRUD, an append-only nutrition ledger that drives the derived
//! inventory quantity, and read-only inventory projections.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub foods: services::FoodService,
    pub logs: services::NutritionLogService,
    pub inventory: services::InventoryService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        Self {
            foods: services::FoodService::new(db.clone()),
            logs: services::NutritionLogService::new(db.clone()),
            inventory: services::InventoryService::new(db.clone()),
            db,
            config,
        }
    }
}

/// Assembles the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", handlers::health::health_router())
        .nest("/foods", handlers::foods::foods_router())
        .nest(
            "/nutrition-logs",
            handlers::nutrition_logs::nutrition_logs_router(),
        )
        .nest("/inventory", handlers::inventory::inventory_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .with_state(state)
}
