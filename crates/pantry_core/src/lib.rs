//! Core domain logic for the pantry order and inventory store.
//! This crate is the single source of truth for schema and cascade rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::entity::EntityKind;
pub use model::order::OrderStatus;
pub use model::validation::ValidationError;
pub use repo::admin_repo::{EntityCount, EntityLabel, SqliteAdminRepository};
pub use repo::catalog_repo::SqliteCatalogRepository;
pub use repo::inventory_repo::SqliteInventoryRepository;
pub use repo::order_repo::SqliteOrderRepository;
pub use repo::{ListQuery, RepoError, RepoResult};
pub use service::admin_service::AdminService;
pub use service::catalog_service::{CatalogService, CatalogServiceError};
pub use service::inventory_service::{InventoryService, InventoryServiceError};
pub use service::order_service::{OrderService, OrderServiceError};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
