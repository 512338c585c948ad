//! Core domain logic for RecordKeep.
//! This crate is the single source of truth for record invariants.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, seed_demo_data, DbError, SeedSummary};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryPayload, NewCategory};
pub use model::menu_item::{MenuItem, MenuItemPayload, NewMenuItem};
pub use model::record::{
    FieldError, FieldErrorReason, Record, RecordId, Revision, Tracked, TrackedView,
};
pub use model::todo::{NewTodoItem, TodoItem, TodoItemPayload, TodoPriority, TodoStatus};
pub use repo::category_repo::SqliteCategoryRepository;
pub use repo::menu_item_repo::{MenuItemQueries, SqliteMenuItemRepository};
pub use repo::store::{RecordStore, StoreError, StoreResult};
pub use repo::todo_repo::{SqliteTodoRepository, TodoListQuery, TodoQueries};
pub use service::menu_service::{CategoryMenu, MenuService, MenuServiceError};
pub use service::record_service::{RecordService, RecordServiceError, RecordServiceResult};
pub use service::todo_service::{TodoBoard, TodoBoardQuery, TodoService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
