//! Repository layer: record store contract and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage collaborator consumed by record services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store writes validate record fields before SQL mutations.
//! - Store APIs return semantic errors (`NotFound`, `Conflict`,
//!   `MissingReference`) in addition to DB transport errors.

pub mod category_repo;
pub mod menu_item_repo;
pub mod store;
pub mod todo_repo;
