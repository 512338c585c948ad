//! Domain model for the menu and to-do record kinds.
//!
//! # Responsibility
//! - Define the canonical record shapes persisted by the stores.
//! - Keep creation drafts, tracked handles and wire payloads as distinct types.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `RecordId`.
//! - Update paths accept only read-derived `Tracked<T>` handles.

pub mod category;
pub mod menu_item;
pub mod record;
pub mod todo;
