//! Demo seed data for fresh databases.
//!
//! # Invariants
//! - Seeding is skipped per table group when rows already exist.
//! - Seeded categories receive ids 1..=4 on a fresh database.

use super::DbResult;
use crate::model::record::Revision;
use log::info;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

const DEMO_CATEGORIES: &[&str] = &["Starters", "Main Course", "Desserts", "Beverages"];

/// `(category index, name, description, enabled)`
const DEMO_MENU_ITEMS: &[(usize, &str, Option<&str>, bool)] = &[
    (0, "Tomato Soup", Some("Roasted tomatoes, basil oil"), true),
    (0, "Garlic Bread", None, true),
    (1, "Mushroom Risotto", Some("Arborio rice, parmesan"), true),
    (1, "Grilled Salmon", Some("Seasonal greens"), false),
    (2, "Lemon Tart", None, true),
    (3, "Fresh Lime Soda", None, true),
];

/// `(title, status, priority)`
const DEMO_TODO_ITEMS: &[(&str, &str, &str)] = &[
    ("Order weekly produce", "pending", "high"),
    ("Print new dessert menu", "in_progress", "medium"),
    ("Service espresso machine", "completed", "low"),
];

/// Counts of rows inserted by `seed_demo_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub menu_items: usize,
    pub todo_items: usize,
}

/// Inserts demo categories, menu items and to-do items into empty tables.
pub fn seed_demo_data(conn: &Connection) -> DbResult<SeedSummary> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let mut summary = SeedSummary::default();

    if table_is_empty(&tx, "categories")? {
        let mut category_ids = Vec::with_capacity(DEMO_CATEGORIES.len());
        for name in DEMO_CATEGORIES {
            tx.execute(
                "INSERT INTO categories (category_name, revision) VALUES (?1, ?2);",
                params![name, Revision::generate().to_string()],
            )?;
            category_ids.push(tx.last_insert_rowid());
        }
        summary.categories = category_ids.len();

        for (category_index, name, description, enabled) in DEMO_MENU_ITEMS {
            tx.execute(
                "INSERT INTO menu_items (
                    menu_item_name,
                    description,
                    is_enabled,
                    category_id,
                    revision
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    name,
                    description,
                    enabled,
                    category_ids[*category_index],
                    Revision::generate().to_string(),
                ],
            )?;
            summary.menu_items += 1;
        }
    }

    if table_is_empty(&tx, "todo_items")? {
        for (title, status, priority) in DEMO_TODO_ITEMS {
            tx.execute(
                "INSERT INTO todo_items (title, status, priority, revision)
                 VALUES (?1, ?2, ?3, ?4);",
                params![title, status, priority, Revision::generate().to_string()],
            )?;
            summary.todo_items += 1;
        }
    }

    tx.commit()?;
    info!(
        "event=db_seed module=db status=ok categories={} menu_items={} todo_items={}",
        summary.categories, summary.menu_items, summary.todo_items
    );
    Ok(summary)
}

fn table_is_empty(conn: &Connection, table: &str) -> DbResult<bool> {
    let has_rows: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table});"),
        [],
        |row| row.get(0),
    )?;
    Ok(has_rows == 0)
}
