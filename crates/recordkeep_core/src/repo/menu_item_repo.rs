//! Menu item store backed by the `menu_items` table.
//!
//! # Invariants
//! - Inserts and commits verify the referenced category inside the write
//!   transaction.
//! - Category deletion cascades to its menu items (schema level).

use crate::model::category::Category;
use crate::model::menu_item::{MenuItem, NewMenuItem};
use crate::model::record::{Draft, Record, RecordId, Revision, Tracked};
use crate::repo::store::{
    commit_guarded, delete_returning, ensure_assigned_id, ensure_connection_ready,
    ensure_persisted_valid, parse_bool, parse_revision, row_exists, RecordStore, StoreError,
    StoreResult, TableSpec,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const MENU_ITEM_TABLE: TableSpec = TableSpec {
    kind: MenuItem::KIND,
    table: "menu_items",
    id_column: "menu_item_id",
    columns: &[
        "menu_item_id",
        "menu_item_name",
        "description",
        "is_enabled",
        "category_id",
        "revision",
        "created_at",
        "updated_at",
    ],
};

const CATEGORY_REF_TABLE: TableSpec = TableSpec {
    kind: Category::KIND,
    table: "categories",
    id_column: "category_id",
    columns: &["category_id"],
};

const MENU_ITEM_SELECT_SQL: &str = "SELECT
    menu_item_id,
    menu_item_name,
    description,
    is_enabled,
    category_id,
    revision
FROM menu_items";

/// Menu queries beyond the generic record store.
pub trait MenuItemQueries {
    /// Lists items of one category ordered by name, then id.
    fn list_for_category(
        &self,
        category_id: RecordId,
        include_disabled: bool,
    ) -> StoreResult<Vec<MenuItem>>;
}

/// SQLite-backed menu item store.
pub struct SqliteMenuItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMenuItemRepository<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, &MENU_ITEM_TABLE)?;
        ensure_connection_ready(conn, &CATEGORY_REF_TABLE)?;
        Ok(Self { conn })
    }
}

impl RecordStore<MenuItem> for SqliteMenuItemRepository<'_> {
    fn insert(&self, draft: &NewMenuItem) -> StoreResult<Tracked<MenuItem>> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_category_exists(&tx, draft.category_id)?;

        let revision = Revision::generate();
        tx.execute(
            "INSERT INTO menu_items (
                menu_item_name,
                description,
                is_enabled,
                category_id,
                revision
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.menu_item_name.as_str(),
                draft.description.as_deref(),
                draft.is_enabled,
                draft.category_id,
                revision.to_string(),
            ],
        )?;
        let menu_item_id = ensure_assigned_id::<MenuItem>(tx.last_insert_rowid())?;
        tx.commit()?;

        let item = MenuItem {
            menu_item_id,
            menu_item_name: draft.menu_item_name.clone(),
            description: draft.description.clone(),
            is_enabled: draft.is_enabled,
            category_id: draft.category_id,
        };
        Ok(Tracked::from_store(item, revision))
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<Tracked<MenuItem>>> {
        get_menu_item(self.conn, id)
    }

    fn exists(&self, id: RecordId) -> StoreResult<bool> {
        row_exists(self.conn, &MENU_ITEM_TABLE, id)
    }

    fn list(&self) -> StoreResult<Vec<MenuItem>> {
        query_menu_items(
            self.conn,
            &format!("{MENU_ITEM_SELECT_SQL} ORDER BY menu_item_id ASC;"),
            params![],
        )
    }

    fn commit(&self, record: &Tracked<MenuItem>) -> StoreResult<Revision> {
        commit_guarded(self.conn, &MENU_ITEM_TABLE, record, |tx, next| {
            ensure_category_exists(tx, record.category_id)?;
            let changed = tx.execute(
                "UPDATE menu_items
                 SET
                    menu_item_name = ?1,
                    description = ?2,
                    is_enabled = ?3,
                    category_id = ?4,
                    revision = ?5,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE menu_item_id = ?6
                   AND revision = ?7;",
                params![
                    record.menu_item_name.as_str(),
                    record.description.as_deref(),
                    record.is_enabled,
                    record.category_id,
                    next.to_string(),
                    record.id(),
                    record.revision().to_string(),
                ],
            )?;
            Ok(changed)
        })
    }

    fn delete(&self, id: RecordId) -> StoreResult<MenuItem> {
        delete_returning(self.conn, &MENU_ITEM_TABLE, id, |tx| {
            Ok(get_menu_item(tx, id)?.map(Tracked::into_record))
        })
    }
}

impl MenuItemQueries for SqliteMenuItemRepository<'_> {
    fn list_for_category(
        &self,
        category_id: RecordId,
        include_disabled: bool,
    ) -> StoreResult<Vec<MenuItem>> {
        query_menu_items(
            self.conn,
            &format!(
                "{MENU_ITEM_SELECT_SQL}
                 WHERE category_id = ?1
                   AND (?2 = 1 OR is_enabled = 1)
                 ORDER BY menu_item_name ASC, menu_item_id ASC;"
            ),
            params![category_id, include_disabled],
        )
    }
}

fn ensure_category_exists(conn: &Connection, category_id: RecordId) -> StoreResult<()> {
    if row_exists(conn, &CATEGORY_REF_TABLE, category_id)? {
        return Ok(());
    }
    Err(StoreError::MissingReference {
        kind: Category::KIND,
        field: "categoryId",
        id: category_id,
    })
}

fn get_menu_item(conn: &Connection, id: RecordId) -> StoreResult<Option<Tracked<MenuItem>>> {
    let mut stmt = conn.prepare(&format!("{MENU_ITEM_SELECT_SQL} WHERE menu_item_id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_menu_item_row(row)?)),
        None => Ok(None),
    }
}

fn query_menu_items(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> StoreResult<Vec<MenuItem>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_menu_item_row(row)?.into_record());
    }
    Ok(items)
}

fn parse_menu_item_row(row: &Row<'_>) -> StoreResult<Tracked<MenuItem>> {
    let revision_text: String = row.get("revision")?;
    let revision = parse_revision(&revision_text, MENU_ITEM_TABLE.table)?;
    let item = MenuItem {
        menu_item_id: row.get("menu_item_id")?,
        menu_item_name: row.get("menu_item_name")?,
        description: row.get("description")?,
        is_enabled: parse_bool(row.get("is_enabled")?, "menu_items.is_enabled")?,
        category_id: row.get("category_id")?,
    };
    ensure_persisted_valid(&item, &MENU_ITEM_TABLE)?;
    Ok(Tracked::from_store(item, revision))
}
