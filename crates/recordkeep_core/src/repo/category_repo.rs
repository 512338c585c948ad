//! Category store backed by the `categories` table.

use crate::model::category::{Category, NewCategory};
use crate::model::record::{Draft, Record, RecordId, Revision, Tracked};
use crate::repo::store::{
    commit_guarded, delete_returning, ensure_assigned_id, ensure_connection_ready,
    ensure_persisted_valid, parse_revision, row_exists, RecordStore, StoreResult, TableSpec,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const CATEGORY_TABLE: TableSpec = TableSpec {
    kind: Category::KIND,
    table: "categories",
    id_column: "category_id",
    columns: &[
        "category_id",
        "category_name",
        "revision",
        "created_at",
        "updated_at",
    ],
};

const CATEGORY_SELECT_SQL: &str = "SELECT
    category_id,
    category_name,
    revision
FROM categories";

/// SQLite-backed category store.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, &CATEGORY_TABLE)?;
        Ok(Self { conn })
    }
}

impl RecordStore<Category> for SqliteCategoryRepository<'_> {
    fn insert(&self, draft: &NewCategory) -> StoreResult<Tracked<Category>> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let revision = Revision::generate();
        tx.execute(
            "INSERT INTO categories (category_name, revision) VALUES (?1, ?2);",
            params![draft.category_name.as_str(), revision.to_string()],
        )?;
        let category_id = ensure_assigned_id::<Category>(tx.last_insert_rowid())?;
        tx.commit()?;

        let category = Category {
            category_id,
            category_name: draft.category_name.clone(),
        };
        Ok(Tracked::from_store(category, revision))
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<Tracked<Category>>> {
        get_category(self.conn, id)
    }

    fn exists(&self, id: RecordId) -> StoreResult<bool> {
        row_exists(self.conn, &CATEGORY_TABLE, id)
    }

    fn list(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} ORDER BY category_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?.into_record());
        }
        Ok(categories)
    }

    fn commit(&self, record: &Tracked<Category>) -> StoreResult<Revision> {
        commit_guarded(self.conn, &CATEGORY_TABLE, record, |tx, next| {
            let changed = tx.execute(
                "UPDATE categories
                 SET
                    category_name = ?1,
                    revision = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE category_id = ?3
                   AND revision = ?4;",
                params![
                    record.category_name.as_str(),
                    next.to_string(),
                    record.id(),
                    record.revision().to_string(),
                ],
            )?;
            Ok(changed)
        })
    }

    fn delete(&self, id: RecordId) -> StoreResult<Category> {
        delete_returning(self.conn, &CATEGORY_TABLE, id, |tx| {
            Ok(get_category(tx, id)?.map(Tracked::into_record))
        })
    }
}

fn get_category(conn: &Connection, id: RecordId) -> StoreResult<Option<Tracked<Category>>> {
    let mut stmt = conn.prepare(&format!("{CATEGORY_SELECT_SQL} WHERE category_id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_category_row(row)?)),
        None => Ok(None),
    }
}

fn parse_category_row(row: &Row<'_>) -> StoreResult<Tracked<Category>> {
    let revision_text: String = row.get("revision")?;
    let revision = parse_revision(&revision_text, CATEGORY_TABLE.table)?;
    let category = Category {
        category_id: row.get("category_id")?,
        category_name: row.get("category_name")?,
    };
    ensure_persisted_valid(&category, &CATEGORY_TABLE)?;
    Ok(Tracked::from_store(category, revision))
}
