//! Record store contract and shared SQLite helpers.
//!
//! # Responsibility
//! - Define the storage collaborator used by record services.
//! - Keep revision-checked commit semantics identical across record kinds.
//! - Verify connection schema readiness before a store is handed out.
//!
//! # Invariants
//! - `commit` writes only when the stored revision equals the handle's.
//! - Every successful write stores a freshly generated revision.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::record::{FieldError, Record, RecordId, Revision, Tracked};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by record stores.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Record fields failed validation before a write.
    Validation(FieldError),
    /// No row exists for the identifier.
    NotFound { kind: &'static str, id: RecordId },
    /// Stored revision moved since the handle was read.
    Conflict {
        kind: &'static str,
        id: RecordId,
        expected: Revision,
        actual: Revision,
    },
    /// A foreign identifier points at a missing row.
    MissingReference {
        kind: &'static str,
        field: &'static str,
        id: RecordId,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Insert was assigned an id past the kind's addressable range.
    IdentifierExhausted {
        kind: &'static str,
        id: RecordId,
        max: RecordId,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Conflict {
                kind,
                id,
                expected,
                actual,
            } => write!(
                f,
                "{kind} {id} was modified concurrently: expected revision {expected}, found {actual}"
            ),
            Self::MissingReference { kind, field, id } => {
                write!(f, "{field} references missing {kind}: {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "record store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::IdentifierExhausted { kind, id, max } => write!(
                f,
                "{kind} identifier {id} exceeds the maximum of {max}; no more {kind} records can be created"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldError> for StoreError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable keyed collection of one record kind.
///
/// The store is the only authority on existence and current field values,
/// and the only producer of `Tracked<T>` handles.
pub trait RecordStore<T: Record> {
    /// Inserts a draft and returns a handle with the assigned id.
    fn insert(&self, draft: &T::Draft) -> StoreResult<Tracked<T>>;
    /// Reads one record with its current revision.
    fn get(&self, id: RecordId) -> StoreResult<Option<Tracked<T>>>;
    /// Returns whether a row exists for `id`.
    fn exists(&self, id: RecordId) -> StoreResult<bool>;
    /// Lists all records ordered by id ascending.
    fn list(&self) -> StoreResult<Vec<T>>;
    /// Writes the handle's fields if its revision is still current.
    fn commit(&self, record: &Tracked<T>) -> StoreResult<Revision>;
    /// Removes one record and returns its last stored value.
    fn delete(&self, id: RecordId) -> StoreResult<T>;
}

/// Table layout facts shared by the SQLite stores.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableSpec {
    pub kind: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [&'static str],
}

/// Runs a revision-guarded write in one immediate transaction.
///
/// `write` receives the transaction and the next revision, and must return
/// the number of rows its `UPDATE ... WHERE id = ? AND revision = ?` touched.
pub(crate) fn commit_guarded<T: Record>(
    conn: &Connection,
    spec: &TableSpec,
    record: &Tracked<T>,
    write: impl FnOnce(&Connection, Revision) -> StoreResult<usize>,
) -> StoreResult<Revision> {
    record.validate()?;

    let next = Revision::generate();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let changed = write(&*tx, next)?;
    if changed == 0 {
        return Err(missed_commit_error(
            &tx,
            spec,
            record.id(),
            record.revision(),
        )?);
    }
    tx.commit()?;
    Ok(next)
}

/// Rejects an assigned identifier that later reads could not address.
///
/// Called inside the insert transaction so an error rolls the row back.
pub(crate) fn ensure_assigned_id<T: Record>(id: RecordId) -> StoreResult<RecordId> {
    if id > T::ID_MAX {
        return Err(StoreError::IdentifierExhausted {
            kind: T::KIND,
            id,
            max: T::ID_MAX,
        });
    }
    Ok(id)
}

/// Deletes one row in a transaction and returns the value it held.
pub(crate) fn delete_returning<T>(
    conn: &Connection,
    spec: &TableSpec,
    id: RecordId,
    read: impl FnOnce(&Connection) -> StoreResult<Option<T>>,
) -> StoreResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let Some(record) = read(&*tx)? else {
        return Err(StoreError::NotFound { kind: spec.kind, id });
    };
    tx.execute(
        &format!("DELETE FROM {} WHERE {} = ?1;", spec.table, spec.id_column),
        [id],
    )?;
    tx.commit()?;
    Ok(record)
}

/// Rejects persisted rows that no longer satisfy field rules.
pub(crate) fn ensure_persisted_valid<T: Record>(record: &T, spec: &TableSpec) -> StoreResult<()> {
    record.validate().map_err(|err| {
        StoreError::InvalidData(format!("{err} in {} row {}", spec.table, record.id()))
    })
}

/// Classifies a commit whose guarded `UPDATE` touched no rows.
pub(crate) fn missed_commit_error(
    conn: &Connection,
    spec: &TableSpec,
    id: RecordId,
    expected: Revision,
) -> StoreResult<StoreError> {
    match stored_revision(conn, spec, id)? {
        None => Ok(StoreError::NotFound { kind: spec.kind, id }),
        Some(actual) => Ok(StoreError::Conflict {
            kind: spec.kind,
            id,
            expected,
            actual,
        }),
    }
}

pub(crate) fn stored_revision(
    conn: &Connection,
    spec: &TableSpec,
    id: RecordId,
) -> StoreResult<Option<Revision>> {
    let text: Option<String> = conn
        .query_row(
            &format!(
                "SELECT revision FROM {} WHERE {} = ?1;",
                spec.table, spec.id_column
            ),
            [id],
            |row| row.get(0),
        )
        .optional()?;
    text.map(|value| parse_revision(&value, spec.table)).transpose()
}

pub(crate) fn row_exists(conn: &Connection, spec: &TableSpec, id: RecordId) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            spec.table, spec.id_column
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn parse_revision(value: &str, table: &str) -> StoreResult<Revision> {
    Revision::parse(value).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid revision `{value}` in {table}.revision"))
    })
}

pub(crate) fn parse_bool(value: i64, column: &str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Verifies schema version, table and columns before a store is built.
pub(crate) fn ensure_connection_ready(conn: &Connection, spec: &TableSpec) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, spec.table)? {
        return Err(StoreError::MissingRequiredTable(spec.table));
    }

    for &column in spec.columns {
        if !table_has_column(conn, spec.table, column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: spec.table,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
