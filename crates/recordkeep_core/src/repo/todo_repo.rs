//! To-do item store backed by the `todo_items` table.
//!
//! # Invariants
//! - Filtered listing is ordered by priority (high first), then id.
//! - Search matches titles case-insensitively as a substring.

use crate::model::record::{Draft, Record, RecordId, Revision, Tracked};
use crate::model::todo::{NewTodoItem, TodoItem, TodoPriority, TodoStatus};
use crate::repo::store::{
    commit_guarded, delete_returning, ensure_assigned_id, ensure_connection_ready,
    ensure_persisted_valid, parse_revision, row_exists, RecordStore, StoreError, StoreResult,
    TableSpec,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const TODO_TABLE: TableSpec = TableSpec {
    kind: TodoItem::KIND,
    table: "todo_items",
    id_column: "todo_id",
    columns: &[
        "todo_id",
        "title",
        "description",
        "status",
        "priority",
        "due_at",
        "revision",
        "created_at",
        "updated_at",
    ],
};

const TODO_SELECT_SQL: &str = "SELECT
    todo_id,
    title,
    description,
    status,
    priority,
    due_at,
    revision
FROM todo_items";

const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END";

/// Filter options for listing to-do items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    /// Title substring; matched case-insensitively.
    pub title_contains: Option<String>,
}

/// To-do queries beyond the generic record store.
pub trait TodoQueries {
    fn search(&self, query: &TodoListQuery) -> StoreResult<Vec<TodoItem>>;
    /// Distinct statuses currently stored.
    fn distinct_statuses(&self) -> StoreResult<Vec<TodoStatus>>;
    /// Distinct priorities currently stored.
    fn distinct_priorities(&self) -> StoreResult<Vec<TodoPriority>>;
}

/// SQLite-backed to-do item store.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, &TODO_TABLE)?;
        Ok(Self { conn })
    }
}

impl RecordStore<TodoItem> for SqliteTodoRepository<'_> {
    fn insert(&self, draft: &NewTodoItem) -> StoreResult<Tracked<TodoItem>> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let revision = Revision::generate();
        tx.execute(
            "INSERT INTO todo_items (
                title,
                description,
                status,
                priority,
                due_at,
                revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.due_at,
                revision.to_string(),
            ],
        )?;
        let todo_id = ensure_assigned_id::<TodoItem>(tx.last_insert_rowid())?;
        tx.commit()?;

        let item = TodoItem {
            todo_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            priority: draft.priority,
            due_at: draft.due_at,
        };
        Ok(Tracked::from_store(item, revision))
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<Tracked<TodoItem>>> {
        get_todo(self.conn, id)
    }

    fn exists(&self, id: RecordId) -> StoreResult<bool> {
        row_exists(self.conn, &TODO_TABLE, id)
    }

    fn list(&self) -> StoreResult<Vec<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} ORDER BY todo_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_row(row)?.into_record());
        }
        Ok(items)
    }

    fn commit(&self, record: &Tracked<TodoItem>) -> StoreResult<Revision> {
        commit_guarded(self.conn, &TODO_TABLE, record, |tx, next| {
            let changed = tx.execute(
                "UPDATE todo_items
                 SET
                    title = ?1,
                    description = ?2,
                    status = ?3,
                    priority = ?4,
                    due_at = ?5,
                    revision = ?6,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE todo_id = ?7
                   AND revision = ?8;",
                params![
                    record.title.as_str(),
                    record.description.as_deref(),
                    record.status.as_str(),
                    record.priority.as_str(),
                    record.due_at,
                    next.to_string(),
                    record.id(),
                    record.revision().to_string(),
                ],
            )?;
            Ok(changed)
        })
    }

    fn delete(&self, id: RecordId) -> StoreResult<TodoItem> {
        delete_returning(self.conn, &TODO_TABLE, id, |tx| {
            Ok(get_todo(tx, id)?.map(Tracked::into_record))
        })
    }
}

impl TodoQueries for SqliteTodoRepository<'_> {
    fn search(&self, query: &TodoListQuery) -> StoreResult<Vec<TodoItem>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }

        if let Some(needle) = query.title_contains.as_deref() {
            sql.push_str(" AND instr(lower(title), lower(?)) > 0");
            bind_values.push(Value::Text(needle.to_string()));
        }

        sql.push_str(&format!(" ORDER BY {PRIORITY_RANK_SQL} ASC, todo_id ASC;"));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_todo_row(row)?.into_record());
        }
        Ok(items)
    }

    fn distinct_statuses(&self) -> StoreResult<Vec<TodoStatus>> {
        let values = distinct_column(self.conn, "status")?;
        let mut statuses = values
            .iter()
            .map(|value| parse_status(value))
            .collect::<StoreResult<Vec<_>>>()?;
        statuses.sort();
        Ok(statuses)
    }

    fn distinct_priorities(&self) -> StoreResult<Vec<TodoPriority>> {
        let values = distinct_column(self.conn, "priority")?;
        let mut priorities = values
            .iter()
            .map(|value| parse_priority(value))
            .collect::<StoreResult<Vec<_>>>()?;
        priorities.sort();
        Ok(priorities)
    }
}

fn distinct_column(conn: &Connection, column: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("SELECT DISTINCT {column} FROM todo_items;"))?;
    let mut rows = stmt.query([])?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        values.push(row.get(0)?);
    }
    Ok(values)
}

fn get_todo(conn: &Connection, id: RecordId) -> StoreResult<Option<Tracked<TodoItem>>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE todo_id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_todo_row(row)?)),
        None => Ok(None),
    }
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Tracked<TodoItem>> {
    let revision_text: String = row.get("revision")?;
    let revision = parse_revision(&revision_text, TODO_TABLE.table)?;
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;

    let item = TodoItem {
        todo_id: row.get("todo_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_status(&status_text)?,
        priority: parse_priority(&priority_text)?,
        due_at: row.get("due_at")?,
    };
    ensure_persisted_valid(&item, &TODO_TABLE)?;
    Ok(Tracked::from_store(item, revision))
}

fn parse_status(value: &str) -> StoreResult<TodoStatus> {
    TodoStatus::parse(value).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid status `{value}` in todo_items.status"))
    })
}

fn parse_priority(value: &str) -> StoreResult<TodoPriority> {
    TodoPriority::parse(value).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid priority `{value}` in todo_items.priority"))
    })
}
