//! To-do board use-case: filtered list plus filter options.
//!
//! # Invariants
//! - Blank search text means no title filter.
//! - Filter options list only values present in storage, in declaration
//!   order.

use crate::model::todo::{TodoItem, TodoPriority, TodoStatus};
use crate::repo::store::StoreError;
use crate::repo::todo_repo::{TodoListQuery, TodoQueries};
use serde::Serialize;

/// Caller-facing board filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoBoardQuery {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub search: Option<String>,
}

/// Filtered to-do items with the options for filter drop-downs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoBoard {
    pub items: Vec<TodoItem>,
    pub statuses: Vec<TodoStatus>,
    pub priorities: Vec<TodoPriority>,
    /// Filters as applied, after search normalization.
    pub query: TodoBoardQuery,
}

/// To-do board facade over a query-capable store.
pub struct TodoService<R: TodoQueries> {
    repo: R,
}

impl<R: TodoQueries> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds the board for the given filters.
    pub fn board(&self, query: TodoBoardQuery) -> Result<TodoBoard, StoreError> {
        let search = normalize_search(query.search);
        let list_query = TodoListQuery {
            status: query.status,
            priority: query.priority,
            title_contains: search.clone(),
        };

        Ok(TodoBoard {
            items: self.repo.search(&list_query)?,
            statuses: self.repo.distinct_statuses()?,
            priorities: self.repo.distinct_priorities()?,
            query: TodoBoardQuery {
                status: query.status,
                priority: query.priority,
                search,
            },
        })
    }
}

fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
