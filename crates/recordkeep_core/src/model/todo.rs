//! To-do list record.
//!
//! # Responsibility
//! - Define the to-do item shape and its status/priority vocabularies.
//! - Provide stable string forms shared by storage and wire payloads.
//!
//! # Invariants
//! - `title` is non-blank and at most 100 characters.
//! - `description` is at most 500 characters when present.
//! - Status and priority strings are lowercase snake_case.

use crate::model::record::{
    optional_text, require_text, required, Draft, FieldError, FieldErrorReason, Record, RecordId,
    Revision, UpdatePayload,
};
use serde::{Deserialize, Serialize};

pub const TODO_TITLE_MAX_CHARS: usize = 100;
pub const TODO_DESCRIPTION_MAX_CHARS: usize = 500;

/// Progress state of a to-do item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Urgency of a to-do item. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

impl TodoPriority {
    pub const ALL: [TodoPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One entry on the to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub todo_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    /// Unix epoch milliseconds.
    pub due_at: Option<i64>,
}

impl Record for TodoItem {
    const KIND: &'static str = "todo_item";
    const ID_MAX: RecordId = i32::MAX as RecordId;
    type Draft = NewTodoItem;

    fn id(&self) -> RecordId {
        self.todo_id
    }

    fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.title, self.description.as_deref())
    }
}

/// Creation input for a to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoItem {
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub due_at: Option<i64>,
}

impl NewTodoItem {
    /// Pending, medium-priority item with no due date.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TodoStatus::Pending,
            priority: TodoPriority::Medium,
            due_at: None,
        }
    }
}

impl Draft for NewTodoItem {
    fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.title, self.description.as_deref())
    }
}

/// Update body for `PUT /todo-items/{id}`.
///
/// `status` and `priority` stay strings here so unsupported values are
/// reported as field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemPayload {
    pub todo_id: Option<RecordId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_at: Option<i64>,
    pub revision: Option<Revision>,
}

impl UpdatePayload for TodoItemPayload {
    type Target = TodoItem;

    fn claimed_id(&self) -> Option<RecordId> {
        self.todo_id
    }

    fn revision(&self) -> Option<Revision> {
        self.revision
    }

    fn into_candidate(self, id: RecordId) -> Result<TodoItem, FieldError> {
        let status_text = required("status", self.status)?;
        let status = TodoStatus::parse(&status_text).ok_or_else(|| {
            FieldError::new("status", FieldErrorReason::UnknownValue(status_text.clone()))
        })?;
        let priority_text = required("priority", self.priority)?;
        let priority = TodoPriority::parse(&priority_text).ok_or_else(|| {
            FieldError::new(
                "priority",
                FieldErrorReason::UnknownValue(priority_text.clone()),
            )
        })?;

        Ok(TodoItem {
            todo_id: id,
            title: required("title", self.title)?,
            description: self.description,
            status,
            priority,
            due_at: self.due_at,
        })
    }
}

fn validate_fields(title: &str, description: Option<&str>) -> Result<(), FieldError> {
    require_text("title", title, TODO_TITLE_MAX_CHARS)?;
    optional_text("description", description, TODO_DESCRIPTION_MAX_CHARS)
}
