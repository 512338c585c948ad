//! Shared identity, revision and validation contracts for stored records.
//!
//! # Responsibility
//! - Define the identifier and revision types every record kind uses.
//! - Define `Tracked<T>`, the only value accepted by update paths.
//! - Define field-level validation errors shared by all record kinds.
//!
//! # Invariants
//! - `Tracked<T>` is built only by stores, from a read or an insert.
//! - A `Tracked<T>` remembers the id it was read under. Editing the id field
//!   of the wrapped record is possible but rejected by update.
//! - `Revision` is regenerated on every successful write.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::ops::{Deref, DerefMut};
use uuid::Uuid;

/// Store-assigned record identifier.
pub type RecordId = i64;

/// Concurrency stamp attached to every stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(Uuid);

impl Revision {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a hyphenated revision string, as produced by `Display`.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorReason {
    /// Field is absent (null on the wire).
    Required,
    /// Field is present but empty after trim.
    Blank,
    /// Field exceeds its maximum length in characters.
    TooLong { max: usize, actual: usize },
    /// Field holds a value outside its allowed set.
    UnknownValue(String),
}

impl Display for FieldErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::Blank => write!(f, "must not be blank"),
            Self::TooLong { max, actual } => {
                write!(f, "must be at most {max} characters, got {actual}")
            }
            Self::UnknownValue(value) => write!(f, "has unsupported value `{value}`"),
        }
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: FieldErrorReason,
}

impl FieldError {
    pub fn new(field: &'static str, reason: FieldErrorReason) -> Self {
        Self { field, reason }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

impl Error for FieldError {}

/// A record kind persisted by a `RecordStore`.
pub trait Record: Clone + Debug + Serialize {
    /// Short kind name used in logs and error messages.
    const KIND: &'static str;
    /// Largest identifier the backing column type can hold.
    const ID_MAX: RecordId;
    /// Creation-only input for this kind.
    type Draft: Draft;

    /// Identifier embedded in the record value.
    fn id(&self) -> RecordId;
    /// Checks mutable field rules.
    fn validate(&self) -> Result<(), FieldError>;
}

/// Creation-only input; carries no identifier.
pub trait Draft {
    fn validate(&self) -> Result<(), FieldError>;
}

/// Deserialized update body for one record kind.
///
/// Every field is optional so absent values surface as validation errors
/// rather than parse failures.
pub trait UpdatePayload: DeserializeOwned {
    type Target: Record;

    /// Identifier embedded in the body, if any.
    fn claimed_id(&self) -> Option<RecordId>;
    /// Revision the caller read, if the body was round-tripped through a read.
    fn revision(&self) -> Option<Revision>;
    /// Builds a full candidate record under `id`.
    fn into_candidate(self, id: RecordId) -> Result<Self::Target, FieldError>;
}

/// Read-derived handle to an existing record.
///
/// Obtainable only from a store read or insert. Dereferences to the record
/// so callers mutate fields in place before passing the handle to update.
#[derive(Debug)]
pub struct Tracked<T: Record> {
    record: T,
    origin_id: RecordId,
    revision: Revision,
}

impl<T: Record> Tracked<T> {
    pub(crate) fn from_store(record: T, revision: Revision) -> Self {
        Self {
            origin_id: record.id(),
            record,
            revision,
        }
    }

    /// Identifier this handle was read under.
    pub fn id(&self) -> RecordId {
        self.origin_id
    }

    /// Revision observed when the handle was read.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    pub fn into_record(self) -> T {
        self.record
    }

    pub(crate) fn replace_fields(&mut self, candidate: T) {
        self.record = candidate;
    }
}

impl<T: Record> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl<T: Record> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.record
    }
}

/// Serializable view of a tracked record: its fields plus `revision`.
#[derive(Debug, Serialize)]
pub struct TrackedView<'a, T: Record> {
    #[serde(flatten)]
    pub record: &'a T,
    pub revision: Revision,
}

impl<'a, T: Record> From<&'a Tracked<T>> for TrackedView<'a, T> {
    fn from(value: &'a Tracked<T>) -> Self {
        Self {
            record: value.record(),
            revision: value.revision(),
        }
    }
}

pub(crate) fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, FieldErrorReason::Blank));
    }
    check_length(field, value, max)
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), FieldError> {
    match value {
        Some(value) => check_length(field, value, max),
        None => Ok(()),
    }
}

pub(crate) fn required<V>(field: &'static str, value: Option<V>) -> Result<V, FieldError> {
    value.ok_or(FieldError::new(field, FieldErrorReason::Required))
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(FieldError::new(
            field,
            FieldErrorReason::TooLong { max, actual },
        ));
    }
    Ok(())
}
