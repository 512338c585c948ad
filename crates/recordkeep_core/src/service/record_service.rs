//! Record use-case service: create, read, update and delete for one kind.
//!
//! # Responsibility
//! - Own the ordered validation contract of record updates.
//! - Turn update bodies into read-derived handles at the wire boundary.
//! - Delegate persistence to a `RecordStore` implementation.
//!
//! # Invariants
//! - Update accepts only `Tracked<T>`; fresh values cannot reach a commit.
//! - Update checks run in a fixed order and the first failure wins.
//! - A rejected update performs zero writes; a successful one exactly one.

use crate::model::record::{Draft, FieldError, Record, RecordId, Tracked, UpdatePayload};
use crate::repo::store::{RecordStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RecordServiceResult<T> = Result<T, RecordServiceError>;

/// Errors from record use-cases.
#[derive(Debug)]
pub enum RecordServiceError {
    /// Identifier is absent, negative, or outside the id column range.
    InvalidIdentifier {
        kind: &'static str,
        value: Option<i64>,
    },
    /// No record representation was supplied.
    MissingPayload { kind: &'static str },
    /// Path identifier and embedded identifier differ.
    IdentifierMismatch {
        kind: &'static str,
        path_id: RecordId,
        payload_id: Option<RecordId>,
    },
    /// A field failed validation.
    Validation(FieldError),
    /// No record exists for the identifier.
    NotFound { kind: &'static str, id: RecordId },
    /// Update body was never round-tripped through a read.
    UntrackedReplacement { kind: &'static str, id: RecordId },
    /// Stored revision moved since the caller's read.
    Conflict { kind: &'static str, id: RecordId },
    /// Store failure, propagated unchanged.
    Storage(StoreError),
}

impl RecordServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            Self::MissingPayload { .. } => "MISSING_PAYLOAD",
            Self::IdentifierMismatch { .. } => "IDENTIFIER_MISMATCH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UntrackedReplacement { .. } => "UNTRACKED_REPLACEMENT",
            Self::Conflict { .. } => "CONFLICT",
            Self::Storage(StoreError::MissingReference { .. }) => "INVALID_REFERENCE",
            Self::Storage(StoreError::IdentifierExhausted { .. }) => "IDENTIFIER_EXHAUSTED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether the caller's input caused the failure.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Storage(err) if !matches!(err, StoreError::MissingReference { .. }))
    }
}

impl Display for RecordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier {
                kind,
                value: Some(value),
            } => write!(f, "invalid {kind} identifier: {value}"),
            Self::InvalidIdentifier { kind, value: None } => {
                write!(f, "{kind} identifier is required")
            }
            Self::MissingPayload { kind } => write!(f, "{kind} payload is required"),
            Self::IdentifierMismatch {
                kind,
                path_id,
                payload_id: Some(payload_id),
            } => write!(
                f,
                "{kind} identifier mismatch: path {path_id}, payload {payload_id}"
            ),
            Self::IdentifierMismatch {
                kind,
                path_id,
                payload_id: None,
            } => write!(
                f,
                "{kind} identifier mismatch: path {path_id}, payload has none"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UntrackedReplacement { kind, id } => write!(
                f,
                "{kind} {id} update must start from a prior read (revision missing)"
            ),
            Self::Conflict { kind, id } => {
                write!(f, "{kind} {id} was modified since it was read")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RecordServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::Conflict { kind, id, .. } => Self::Conflict { kind, id },
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// Use-case service for one record kind over a store implementation.
pub struct RecordService<T: Record, S: RecordStore<T>> {
    store: S,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Record, S: RecordStore<T>> RecordService<T, S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Validates and inserts a draft; returns a handle with the new id.
    pub fn create(&self, draft: &T::Draft) -> RecordServiceResult<Tracked<T>> {
        draft.validate().map_err(RecordServiceError::Validation)?;
        let handle = self.store.insert(draft)?;
        info!(
            "event=record_create module=service status=ok kind={} id={}",
            T::KIND,
            handle.id()
        );
        Ok(handle)
    }

    /// Reads one record. `Ok(None)` when no record exists for `id`.
    pub fn get(&self, id: Option<RecordId>) -> RecordServiceResult<Option<Tracked<T>>> {
        let id = check_identifier::<T>(id)?;
        Ok(self.store.get(id)?)
    }

    /// Lists all records ordered by id.
    pub fn list(&self) -> RecordServiceResult<Vec<T>> {
        Ok(self.store.list()?)
    }

    /// Applies a read-then-mutated handle to storage.
    ///
    /// # Contract
    /// Checks, in order:
    /// 1. `id` present and within range, else `InvalidIdentifier`.
    /// 2. `candidate` present, else `MissingPayload`.
    /// 3. embedded id and read id both equal `id`, else `IdentifierMismatch`.
    /// 4. field rules, else `Validation`.
    /// 5. record exists, else `NotFound`.
    ///
    /// Then commits; a revision that moved since the read yields `Conflict`.
    pub fn update(
        &self,
        id: Option<RecordId>,
        candidate: Option<Tracked<T>>,
    ) -> RecordServiceResult<()> {
        let result = self.apply_update(id, candidate);
        log_update_outcome::<T>(id, &result);
        result
    }

    /// Applies an update body at the wire boundary.
    ///
    /// Runs checks 1-4 on the body, then `NotFound`, then
    /// `UntrackedReplacement` when the body carries no revision, then
    /// `Conflict` when its revision is stale. The stored record is read into
    /// a handle, its fields replaced by the body's, and committed.
    pub fn update_from_payload<P>(
        &self,
        id: Option<RecordId>,
        payload: Option<P>,
    ) -> RecordServiceResult<()>
    where
        P: UpdatePayload<Target = T>,
    {
        let result = self.apply_payload(id, payload);
        log_update_outcome::<T>(id, &result);
        result
    }

    /// Deletes one record and returns its last stored value.
    pub fn delete(&self, id: Option<RecordId>) -> RecordServiceResult<T> {
        let id = check_identifier::<T>(id)?;
        let deleted = self.store.delete(id)?;
        info!(
            "event=record_delete module=service status=ok kind={} id={id}",
            T::KIND
        );
        Ok(deleted)
    }

    fn apply_update(
        &self,
        id: Option<RecordId>,
        candidate: Option<Tracked<T>>,
    ) -> RecordServiceResult<()> {
        let id = check_identifier::<T>(id)?;
        let candidate = candidate.ok_or(RecordServiceError::MissingPayload { kind: T::KIND })?;

        let embedded_id = candidate.record().id();
        if embedded_id != id || candidate.id() != id {
            let payload_id = if embedded_id != id {
                embedded_id
            } else {
                candidate.id()
            };
            return Err(RecordServiceError::IdentifierMismatch {
                kind: T::KIND,
                path_id: id,
                payload_id: Some(payload_id),
            });
        }

        candidate
            .validate()
            .map_err(RecordServiceError::Validation)?;

        if !self.store.exists(id)? {
            return Err(RecordServiceError::NotFound { kind: T::KIND, id });
        }

        self.store.commit(&candidate)?;
        Ok(())
    }

    fn apply_payload<P>(&self, id: Option<RecordId>, payload: Option<P>) -> RecordServiceResult<()>
    where
        P: UpdatePayload<Target = T>,
    {
        let id = check_identifier::<T>(id)?;
        let payload = payload.ok_or(RecordServiceError::MissingPayload { kind: T::KIND })?;

        let claimed_id = payload.claimed_id();
        if claimed_id != Some(id) {
            return Err(RecordServiceError::IdentifierMismatch {
                kind: T::KIND,
                path_id: id,
                payload_id: claimed_id,
            });
        }

        let revision = payload.revision();
        let candidate = payload
            .into_candidate(id)
            .map_err(RecordServiceError::Validation)?;
        candidate
            .validate()
            .map_err(RecordServiceError::Validation)?;

        let Some(mut handle) = self.store.get(id)? else {
            return Err(RecordServiceError::NotFound { kind: T::KIND, id });
        };
        let Some(revision) = revision else {
            return Err(RecordServiceError::UntrackedReplacement { kind: T::KIND, id });
        };
        if handle.revision() != revision {
            return Err(RecordServiceError::Conflict { kind: T::KIND, id });
        }

        handle.replace_fields(candidate);
        self.apply_update(Some(id), Some(handle))
    }
}

fn check_identifier<T: Record>(id: Option<RecordId>) -> RecordServiceResult<RecordId> {
    match id {
        Some(value) if (0..=T::ID_MAX).contains(&value) => Ok(value),
        other => Err(RecordServiceError::InvalidIdentifier {
            kind: T::KIND,
            value: other,
        }),
    }
}

fn log_update_outcome<T: Record>(id: Option<RecordId>, result: &RecordServiceResult<()>) {
    let id = id.map_or_else(|| "none".to_string(), |value| value.to_string());
    match result {
        Ok(()) => info!(
            "event=record_update module=service status=ok kind={} id={id}",
            T::KIND
        ),
        Err(err) if err.is_caller_error() => warn!(
            "event=record_update module=service status=rejected kind={} id={id} error_code={}",
            T::KIND,
            err.code()
        ),
        Err(err) => error!(
            "event=record_update module=service status=error kind={} id={id} error_code={} error={err}",
            T::KIND,
            err.code()
        ),
    }
}
