//! Framework-agnostic HTTP mapping for record use-cases.
//!
//! # Responsibility
//! - Map service results to status codes and JSON bodies.
//! - Keep error bodies machine-readable (`code`, `message`, `details`).
//!
//! # Invariants
//! - Successful updates answer `204` with no body.
//! - Storage failures other than broken references answer `500`.
//!
//! A web framework adapter only needs to forward the path id and the raw
//! body, then copy `status` and `body` onto its response type.

use crate::model::record::{
    FieldError, FieldErrorReason, Record, RecordId, TrackedView, UpdatePayload,
};
use crate::repo::store::RecordStore;
use crate::service::record_service::{RecordService, RecordServiceError};
use serde::Serialize;
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_PRECONDITION_REQUIRED: u16 = 428;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
        }
    }

    fn json<V: Serialize>(status: u16, value: &V) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => Self::error(
                STATUS_INTERNAL_SERVER_ERROR,
                ApiError::new("SERIALIZATION_ERROR", err.to_string()),
            ),
        }
    }

    fn error(status: u16, error: ApiError) -> Self {
        let mut body = json!({
            "code": error.code,
            "message": error.message,
        });
        if let (Some(details), Value::Object(map)) = (error.details, &mut body) {
            map.insert("details".to_string(), details);
        }
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&RecordServiceError> for ApiError {
    fn from(err: &RecordServiceError) -> Self {
        let error = ApiError::new(err.code(), err.to_string());
        match err {
            RecordServiceError::Validation(field_error) => {
                error.with_details(field_error_details(field_error))
            }
            RecordServiceError::IdentifierMismatch {
                path_id,
                payload_id,
                ..
            } => error.with_details(json!({ "pathId": path_id, "payloadId": payload_id })),
            RecordServiceError::NotFound { id, .. }
            | RecordServiceError::UntrackedReplacement { id, .. }
            | RecordServiceError::Conflict { id, .. } => error.with_details(json!({ "id": id })),
            _ => error,
        }
    }
}

/// Status code for a service error.
pub fn status_for(err: &RecordServiceError) -> u16 {
    match err {
        RecordServiceError::InvalidIdentifier { .. }
        | RecordServiceError::MissingPayload { .. }
        | RecordServiceError::IdentifierMismatch { .. }
        | RecordServiceError::Validation(_) => STATUS_BAD_REQUEST,
        RecordServiceError::NotFound { .. } => STATUS_NOT_FOUND,
        RecordServiceError::UntrackedReplacement { .. } => STATUS_PRECONDITION_REQUIRED,
        RecordServiceError::Conflict { .. } => STATUS_CONFLICT,
        RecordServiceError::Storage(_) if err.is_caller_error() => STATUS_BAD_REQUEST,
        RecordServiceError::Storage(_) => STATUS_INTERNAL_SERVER_ERROR,
    }
}

fn service_error(err: &RecordServiceError) -> ApiResponse {
    ApiResponse::error(status_for(err), ApiError::from(err))
}

fn field_error_details(err: &FieldError) -> Value {
    match &err.reason {
        FieldErrorReason::Required => json!({ "field": err.field, "reason": "required" }),
        FieldErrorReason::Blank => json!({ "field": err.field, "reason": "blank" }),
        FieldErrorReason::TooLong { max, actual } => json!({
            "field": err.field,
            "reason": "too_long",
            "max": max,
            "actual": actual,
        }),
        FieldErrorReason::UnknownValue(value) => json!({
            "field": err.field,
            "reason": "unknown_value",
            "value": value,
        }),
    }
}

/// `GET /{resource}/{id}`: `200` with fields and `revision`, or `404`.
pub fn get_record<T, S>(service: &RecordService<T, S>, id: Option<RecordId>) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
{
    match service.get(id) {
        Ok(Some(handle)) => ApiResponse::json(STATUS_OK, &TrackedView::from(&handle)),
        Ok(None) => {
            let id = id.unwrap_or_default();
            service_error(&RecordServiceError::NotFound { kind: T::KIND, id })
        }
        Err(err) => service_error(&err),
    }
}

/// `GET /{resource}`: `200` with every record.
pub fn list_records<T, S>(service: &RecordService<T, S>) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
{
    match service.list() {
        Ok(records) => ApiResponse::json(STATUS_OK, &records),
        Err(err) => service_error(&err),
    }
}

/// `POST /{resource}`: `201` with fields and `revision`.
pub fn post_record<T, S>(service: &RecordService<T, S>, draft: Option<T::Draft>) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
{
    let Some(draft) = draft else {
        return service_error(&RecordServiceError::MissingPayload { kind: T::KIND });
    };
    match service.create(&draft) {
        Ok(handle) => ApiResponse::json(STATUS_CREATED, &TrackedView::from(&handle)),
        Err(err) => service_error(&err),
    }
}

/// `PUT /{resource}/{id}` with a typed body: `204` on success.
pub fn put_record<T, S, P>(
    service: &RecordService<T, S>,
    id: Option<RecordId>,
    payload: Option<P>,
) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
    P: UpdatePayload<Target = T>,
{
    match service.update_from_payload(id, payload) {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => service_error(&err),
    }
}

/// `PUT /{resource}/{id}` with a raw JSON body. A `null` body is a missing
/// payload; unparsable JSON answers `400 MALFORMED_BODY`.
pub fn put_record_json<T, S, P>(
    service: &RecordService<T, S>,
    id: Option<RecordId>,
    raw_body: &str,
) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
    P: UpdatePayload<Target = T>,
{
    match serde_json::from_str::<Option<P>>(raw_body) {
        Ok(payload) => put_record(service, id, payload),
        Err(err) => ApiResponse::error(
            STATUS_BAD_REQUEST,
            ApiError::new("MALFORMED_BODY", format!("request body is not valid JSON: {err}")),
        ),
    }
}

/// `DELETE /{resource}/{id}`: `200` with the deleted record.
pub fn delete_record<T, S>(service: &RecordService<T, S>, id: Option<RecordId>) -> ApiResponse
where
    T: Record,
    S: RecordStore<T>,
{
    match service.delete(id) {
        Ok(record) => ApiResponse::json(STATUS_OK, &record),
        Err(err) => service_error(&err),
    }
}
