//! Menu category record.
//!
//! # Invariants
//! - `category_id` fits the `smallint` identity column.
//! - `category_name` is non-blank and at most 50 characters.

use crate::model::record::{
    require_text, required, Draft, FieldError, Record, RecordId, Revision, UpdatePayload,
};
use serde::{Deserialize, Serialize};

pub const CATEGORY_NAME_MAX_CHARS: usize = 50;

/// Menu category grouping menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: RecordId,
    pub category_name: String,
}

impl Record for Category {
    const KIND: &'static str = "category";
    const ID_MAX: RecordId = i16::MAX as RecordId;
    type Draft = NewCategory;

    fn id(&self) -> RecordId {
        self.category_id
    }

    fn validate(&self) -> Result<(), FieldError> {
        require_text("categoryName", &self.category_name, CATEGORY_NAME_MAX_CHARS)
    }
}

/// Creation input for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub category_name: String,
}

impl NewCategory {
    pub fn new(category_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
        }
    }
}

impl Draft for NewCategory {
    fn validate(&self) -> Result<(), FieldError> {
        require_text("categoryName", &self.category_name, CATEGORY_NAME_MAX_CHARS)
    }
}

/// Update body for `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub category_id: Option<RecordId>,
    pub category_name: Option<String>,
    pub revision: Option<Revision>,
}

impl UpdatePayload for CategoryPayload {
    type Target = Category;

    fn claimed_id(&self) -> Option<RecordId> {
        self.category_id
    }

    fn revision(&self) -> Option<Revision> {
        self.revision
    }

    fn into_candidate(self, id: RecordId) -> Result<Category, FieldError> {
        Ok(Category {
            category_id: id,
            category_name: required("categoryName", self.category_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryPayload, NewCategory, CATEGORY_NAME_MAX_CHARS};
    use crate::model::record::{Draft, FieldErrorReason, Record, UpdatePayload};

    #[test]
    fn category_name_length_is_bounded() {
        let at_limit = Category {
            category_id: 1,
            category_name: "x".repeat(CATEGORY_NAME_MAX_CHARS),
        };
        at_limit.validate().expect("limit length is valid");

        let over = Category {
            category_id: 1,
            category_name: "x".repeat(CATEGORY_NAME_MAX_CHARS + 1),
        };
        let err = over.validate().expect_err("over limit must fail");
        assert_eq!(err.field, "categoryName");
        assert!(matches!(err.reason, FieldErrorReason::TooLong { max: 50, .. }));
    }

    #[test]
    fn draft_rejects_empty_name() {
        let err = NewCategory::new("").validate().expect_err("empty must fail");
        assert_eq!(err.reason, FieldErrorReason::Blank);
    }

    #[test]
    fn payload_without_name_reports_required_field() {
        let payload = CategoryPayload {
            category_id: Some(2),
            ..CategoryPayload::default()
        };
        let err = payload.into_candidate(2).expect_err("missing name must fail");
        assert_eq!(err.reason, FieldErrorReason::Required);
    }

    #[test]
    fn payload_deserializes_camel_case_body() {
        let payload: CategoryPayload =
            serde_json::from_str(r#"{"categoryId":2,"categoryName":"Soups"}"#)
                .expect("body parses");
        assert_eq!(payload.claimed_id(), Some(2));
        assert!(payload.revision().is_none());
    }
}
