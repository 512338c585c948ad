//! Menu item record.
//!
//! # Invariants
//! - `menu_item_name` is non-blank and at most 100 characters.
//! - `description` is at most 250 characters when present.
//! - `category_id` references an existing category (enforced by the store).

use crate::model::record::{
    optional_text, require_text, required, Draft, FieldError, Record, RecordId, Revision,
    UpdatePayload,
};
use serde::{Deserialize, Serialize};

pub const MENU_ITEM_NAME_MAX_CHARS: usize = 100;
pub const MENU_ITEM_DESCRIPTION_MAX_CHARS: usize = 250;

/// One orderable dish or drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub menu_item_id: RecordId,
    pub menu_item_name: String,
    pub description: Option<String>,
    pub is_enabled: bool,
    pub category_id: RecordId,
}

impl Record for MenuItem {
    const KIND: &'static str = "menu_item";
    const ID_MAX: RecordId = i32::MAX as RecordId;
    type Draft = NewMenuItem;

    fn id(&self) -> RecordId {
        self.menu_item_id
    }

    fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.menu_item_name, self.description.as_deref())
    }
}

/// Creation input for a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub menu_item_name: String,
    pub description: Option<String>,
    pub is_enabled: bool,
    pub category_id: RecordId,
}

impl NewMenuItem {
    /// Enabled item without description.
    pub fn new(category_id: RecordId, menu_item_name: impl Into<String>) -> Self {
        Self {
            menu_item_name: menu_item_name.into(),
            description: None,
            is_enabled: true,
            category_id,
        }
    }
}

impl Draft for NewMenuItem {
    fn validate(&self) -> Result<(), FieldError> {
        validate_fields(&self.menu_item_name, self.description.as_deref())
    }
}

/// Update body for `PUT /menu-items/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPayload {
    pub menu_item_id: Option<RecordId>,
    pub menu_item_name: Option<String>,
    pub description: Option<String>,
    pub is_enabled: Option<bool>,
    pub category_id: Option<RecordId>,
    pub revision: Option<Revision>,
}

impl UpdatePayload for MenuItemPayload {
    type Target = MenuItem;

    fn claimed_id(&self) -> Option<RecordId> {
        self.menu_item_id
    }

    fn revision(&self) -> Option<Revision> {
        self.revision
    }

    fn into_candidate(self, id: RecordId) -> Result<MenuItem, FieldError> {
        Ok(MenuItem {
            menu_item_id: id,
            menu_item_name: required("menuItemName", self.menu_item_name)?,
            description: self.description,
            is_enabled: required("isEnabled", self.is_enabled)?,
            category_id: required("categoryId", self.category_id)?,
        })
    }
}

fn validate_fields(name: &str, description: Option<&str>) -> Result<(), FieldError> {
    require_text("menuItemName", name, MENU_ITEM_NAME_MAX_CHARS)?;
    optional_text("description", description, MENU_ITEM_DESCRIPTION_MAX_CHARS)
}
