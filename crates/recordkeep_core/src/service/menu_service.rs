//! Menu read use-cases spanning categories and menu items.
//!
//! # Invariants
//! - A category menu lists only that category's items, name-ordered.
//! - Disabled items are hidden unless explicitly requested.

use crate::model::category::Category;
use crate::model::menu_item::MenuItem;
use crate::model::record::{Record, RecordId, Tracked};
use crate::repo::menu_item_repo::MenuItemQueries;
use crate::repo::store::{RecordStore, StoreError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from menu use-cases.
#[derive(Debug)]
pub enum MenuServiceError {
    /// Identifier is negative or outside the category id range.
    InvalidCategoryId(RecordId),
    /// Target category does not exist.
    CategoryNotFound(RecordId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for MenuServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCategoryId(id) => write!(f, "invalid category identifier: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MenuServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for MenuServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One category with its menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMenu {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

/// Menu view facade over category and menu item stores.
pub struct MenuService<C, M>
where
    C: RecordStore<Category>,
    M: RecordStore<MenuItem> + MenuItemQueries,
{
    categories: C,
    items: M,
}

impl<C, M> MenuService<C, M>
where
    C: RecordStore<Category>,
    M: RecordStore<MenuItem> + MenuItemQueries,
{
    pub fn new(categories: C, items: M) -> Self {
        Self { categories, items }
    }

    /// Loads one category and its items.
    pub fn category_menu(
        &self,
        category_id: RecordId,
        include_disabled: bool,
    ) -> Result<CategoryMenu, MenuServiceError> {
        if !(0..=Category::ID_MAX).contains(&category_id) {
            return Err(MenuServiceError::InvalidCategoryId(category_id));
        }

        let category = self
            .categories
            .get(category_id)?
            .map(Tracked::into_record)
            .ok_or(MenuServiceError::CategoryNotFound(category_id))?;
        let items = self
            .items
            .list_for_category(category_id, include_disabled)?;

        Ok(CategoryMenu { category, items })
    }

    /// Loads every category with its items, ordered by category id.
    pub fn full_menu(&self, include_disabled: bool) -> Result<Vec<CategoryMenu>, MenuServiceError> {
        let categories = self.categories.list()?;
        let mut menus = Vec::with_capacity(categories.len());
        for category in categories {
            let items = self
                .items
                .list_for_category(category.category_id, include_disabled)?;
            menus.push(CategoryMenu { category, items });
        }
        Ok(menus)
    }
}
