use recordkeep_core::db::{open_db_in_memory, seed_demo_data};
use recordkeep_core::{
    Category, MenuItem, MenuItemQueries, MenuService, MenuServiceError, NewCategory, NewMenuItem,
    RecordService, RecordServiceError, RecordStore, SqliteCategoryRepository,
    SqliteMenuItemRepository, StoreError,
};
use rusqlite::Connection;

fn seeded_connection() -> Connection {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    conn
}

fn menu_service(
    conn: &Connection,
) -> MenuService<SqliteCategoryRepository<'_>, SqliteMenuItemRepository<'_>> {
    MenuService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteMenuItemRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn insert_requires_existing_category() {
    let conn = seeded_connection();
    let repo = SqliteMenuItemRepository::try_new(&conn).unwrap();

    let err = repo.insert(&NewMenuItem::new(40, "Orphan")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingReference {
            kind: "category",
            field: "categoryId",
            id: 40,
        }
    ));
    assert_eq!(repo.list().unwrap().len(), 6);
}

#[test]
fn insert_round_trips_optional_description() {
    let conn = seeded_connection();
    let repo = SqliteMenuItemRepository::try_new(&conn).unwrap();

    let mut draft = NewMenuItem::new(3, "Panna Cotta");
    draft.description = Some("Vanilla bean, berry coulis".to_string());
    let created = repo.insert(&draft).unwrap();

    let loaded = repo.get(created.id()).unwrap().unwrap();
    assert_eq!(loaded.menu_item_name, "Panna Cotta");
    assert_eq!(
        loaded.description.as_deref(),
        Some("Vanilla bean, berry coulis")
    );
    assert!(loaded.is_enabled);
    assert_eq!(loaded.category_id, 3);
    assert_eq!(loaded.revision(), created.revision());
}

#[test]
fn service_update_reports_invalid_reference() {
    let conn = seeded_connection();
    let service =
        RecordService::<MenuItem, _>::new(SqliteMenuItemRepository::try_new(&conn).unwrap());

    let mut handle = service.get(Some(2)).unwrap().unwrap();
    handle.category_id = 12;
    let err = service.update(Some(2), Some(handle)).unwrap_err();

    assert_eq!(err.code(), "INVALID_REFERENCE");
    assert!(err.is_caller_error());
    assert!(matches!(
        err,
        RecordServiceError::Storage(StoreError::MissingReference { id: 12, .. })
    ));
    let stored = service.get(Some(2)).unwrap().unwrap();
    assert_eq!(stored.category_id, 1);
}

#[test]
fn description_over_limit_is_rejected() {
    let conn = seeded_connection();
    let service =
        RecordService::<MenuItem, _>::new(SqliteMenuItemRepository::try_new(&conn).unwrap());

    let mut handle = service.get(Some(1)).unwrap().unwrap();
    handle.description = Some("d".repeat(251));
    let err = service.update(Some(1), Some(handle)).unwrap_err();
    match err {
        RecordServiceError::Validation(field_error) => {
            assert_eq!(field_error.field, "description");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn category_menu_hides_disabled_items_by_default() {
    let conn = seeded_connection();
    let menu = menu_service(&conn);

    let enabled = menu.category_menu(2, false).unwrap();
    assert_eq!(enabled.category.category_name, "Main Course");
    let names: Vec<&str> = enabled
        .items
        .iter()
        .map(|item| item.menu_item_name.as_str())
        .collect();
    assert_eq!(names, ["Mushroom Risotto"]);

    let all = menu.category_menu(2, true).unwrap();
    let names: Vec<&str> = all
        .items
        .iter()
        .map(|item| item.menu_item_name.as_str())
        .collect();
    assert_eq!(names, ["Grilled Salmon", "Mushroom Risotto"]);
}

#[test]
fn category_menu_rejects_bad_or_missing_category() {
    let conn = seeded_connection();
    let menu = menu_service(&conn);

    assert!(matches!(
        menu.category_menu(-1, false),
        Err(MenuServiceError::InvalidCategoryId(-1))
    ));
    assert!(matches!(
        menu.category_menu(55, false),
        Err(MenuServiceError::CategoryNotFound(55))
    ));
}

#[test]
fn full_menu_groups_items_by_category() {
    let conn = seeded_connection();
    let menu = menu_service(&conn);

    let groups = menu.full_menu(false).unwrap();
    let shape: Vec<(&str, usize)> = groups
        .iter()
        .map(|group| (group.category.category_name.as_str(), group.items.len()))
        .collect();
    assert_eq!(
        shape,
        [
            ("Starters", 2),
            ("Main Course", 1),
            ("Desserts", 1),
            ("Beverages", 1),
        ]
    );
}

#[test]
fn deleting_category_cascades_to_items() {
    let conn = seeded_connection();
    let categories =
        RecordService::<Category, _>::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    let items = SqliteMenuItemRepository::try_new(&conn).unwrap();

    let created = categories.create(&NewCategory::new("Brunch")).unwrap();
    let category_id = created.id();
    items
        .insert(&NewMenuItem::new(category_id, "Shakshuka"))
        .unwrap();
    items
        .insert(&NewMenuItem::new(category_id, "Pancakes"))
        .unwrap();
    assert_eq!(items.list_for_category(category_id, true).unwrap().len(), 2);

    categories.delete(Some(category_id)).unwrap();
    assert!(items.list_for_category(category_id, true).unwrap().is_empty());
    assert_eq!(items.list().unwrap().len(), 6);
}
