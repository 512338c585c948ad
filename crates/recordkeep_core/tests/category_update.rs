use recordkeep_core::db::{open_db_in_memory, seed_demo_data};
use recordkeep_core::{
    Category, CategoryPayload, FieldErrorReason, NewCategory, RecordService, RecordServiceError,
    RecordStore, SqliteCategoryRepository, StoreError,
};
use rusqlite::Connection;

type CategoryService<'conn> = RecordService<Category, SqliteCategoryRepository<'conn>>;

fn seeded_connection() -> Connection {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    conn
}

fn service(conn: &Connection) -> CategoryService<'_> {
    RecordService::new(SqliteCategoryRepository::try_new(conn).unwrap())
}

fn stored_name(service: &CategoryService<'_>, id: i64) -> String {
    service
        .get(Some(id))
        .unwrap()
        .expect("category exists")
        .into_record()
        .category_name
}

#[test]
fn read_mutate_update_changes_stored_name() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut handle = service.get(Some(2)).unwrap().unwrap();
    assert_eq!(handle.category_name, "Main Course");
    handle.category_name = "Mains".to_string();

    service.update(Some(2), Some(handle)).unwrap();
    assert_eq!(stored_name(&service, 2), "Mains");
}

#[test]
fn read_then_update_without_changes_succeeds() {
    let conn = seeded_connection();
    let service = service(&conn);

    let handle = service.get(Some(1)).unwrap().unwrap();
    service.update(Some(1), Some(handle)).unwrap();
    assert_eq!(stored_name(&service, 1), "Starters");
}

#[test]
fn successful_update_stamps_new_revision() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut handle = service.get(Some(3)).unwrap().unwrap();
    let before = handle.revision();
    handle.category_name = "Sweets".to_string();
    service.update(Some(3), Some(handle)).unwrap();

    let after = service.get(Some(3)).unwrap().unwrap().revision();
    assert_ne!(before, after);
}

#[test]
fn missing_or_out_of_range_identifier_is_rejected() {
    let conn = seeded_connection();
    let service = service(&conn);

    for id in [None, Some(-1), Some(i64::from(i16::MAX) + 1)] {
        let handle = service.get(Some(1)).unwrap().unwrap();
        let err = service.update(id, Some(handle)).unwrap_err();
        assert!(
            matches!(err, RecordServiceError::InvalidIdentifier { value, .. } if value == id),
            "unexpected error for {id:?}: {err}"
        );
    }
    assert_eq!(stored_name(&service, 1), "Starters");
}

#[test]
fn missing_payload_is_rejected() {
    let conn = seeded_connection();
    let service = service(&conn);

    let err = service.update(Some(2), None).unwrap_err();
    assert!(matches!(err, RecordServiceError::MissingPayload { kind: "category" }));
}

#[test]
fn handle_for_other_record_is_identifier_mismatch() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut handle = service.get(Some(1)).unwrap().unwrap();
    handle.category_name = "Renamed".to_string();
    let err = service.update(Some(2), Some(handle)).unwrap_err();

    match err {
        RecordServiceError::IdentifierMismatch {
            path_id,
            payload_id,
            ..
        } => {
            assert_eq!(path_id, 2);
            assert_eq!(payload_id, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(stored_name(&service, 1), "Starters");
    assert_eq!(stored_name(&service, 2), "Main Course");
}

#[test]
fn editing_embedded_id_is_identifier_mismatch() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut handle = service.get(Some(2)).unwrap().unwrap();
    handle.category_id = 3;
    let err = service.update(Some(2), Some(handle)).unwrap_err();
    assert!(matches!(
        err,
        RecordServiceError::IdentifierMismatch {
            path_id: 2,
            payload_id: Some(3),
            ..
        }
    ));
}

#[test]
fn blank_or_long_name_is_validation_error_and_store_unchanged() {
    let conn = seeded_connection();
    let service = service(&conn);

    let cases = [
        (String::new(), FieldErrorReason::Blank),
        ("   ".to_string(), FieldErrorReason::Blank),
        (
            "x".repeat(51),
            FieldErrorReason::TooLong {
                max: 50,
                actual: 51,
            },
        ),
    ];
    for (name, expected_reason) in cases {
        let mut handle = service.get(Some(2)).unwrap().unwrap();
        handle.category_name = name;
        let err = service.update(Some(2), Some(handle)).unwrap_err();
        match err {
            RecordServiceError::Validation(field_error) => {
                assert_eq!(field_error.field, "categoryName");
                assert_eq!(field_error.reason, expected_reason);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(stored_name(&service, 2), "Main Course");
}

#[test]
fn update_after_delete_is_not_found() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut handle = service.get(Some(4)).unwrap().unwrap();
    service.delete(Some(4)).unwrap();
    handle.category_name = "Drinks".to_string();

    let err = service.update(Some(4), Some(handle)).unwrap_err();
    assert!(matches!(
        err,
        RecordServiceError::NotFound {
            kind: "category",
            id: 4
        }
    ));
    assert!(service.get(Some(4)).unwrap().is_none());
}

#[test]
fn stale_handle_is_conflict_and_keeps_first_write() {
    let conn = seeded_connection();
    let service = service(&conn);

    let mut first = service.get(Some(2)).unwrap().unwrap();
    let mut second = service.get(Some(2)).unwrap().unwrap();

    first.category_name = "Mains".to_string();
    service.update(Some(2), Some(first)).unwrap();

    second.category_name = "Entrees".to_string();
    let err = service.update(Some(2), Some(second)).unwrap_err();
    assert!(matches!(err, RecordServiceError::Conflict { id: 2, .. }));
    assert_eq!(stored_name(&service, 2), "Mains");
}

#[test]
fn applying_same_change_twice_yields_same_state() {
    let conn = seeded_connection();
    let service = service(&conn);

    for _ in 0..2 {
        let mut handle = service.get(Some(1)).unwrap().unwrap();
        handle.category_name = "Small Plates".to_string();
        service.update(Some(1), Some(handle)).unwrap();
    }

    assert_eq!(stored_name(&service, 1), "Small Plates");
    let names: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|category| category.category_name)
        .collect();
    assert_eq!(names, ["Small Plates", "Main Course", "Desserts", "Beverages"]);
}

#[test]
fn fresh_payload_without_revision_is_untracked_replacement() {
    let conn = seeded_connection();
    let service = service(&conn);

    let payload = CategoryPayload {
        category_id: Some(2),
        category_name: Some("Z".to_string()),
        revision: None,
    };
    let err = service
        .update_from_payload(Some(2), Some(payload))
        .unwrap_err();
    assert!(matches!(
        err,
        RecordServiceError::UntrackedReplacement { id: 2, .. }
    ));
    assert_eq!(stored_name(&service, 2), "Main Course");
}

#[test]
fn payload_for_missing_record_is_not_found_even_without_revision() {
    let conn = seeded_connection();
    let service = service(&conn);

    let payload = CategoryPayload {
        category_id: Some(99),
        category_name: Some("Ghost".to_string()),
        revision: None,
    };
    let err = service
        .update_from_payload(Some(99), Some(payload))
        .unwrap_err();
    assert!(matches!(err, RecordServiceError::NotFound { id: 99, .. }));
}

#[test]
fn round_tripped_payload_updates_and_stale_one_conflicts() {
    let conn = seeded_connection();
    let service = service(&conn);

    let revision = service.get(Some(2)).unwrap().unwrap().revision();
    let payload = CategoryPayload {
        category_id: Some(2),
        category_name: Some("Y".to_string()),
        revision: Some(revision),
    };
    service
        .update_from_payload(Some(2), Some(payload.clone()))
        .unwrap();
    assert_eq!(stored_name(&service, 2), "Y");

    let err = service
        .update_from_payload(Some(2), Some(payload))
        .unwrap_err();
    assert!(matches!(err, RecordServiceError::Conflict { id: 2, .. }));
}

#[test]
fn store_commit_reports_conflict_with_both_revisions() {
    let conn = seeded_connection();
    let store = SqliteCategoryRepository::try_new(&conn).unwrap();

    let stale = store.get(1).unwrap().unwrap();
    let mut fresh = store.get(1).unwrap().unwrap();
    fresh.category_name = "Appetizers".to_string();
    let written = store.commit(&fresh).unwrap();

    match store.commit(&stale).unwrap_err() {
        StoreError::Conflict {
            id,
            expected,
            actual,
            ..
        } => {
            assert_eq!(id, 1);
            assert_eq!(expected, stale.revision());
            assert_eq!(actual, written);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_then_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create(&NewCategory::new("Specials")).unwrap();
    assert_eq!(created.category_name, "Specials");
    let id = created.id();

    let deleted = service.delete(Some(id)).unwrap();
    assert_eq!(deleted.category_name, "Specials");
    assert!(service.get(Some(id)).unwrap().is_none());

    let err = service.delete(Some(id)).unwrap_err();
    assert!(matches!(err, RecordServiceError::NotFound { .. }));
}

#[test]
fn create_past_smallint_range_fails_and_leaves_no_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO categories (category_id, category_name, revision)
         VALUES (32767, 'Last Slot', '6f1c1d2e-9a4b-4c3d-8e5f-0a1b2c3d4e5f');",
        [],
    )
    .unwrap();
    let service = service(&conn);

    let err = service.create(&NewCategory::new("Overflow")).unwrap_err();
    assert_eq!(err.code(), "IDENTIFIER_EXHAUSTED");
    assert!(!err.is_caller_error());
    assert!(matches!(
        err,
        RecordServiceError::Storage(StoreError::IdentifierExhausted {
            kind: "category",
            id: 32768,
            max: 32767,
        })
    ));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    let names: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|category| category.category_name)
        .collect();
    assert_eq!(names, ["Last Slot"]);
}

#[test]
fn create_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create(&NewCategory::new("  ")).unwrap_err();
    assert!(matches!(err, RecordServiceError::Validation(_)));
    assert!(service.list().unwrap().is_empty());
}
