use recordkeep_core::db::{open_db_in_memory, seed_demo_data};
use recordkeep_core::{
    NewTodoItem, RecordStore, SqliteTodoRepository, StoreError, TodoBoardQuery, TodoListQuery,
    TodoPriority, TodoQueries, TodoService, TodoStatus,
};
use rusqlite::Connection;

fn seeded_connection() -> Connection {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    conn
}

fn titles(items: &[recordkeep_core::TodoItem]) -> Vec<&str> {
    items.iter().map(|item| item.title.as_str()).collect()
}

#[test]
fn search_orders_by_priority_then_id() {
    let conn = seeded_connection();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let mut draft = NewTodoItem::new("Call linen supplier");
    draft.priority = TodoPriority::High;
    repo.insert(&draft).unwrap();

    let items = repo.search(&TodoListQuery::default()).unwrap();
    assert_eq!(
        titles(&items),
        [
            "Order weekly produce",
            "Call linen supplier",
            "Print new dessert menu",
            "Service espresso machine",
        ]
    );
}

#[test]
fn search_filters_combine() {
    let conn = seeded_connection();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let mut draft = NewTodoItem::new("Order napkins");
    draft.priority = TodoPriority::Low;
    repo.insert(&draft).unwrap();

    let by_title = repo
        .search(&TodoListQuery {
            title_contains: Some("ORDER".to_string()),
            ..TodoListQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&by_title), ["Order weekly produce", "Order napkins"]);

    let pending_low = repo
        .search(&TodoListQuery {
            status: Some(TodoStatus::Pending),
            priority: Some(TodoPriority::Low),
            title_contains: Some("order".to_string()),
        })
        .unwrap();
    assert_eq!(titles(&pending_low), ["Order napkins"]);
}

#[test]
fn board_reports_only_present_filter_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let mut draft = NewTodoItem::new("Deep clean fryer");
    draft.status = TodoStatus::InProgress;
    draft.priority = TodoPriority::High;
    repo.insert(&draft).unwrap();
    repo.insert(&NewTodoItem::new("Update allergen sheet")).unwrap();

    let board = TodoService::new(repo)
        .board(TodoBoardQuery::default())
        .unwrap();
    assert_eq!(board.items.len(), 2);
    assert_eq!(
        board.statuses,
        [TodoStatus::Pending, TodoStatus::InProgress]
    );
    assert_eq!(
        board.priorities,
        [TodoPriority::Medium, TodoPriority::High]
    );
}

#[test]
fn board_normalizes_blank_search() {
    let conn = seeded_connection();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

    let board = service
        .board(TodoBoardQuery {
            status: Some(TodoStatus::Completed),
            priority: None,
            search: Some("   ".to_string()),
        })
        .unwrap();
    assert_eq!(board.query.search, None);
    assert_eq!(titles(&board.items), ["Service espresso machine"]);
}

#[test]
fn invalid_persisted_status_is_reported() {
    let conn = seeded_connection();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE todo_items SET status = 'archived' WHERE todo_id = 1;",
    )
    .unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo.get(1).unwrap_err();
    assert!(err.to_string().contains("archived"));
}

#[test]
fn insert_past_integer_range_is_rolled_back() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO todo_items (todo_id, title, status, priority, revision)
         VALUES (2147483647, 'Final task', 'pending', 'low',
                 '0b7e2f4a-3c1d-4e8f-9a6b-5d4c3b2a1f0e');",
        [],
    )
    .unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo.insert(&NewTodoItem::new("One too many")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::IdentifierExhausted {
            kind: "todo_item",
            id: 2147483648,
            ..
        }
    ));
    assert_eq!(titles(&repo.list().unwrap()), ["Final task"]);
}
