//! Integration tests for filtered, paginated queries.

use galaxy::db::Database;
use galaxy::db::query::{
    Attachment, Condition, EXCLUDE_DELETED_KEY, FilterValue, JsonPathQuery, Pagination,
    QueryError, Range, TIME_RANGE_KEY,
};
use galaxy::types::{SchedulingRecord, Task, TaskConfig, TaskStatus};
use serde_json::json;

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn seed_tasks(db: &Database, n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| {
            let mut task = Task {
                name: format!("task{}", i),
                code: format!("code{}", i),
                timeout: i as i64,
                status: Some(if i % 2 == 0 {
                    TaskStatus::Enabled
                } else {
                    TaskStatus::Pending
                }),
                ..Default::default()
            };
            db.create_task(&mut task).expect("Failed to create task");
            task
        })
        .collect()
}

#[test]
fn filter_by_code_finds_single_task() {
    let db = setup_db();
    seed_tasks(&db, 10);

    let pagination = Pagination::new()
        .with("code", "code5")
        .with(TIME_RANGE_KEY, Range::default())
        .with(EXCLUDE_DELETED_KEY, true);
    let page = db.paginate_tasks(&pagination).unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].code, "code5");
    assert_eq!(page.page, 1);
    assert_eq!(page.total_page, 1);
}

#[test]
fn pages_are_windows_in_id_order() {
    let db = setup_db();
    let tasks = seed_tasks(&db, 25);

    let page = db
        .paginate_tasks(&Pagination::new().with_page(3).with_page_size(10))
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.total_page, 3);
    let ids: Vec<u64> = page.data.iter().map(|t| t.id).collect();
    let expected: Vec<u64> = tasks[20..].iter().map(|t| t.id).collect();
    assert_eq!(ids, expected);

    let page = db
        .paginate_tasks(&Pagination::new().with_page(9).with_page_size(10))
        .unwrap();
    assert_eq!(page.total, 25);
    assert!(page.data.is_empty());
}

#[test]
fn exact_multiple_still_reports_an_extra_page() {
    let db = setup_db();
    seed_tasks(&db, 20);

    let page = db
        .paginate_tasks(&Pagination::new().with_page_size(10))
        .unwrap();
    assert_eq!(page.total, 20);
    assert_eq!(page.total_page, 3);
}

#[test]
fn oversized_page_size_is_capped() {
    let db = setup_db();
    seed_tasks(&db, 120);

    let page = db
        .paginate_tasks(&Pagination::new().with_page_size(500))
        .unwrap();
    assert_eq!(page.data.len(), 100);
    assert_eq!(page.total, 120);
    assert_eq!(page.total_page, 2);
}

#[test]
fn collection_filter_matches_members() {
    let db = setup_db();
    seed_tasks(&db, 10);

    let page = db
        .paginate_tasks(
            &Pagination::new().with("code", FilterValue::any_of(["code1", "code3", "missing"])),
        )
        .unwrap();
    let codes: Vec<&str> = page.data.iter().map(|t| t.code.as_str()).collect();
    assert_eq!(codes, vec!["code1", "code3"]);

    let page = db
        .paginate_tasks(&Pagination::new().with("status", FilterValue::any_of(["PENDING"])))
        .unwrap();
    assert_eq!(page.total, 5);
    assert!(page.data.iter().all(|t| t.status == Some(TaskStatus::Pending)));

    let page = db
        .paginate_tasks(&Pagination::new().with("code", FilterValue::any_of(Vec::<String>::new())))
        .unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn range_filter_is_inclusive() {
    let db = setup_db();
    seed_tasks(&db, 10);

    let page = db
        .paginate_tasks(&Pagination::new().with("timeout", Range::new(3, 6).unwrap()))
        .unwrap();
    let timeouts: Vec<i64> = page.data.iter().map(|t| t.timeout).collect();
    assert_eq!(timeouts, vec![3, 4, 5, 6]);

    let mut attachment = Attachment::new();
    attachment.insert(
        "timeout".to_string(),
        FilterValue::between(Range::new(8, 8).unwrap()),
    );
    attachment.insert("code".to_string(), FilterValue::eq("code8"));
    let page = db
        .paginate_tasks(&Pagination::new().with_attachment(attachment))
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].timeout, 8);
}

#[test]
fn time_range_limits_created_at() {
    let db = setup_db();
    let tasks = seed_tasks(&db, 5);

    let page = db
        .paginate_tasks(&Pagination::new().with(TIME_RANGE_KEY, Range::new(0, 1).unwrap()))
        .unwrap();
    assert_eq!(page.total, 0);

    let first = tasks[0].audit.created_at;
    let last = tasks[4].audit.created_at;
    let page = db
        .paginate_tasks(&Pagination::new().with(TIME_RANGE_KEY, Range::new(first, last).unwrap()))
        .unwrap();
    assert_eq!(page.total, 5);
}

#[test]
fn soft_deleted_rows_are_excluded_only_on_request() {
    let db = setup_db();
    let tasks = seed_tasks(&db, 4);
    db.soft_delete_task(tasks[1].id).unwrap();

    let all = db.paginate_tasks(&Pagination::new()).unwrap();
    assert_eq!(all.total, 4);

    let live = db
        .paginate_tasks(&Pagination::new().with(EXCLUDE_DELETED_KEY, true))
        .unwrap();
    assert_eq!(live.total, 3);
    assert!(live.data.iter().all(|t| t.id != tasks[1].id));

    let explicit_false = db
        .paginate_tasks(&Pagination::new().with(EXCLUDE_DELETED_KEY, false))
        .unwrap();
    assert_eq!(explicit_false.total, 4);
}

#[test]
fn unknown_filter_column_is_rejected() {
    let db = setup_db();
    seed_tasks(&db, 1);

    let err = db
        .paginate_tasks(&Pagination::new().with("priority", 1_i64))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<QueryError>(),
        Some(&QueryError::UnknownColumn("priority".into()))
    );
}

#[test]
fn mistyped_reserved_key_is_rejected() {
    let db = setup_db();
    let err = db
        .paginate_tasks(&Pagination::new().with(EXCLUDE_DELETED_KEY, "yes"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QueryError>(),
        Some(QueryError::ReservedKeyType { .. })
    ));
}

fn seed_configs(db: &Database) {
    for i in 0..15 {
        let mut config = TaskConfig {
            headers: json!({"info": {"age": i}}),
            content: json!({"name": format!("config{}", i)}),
            ..Default::default()
        };
        db.create_task_config(&mut config)
            .expect("Failed to create task config");
    }
}

#[test]
fn two_level_json_query_matches_one_row() {
    let db = setup_db();
    seed_configs(&db);

    let query = JsonPathQuery::level2("headers", "info", "age", 14_i64).unwrap();
    let configs = db.query_task_configs(query).unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].headers, json!({"info": {"age": 14}}));
}

#[test]
fn one_level_json_query_through_pagination() {
    let db = setup_db();
    seed_configs(&db);

    let query = JsonPathQuery::level1("content", "name", "config3").unwrap();
    let page = db
        .paginate_task_configs(&Pagination::new().with("name", query))
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].content, json!({"name": "config3"}));
}

#[test]
fn json_query_on_plain_column_is_rejected() {
    let db = setup_db();
    seed_tasks(&db, 1);

    let query = JsonPathQuery::level1("code", "x", 1_i64).unwrap();
    let err = db
        .paginate_tasks(&Pagination::new().with("x", query))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<QueryError>(),
        Some(&QueryError::NotJsonColumn("code".into()))
    );
}

#[test]
fn find_and_count_share_conditions() {
    let db = setup_db();
    for task_id in [1_u64, 1, 2] {
        let mut record = SchedulingRecord {
            task_id,
            ..Default::default()
        };
        db.create_scheduling_record(&mut record).unwrap();
    }

    let condition = Pagination::new()
        .with("task_id", 1_u64)
        .build_condition()
        .unwrap();
    assert_eq!(db.count_where::<SchedulingRecord>(&condition).unwrap(), 2);
    assert_eq!(db.find_scheduling_records(&condition).unwrap().len(), 2);

    assert_eq!(
        db.count_where::<SchedulingRecord>(&Condition::default())
            .unwrap(),
        3
    );
}
