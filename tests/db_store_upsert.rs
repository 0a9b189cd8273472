use gradebookd::db::{self, with_tx};
use gradebookd::error::ServiceError;
use gradebookd::model::{GradeTarget, NewClass, Term};
use gradebookd::store::{classes, grades, students};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn open(prefix: &str) -> db::DbPool {
    let dir = temp_dir(prefix);
    db::open_pool(&dir.join("gradebook.sqlite3"), 2, Duration::from_secs(5)).expect("open pool")
}

fn new_class(conn: &rusqlite::Connection, name: &str) -> String {
    classes::create_class(
        conn,
        &NewClass {
            name: name.to_string(),
            value: None,
        },
    )
    .expect("create class")
}

#[test]
fn schema_init_is_idempotent() {
    let pool = open("gradebook-db-init");
    let conn = pool.get().expect("conn");
    db::init_schema(&conn).expect("second init");
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('classes', 'students', 'grades')",
            [],
            |r| r.get(0),
        )
        .expect("count tables");
    assert_eq!(tables, 3);
}

#[test]
fn upsert_returns_existing_student_for_same_name_and_class() {
    let pool = open("gradebook-db-upsert");
    let conn = pool.get().expect("conn");
    let class_a = new_class(&conn, "A");
    let class_b = new_class(&conn, "B");

    let (first, created) = students::upsert_student(&conn, "Ann", &class_a).expect("first");
    assert!(created);
    let (again, created) = students::upsert_student(&conn, "Ann", &class_a).expect("again");
    assert!(!created);
    assert_eq!(first, again);

    let (other, created) = students::upsert_student(&conn, "Ann", &class_b).expect("other class");
    assert!(created);
    assert_ne!(first, other);
}

#[test]
fn failed_transaction_leaves_nothing_behind() {
    let pool = open("gradebook-db-rollback");
    let mut conn = pool.get().expect("conn");
    let class_id = new_class(&conn, "A");
    let target = GradeTarget::parse("2024", "1", "1").expect("target");

    let res: Result<(), ServiceError> = with_tx(&mut conn, |tx| {
        grades::create_grade(tx, "Ann", &class_id, &target, Some(90.0))?;
        Err(ServiceError::validation("boom"))
    });
    assert!(res.is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .expect("count students");
    assert_eq!(count, 0);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM grades", [], |r| r.get(0))
        .expect("count grades");
    assert_eq!(count, 0);
}

#[test]
fn term_scores_come_back_in_recording_order() {
    let pool = open("gradebook-db-term-order");
    let mut conn = pool.get().expect("conn");
    let class_id = new_class(&conn, "A");
    for (exam, score) in [("2", 50.0), ("1", 60.0), ("2", 70.0)] {
        let target = GradeTarget::parse("2024", "2", exam).expect("target");
        with_tx(&mut conn, |tx| {
            grades::create_grade(tx, "Ann", &class_id, &target, Some(score))
        })
        .expect("create grade");
    }
    let (student_id, _) = students::upsert_student(&conn, "Ann", &class_id).expect("student");

    let term = Term::new("2024", "2").expect("term");
    let rows = grades::term_scores(&conn, &student_id, &term).expect("scores");
    let seen: Vec<_> = rows.iter().map(|r| (r.exam.as_str(), r.score)).collect();
    assert_eq!(seen, vec![("2", Some(50.0)), ("1", Some(60.0)), ("2", Some(70.0))]);
}

#[test]
fn concurrent_read_then_write_transactions_all_commit() {
    let dir = temp_dir("gradebook-db-concurrent");
    let pool = db::open_pool(&dir.join("gradebook.sqlite3"), 8, Duration::from_secs(5))
        .expect("open pool");
    let class_id = new_class(&pool.get().expect("conn"), "A");
    let target = GradeTarget::parse("2024", "1", "1").expect("target");

    let results: Vec<Result<(), ServiceError>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                let class_id = class_id.clone();
                let target = target.clone();
                s.spawn(move || -> Result<(), ServiceError> {
                    let mut conn = pool.get()?;
                    with_tx(&mut conn, |tx| {
                        classes::require_class(tx, &class_id)?;
                        std::thread::sleep(Duration::from_millis(20));
                        grades::create_grade(tx, &format!("S{}", i), &class_id, &target, Some(50.0))?;
                        Ok(())
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("writer thread"))
            .collect()
    });
    for res in &results {
        assert!(res.is_ok(), "writer failed: {:?}", res);
    }

    let conn = pool.get().expect("conn");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM grades", [], |r| r.get(0))
        .expect("count grades");
    assert_eq!(count, 8);
}
