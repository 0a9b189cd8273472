use crate::error::ServiceResult;
use anyhow::Context;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn open_pool(db_path: &Path, max_size: u32, timeout: Duration) -> anyhow::Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }

    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;"));
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(timeout)
        .build(manager)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;

    let conn = pool.get().context("failed to check out a connection")?;
    init_schema(&conn).context("failed to create schema")?;
    Ok(pool)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            value TEXT
        )",
        [],
    )?;

    // (name, class_id) identifies a student for implicit creation.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            class_id TEXT,
            created_time TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id),
            UNIQUE(name, class_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_created ON students(created_time)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id TEXT PRIMARY KEY,
            score REAL,
            year TEXT NOT NULL,
            semester TEXT NOT NULL,
            exam TEXT NOT NULL,
            date TEXT NOT NULL,
            student_id TEXT NOT NULL,
            class_id TEXT,
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(class_id) REFERENCES classes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_student_term ON grades(student_id, year, semester)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_date ON grades(date)",
        [],
    )?;

    Ok(())
}

/// Runs `f` inside an immediate transaction, so the write lock is taken up
/// front and concurrent writers wait on `busy_timeout`. Commits on `Ok`; any
/// error drops the transaction, which rolls it back.
pub fn with_tx<T, F>(conn: &mut Connection, f: F) -> ServiceResult<T>
where
    F: FnOnce(&Transaction<'_>) -> ServiceResult<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = f(&tx)?;
    tx.commit()?;
    Ok(out)
}

/// UTC timestamp with fixed precision so text ordering matches time ordering.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
