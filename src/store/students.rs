use super::{is_unique_violation, Filters};
use crate::db::now_timestamp;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{Page, PageRequest, StudentRow};
use crate::store::classes::require_class;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub class_id: Option<String>,
    pub name: Option<String>,
}

pub fn list_students(
    conn: &Connection,
    filter: &StudentFilter,
    page: PageRequest,
) -> ServiceResult<Page<StudentRow>> {
    let mut filters = Filters::default();
    filters.push("s.class_id = ?", filter.class_id.as_deref());
    filters.push("instr(lower(s.name), lower(?)) > 0", filter.name.as_deref());
    let where_sql = filters.where_sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM students s {}", where_sql),
        params_from_iter(filters.values()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT s.id, s.name, c.name, c.id
         FROM students s
         LEFT JOIN classes c ON c.id = s.class_id
         {}
         ORDER BY s.created_time DESC, s.rowid DESC
         LIMIT ? OFFSET ?",
        where_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params_from_iter(filters.values_with_page(page.limit(), page.offset())),
            |row| {
                Ok(StudentRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    class_name: row.get(2)?,
                    class_id: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(page.wrap(rows, total))
}

pub fn student_exists(conn: &Connection, student_id: &str) -> ServiceResult<bool> {
    let hit: Option<i64> = conn
        .query_row("SELECT 1 FROM students WHERE id = ?", [student_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(hit.is_some())
}

pub fn require_student(conn: &Connection, student_id: &str) -> ServiceResult<()> {
    if student_exists(conn, student_id)? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Student not found"))
    }
}

fn duplicate_student(name: &str) -> ServiceError {
    ServiceError::validation(format!(
        "a student named {:?} already exists in this class",
        name
    ))
}

pub fn create_student(conn: &Connection, name: &str, class_id: &str) -> ServiceResult<String> {
    require_class(conn, class_id)?;

    let student_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO students(id, name, class_id, created_time) VALUES(?, ?, ?, ?)",
        (&student_id, name, class_id, now_timestamp()),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_student(name)
        } else {
            e.into()
        }
    })?;
    Ok(student_id)
}

pub fn update_student(
    conn: &Connection,
    student_id: &str,
    name: &str,
    class_id: &str,
) -> ServiceResult<()> {
    require_student(conn, student_id)?;
    require_class(conn, class_id)?;

    conn.execute(
        "UPDATE students SET name = ?, class_id = ? WHERE id = ?",
        (name, class_id, student_id),
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_student(name)
        } else {
            e.into()
        }
    })?;
    Ok(())
}

/// Deletes the student and all of its grades. Returns the number of grades removed.
pub fn delete_student(conn: &Connection, student_id: &str) -> ServiceResult<usize> {
    require_student(conn, student_id)?;

    // Grades first; the foreign key has no ON DELETE CASCADE.
    let grades = conn.execute("DELETE FROM grades WHERE student_id = ?", [student_id])?;
    conn.execute("DELETE FROM students WHERE id = ?", [student_id])?;
    Ok(grades)
}

/// Atomic insert-or-fetch on `(name, class_id)`. Returns the student id and
/// whether a new row was created.
pub fn upsert_student(conn: &Connection, name: &str, class_id: &str) -> ServiceResult<(String, bool)> {
    let candidate = Uuid::new_v4().to_string();
    let inserted = conn.execute(
        "INSERT INTO students(id, name, class_id, created_time) VALUES(?, ?, ?, ?)
         ON CONFLICT(name, class_id) DO NOTHING",
        (&candidate, name, class_id, now_timestamp()),
    )?;
    if inserted == 1 {
        return Ok((candidate, true));
    }

    let existing: String = conn.query_row(
        "SELECT id FROM students WHERE name = ? AND class_id = ?",
        (name, class_id),
        |r| r.get(0),
    )?;
    Ok((existing, false))
}
