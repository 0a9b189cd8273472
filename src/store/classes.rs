use crate::error::{ServiceError, ServiceResult};
use crate::model::{ClassRow, NewClass};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

pub fn list_classes(conn: &Connection) -> ServiceResult<Vec<ClassRow>> {
    // Correlated subquery keeps the count independent of other joins.
    let mut stmt = conn.prepare(
        "SELECT
           c.id,
           c.name,
           c.value,
           (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS student_count
         FROM classes c
         ORDER BY c.name, c.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ClassRow {
                id: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                student_count: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn create_class(conn: &Connection, input: &NewClass) -> ServiceResult<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("class name cannot be empty"));
    }
    let value = input
        .value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let class_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO classes(id, name, value) VALUES(?, ?, ?)",
        (&class_id, name, value),
    )?;
    Ok(class_id)
}

pub fn class_exists(conn: &Connection, class_id: &str) -> ServiceResult<bool> {
    let hit: Option<i64> = conn
        .query_row("SELECT 1 FROM classes WHERE id = ?", [class_id], |r| r.get(0))
        .optional()?;
    Ok(hit.is_some())
}

pub fn require_class(conn: &Connection, class_id: &str) -> ServiceResult<()> {
    if class_exists(conn, class_id)? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Class not found"))
    }
}
