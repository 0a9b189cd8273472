use super::Filters;
use crate::db::now_timestamp;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{ExamScore, GradeRow, GradeTarget, Page, PageRequest, Term};
use crate::store::classes::require_class;
use crate::store::students::upsert_student;
use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct GradeFilter {
    pub year: Option<String>,
    pub semester: Option<String>,
    pub exam: Option<String>,
    pub class_id: Option<String>,
    pub name: Option<String>,
}

const GRADE_FROM: &str = "FROM grades g
         JOIN students s ON s.id = g.student_id
         LEFT JOIN classes c ON c.id = g.class_id";

pub fn list_grades(
    conn: &Connection,
    filter: &GradeFilter,
    page: PageRequest,
) -> ServiceResult<Page<GradeRow>> {
    let mut filters = Filters::default();
    filters.push("g.year = ?", filter.year.as_deref());
    filters.push("g.semester = ?", filter.semester.as_deref());
    filters.push("g.exam = ?", filter.exam.as_deref());
    filters.push("g.class_id = ?", filter.class_id.as_deref());
    // Case-sensitive substring, unlike the student listing.
    filters.push("instr(s.name, ?) > 0", filter.name.as_deref());
    let where_sql = filters.where_sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {} {}", GRADE_FROM, where_sql),
        params_from_iter(filters.values()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT g.id, g.score, g.year, g.semester, g.exam, g.date, s.name, c.name
         {}
         {}
         ORDER BY g.date DESC, g.rowid DESC
         LIMIT ? OFFSET ?",
        GRADE_FROM, where_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params_from_iter(filters.values_with_page(page.limit(), page.offset())),
            |row| {
                Ok(GradeRow {
                    id: row.get(0)?,
                    score: row.get(1)?,
                    year: row.get(2)?,
                    semester: row.get(3)?,
                    exam: row.get(4)?,
                    date: row.get(5)?,
                    student_name: row.get(6)?,
                    class_name: row.get(7)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(page.wrap(rows, total))
}

pub fn insert_grade(
    conn: &Connection,
    student_id: &str,
    class_id: &str,
    target: &GradeTarget,
    score: Option<f64>,
) -> ServiceResult<String> {
    let grade_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO grades(id, score, year, semester, exam, date, student_id, class_id)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &grade_id,
            score,
            &target.year,
            &target.semester,
            &target.exam,
            now_timestamp(),
            student_id,
            class_id,
        ),
    )?;
    Ok(grade_id)
}

/// Records a grade for the student named `name` in `class_id`, creating the
/// student if needed.
pub fn create_grade(
    conn: &Connection,
    name: &str,
    class_id: &str,
    target: &GradeTarget,
    score: Option<f64>,
) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Student name cannot be empty"));
    }
    let class_id = class_id.trim();
    if class_id.is_empty() {
        return Err(ServiceError::validation("class id cannot be empty"));
    }
    require_class(conn, class_id)?;

    let (student_id, created) = upsert_student(conn, name, class_id)?;
    if created {
        tracing::debug!(student_id = %student_id, "created student for new grade");
    }
    insert_grade(conn, &student_id, class_id, target, score)
}

pub fn update_grade(
    conn: &Connection,
    grade_id: &str,
    target: &GradeTarget,
    score: Option<f64>,
) -> ServiceResult<()> {
    let changed = conn.execute(
        "UPDATE grades SET score = ?, year = ?, semester = ?, exam = ?, date = ? WHERE id = ?",
        (
            score,
            &target.year,
            &target.semester,
            &target.exam,
            now_timestamp(),
            grade_id,
        ),
    )?;
    if changed == 0 {
        return Err(ServiceError::not_found("Grade not found"));
    }
    Ok(())
}

pub fn delete_grade(conn: &Connection, grade_id: &str) -> ServiceResult<()> {
    let changed = conn.execute("DELETE FROM grades WHERE id = ?", [grade_id])?;
    if changed == 0 {
        return Err(ServiceError::not_found("Grade not found"));
    }
    Ok(())
}

/// Grades of one student in one term, oldest first.
pub fn term_scores(conn: &Connection, student_id: &str, term: &Term) -> ServiceResult<Vec<ExamScore>> {
    let mut stmt = conn.prepare(
        "SELECT exam, score
         FROM grades
         WHERE student_id = ? AND year = ? AND semester = ?
         ORDER BY date, rowid",
    )?;
    let rows = stmt
        .query_map((student_id, &term.year, &term.semester), |row| {
            Ok(ExamScore {
                exam: row.get(0)?,
                score: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
