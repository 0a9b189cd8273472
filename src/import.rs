//! Bulk grade import from a stored spreadsheet.
//!
//! The first worksheet's first row is the header. The name and score columns
//! are located by header text; every other column is ignored. All rows are
//! written in one transaction, so a failing row leaves nothing behind.

use crate::db::with_tx;
use crate::error::{ServiceError, ServiceResult};
use crate::model::GradeTarget;
use crate::store::classes::require_class;
use crate::store::grades::insert_grade;
use crate::store::students::upsert_student;
use crate::uploads::resolve_upload;
use calamine::{open_workbook_auto, Data, Reader};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportColumns {
    pub name: String,
    pub score: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based spreadsheet row number, for error messages.
    pub line: usize,
    pub name: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub file_id: String,
    pub class_id: String,
    pub target: GradeTarget,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub students_created: usize,
    pub skipped_blank: usize,
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
        other => other.to_string().trim().to_string(),
    }
}

/// Score of one cell. NaN, empty and error cells have no score.
pub fn score_from_cell(cell: &Data) -> Result<Option<f64>, String> {
    match cell {
        Data::Empty | Data::Error(_) => Ok(None),
        Data::Float(v) if v.is_nan() => Ok(None),
        Data::Float(v) => Ok(Some(*v)),
        Data::Int(v) => Ok(Some(*v as f64)),
        Data::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            match t.parse::<f64>() {
                Ok(v) if v.is_nan() => Ok(None),
                Ok(v) => Ok(Some(v)),
                Err(_) => Err(format!("score {:?} is not a number", t)),
            }
        }
        other => Err(format!("score {:?} is not a number", other.to_string())),
    }
}

fn find_column(header: &[Data], key: &str) -> Option<usize> {
    header.iter().position(|c| cell_text(c) == key)
}

/// Reads and validates every data row without touching the database.
pub fn read_rows(path: &Path, columns: &ImportColumns) -> ServiceResult<Vec<ImportRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ServiceError::Parse(format!("Failed to read Excel file: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ServiceError::Parse("Failed to read Excel file: no worksheets".into()))?
        .map_err(|e| ServiceError::Parse(format!("Failed to read Excel file: {}", e)))?;

    // Zero-based sheet row of the header; leading blank rows are outside the range.
    let header_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let name_idx = find_column(header, &columns.name);
    let score_idx = find_column(header, &columns.score);
    let (Some(name_idx), Some(score_idx)) = (name_idx, score_idx) else {
        let missing: Vec<&str> = [
            (name_idx, columns.name.as_str()),
            (score_idx, columns.score.as_str()),
        ]
        .into_iter()
        .filter(|(idx, _)| idx.is_none())
        .map(|(_, key)| key)
        .collect();
        return Err(ServiceError::validation_with(
            format!(
                "Excel file format incorrect. Required columns: {:?}, {:?}",
                columns.name, columns.score
            ),
            json!({ "missingColumns": missing }),
        ));
    };

    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        let line = header_row + i + 2;
        let name = row.get(name_idx).map(cell_text).unwrap_or_default();
        let score = match row.get(score_idx) {
            Some(cell) => score_from_cell(cell).map_err(|msg| {
                ServiceError::validation_with(
                    format!("row {}: {}", line, msg),
                    json!({ "row": line }),
                )
            })?,
            None => None,
        };
        out.push(ImportRow { line, name, score });
    }
    Ok(out)
}

pub fn import_grades(
    conn: &mut Connection,
    upload_dir: &Path,
    columns: &ImportColumns,
    req: &ImportRequest,
) -> ServiceResult<ImportSummary> {
    let class_id = req.class_id.trim();
    if class_id.is_empty() {
        return Err(ServiceError::validation("class id cannot be empty"));
    }
    let path = resolve_upload(upload_dir, &req.file_id)?;
    let rows = read_rows(&path, columns)?;

    let summary = with_tx(conn, |tx| {
        require_class(tx, class_id)?;
        let mut summary = ImportSummary::default();
        for row in &rows {
            if row.name.is_empty() {
                summary.skipped_blank += 1;
                continue;
            }
            let (student_id, created) = upsert_student(tx, &row.name, class_id)?;
            if created {
                summary.students_created += 1;
            }
            insert_grade(tx, &student_id, class_id, &req.target, row.score)?;
            tracing::debug!(line = row.line, student_id = %student_id, score = ?row.score, "imported row");
            summary.imported += 1;
        }
        Ok(summary)
    })?;

    tracing::info!(
        file_id = %req.file_id,
        class_id = %class_id,
        imported = summary.imported,
        students_created = summary.students_created,
        "grade import committed"
    );
    Ok(summary)
}
