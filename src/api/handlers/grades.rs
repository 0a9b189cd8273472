use super::{body, query};
use crate::aggregate::{compare_slots, exam_slots, previous_term};
use crate::api::error::{created, ok, ok_with};
use crate::api::types::AppState;
use crate::db::with_tx;
use crate::error::ServiceResult;
use crate::import::{import_grades, ImportRequest};
use crate::model::{GradeTarget, GradeUpdate, NewGrade, PageRequest, Term};
use crate::store::grades::{self, GradeFilter};
use crate::store::students::require_student;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct GradeListQuery {
    pub year: Option<String>,
    pub semester: Option<String>,
    pub exam: Option<String>,
    pub class_id: Option<String>,
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TermQuery {
    pub year: String,
    pub semester: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub file_id: String,
    pub class_id: String,
    pub year: String,
    pub semester: String,
    pub exam: String,
}

pub async fn list(
    State(state): State<AppState>,
    q: Result<Query<GradeListQuery>, QueryRejection>,
) -> ServiceResult<Response> {
    let q = query(q)?;
    let page = PageRequest::parse(q.page, q.page_size)?;
    let filter = GradeFilter {
        year: q.year,
        semester: q.semester,
        exam: q.exam,
        class_id: q.class_id,
        name: q.name,
    };
    let result = state
        .with_conn(move |conn| grades::list_grades(conn, &filter, page))
        .await?;
    Ok(ok(json!(result)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewGrade>, JsonRejection>,
) -> ServiceResult<Response> {
    let input = body(payload)?;
    let target = GradeTarget::parse(&input.year, &input.semester, &input.exam)?;
    let grade_id = state
        .with_conn(move |conn| {
            with_tx(conn, |tx| {
                grades::create_grade(tx, &input.name, &input.class_id, &target, input.score)
            })
        })
        .await?;
    Ok(created("Success", json!({ "id": grade_id })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(grade_id): Path<String>,
    payload: Result<Json<GradeUpdate>, JsonRejection>,
) -> ServiceResult<Response> {
    let input = body(payload)?;
    let target = GradeTarget::parse(&input.year, &input.semester, &input.exam)?;
    state
        .with_conn(move |conn| {
            with_tx(conn, |tx| {
                grades::update_grade(tx, &grade_id, &target, input.score)
            })
        })
        .await?;
    Ok(ok(json!({})))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(grade_id): Path<String>,
) -> ServiceResult<Response> {
    state
        .with_conn(move |conn| with_tx(conn, |tx| grades::delete_grade(tx, &grade_id)))
        .await?;
    Ok(ok(json!({})))
}

pub async fn import(
    State(state): State<AppState>,
    q: Result<Query<ImportQuery>, QueryRejection>,
) -> ServiceResult<Response> {
    let q = query(q)?;
    let req = ImportRequest {
        target: GradeTarget::parse(&q.year, &q.semester, &q.exam)?,
        file_id: q.file_id,
        class_id: q.class_id,
    };
    let upload_dir = state.config.upload_dir.clone();
    let columns = state.config.import_columns();
    let summary = state
        .with_conn(move |conn| import_grades(conn, &upload_dir, &columns, &req))
        .await?;
    Ok(ok_with(
        StatusCode::OK,
        "Grades imported successfully",
        json!(summary),
    ))
}

pub async fn student_term(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    q: Result<Query<TermQuery>, QueryRejection>,
) -> ServiceResult<Response> {
    let q = query(q)?;
    let term = Term::new(&q.year, &q.semester)?;
    let (term, rows) = state
        .with_conn(move |conn| {
            require_student(conn, &student_id)?;
            let rows = grades::term_scores(conn, &student_id, &term)?;
            Ok((term, rows))
        })
        .await?;
    Ok(ok(json!({
        "term": term,
        "exams": exam_slots(&rows),
    })))
}

pub async fn student_compare(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    q: Result<Query<TermQuery>, QueryRejection>,
) -> ServiceResult<Response> {
    let q = query(q)?;
    let current = Term::new(&q.year, &q.semester)?;
    let previous = previous_term(&current)?;
    let (current, previous, current_rows, previous_rows) = state
        .with_conn(move |conn| {
            require_student(conn, &student_id)?;
            let cur = grades::term_scores(conn, &student_id, &current)?;
            let prev = grades::term_scores(conn, &student_id, &previous)?;
            Ok((current, previous, cur, prev))
        })
        .await?;
    Ok(ok(json!({
        "current_term": current,
        "previous_term": previous,
        "exams": compare_slots(&current_rows, &previous_rows),
    })))
}
