use super::{body, query};
use crate::api::error::{created, ok, ok_with};
use crate::api::types::AppState;
use crate::db::with_tx;
use crate::error::ServiceResult;
use crate::model::{PageRequest, StudentInput};
use crate::store::students::{self, StudentFilter};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct StudentListQuery {
    pub class_id: Option<String>,
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    q: Result<Query<StudentListQuery>, QueryRejection>,
) -> ServiceResult<Response> {
    let q = query(q)?;
    let page = PageRequest::parse(q.page, q.page_size)?;
    let filter = StudentFilter {
        class_id: q.class_id,
        name: q.name,
    };
    let result = state
        .with_conn(move |conn| students::list_students(conn, &filter, page))
        .await?;
    Ok(ok(json!(result)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ServiceResult<Response> {
    let (name, class_id) = body(payload)?.validated()?;
    let student_id = state
        .with_conn(move |conn| {
            with_tx(conn, |tx| students::create_student(tx, &name, &class_id))
        })
        .await?;
    Ok(created(
        "Student created successfully",
        json!({ "id": student_id }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ServiceResult<Response> {
    let (name, class_id) = body(payload)?.validated()?;
    state
        .with_conn(move |conn| {
            with_tx(conn, |tx| {
                students::update_student(tx, &student_id, &name, &class_id)
            })
        })
        .await?;
    Ok(ok_with(
        StatusCode::OK,
        "Student updated successfully",
        json!({}),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ServiceResult<Response> {
    let removed = state
        .with_conn(move |conn| with_tx(conn, |tx| students::delete_student(tx, &student_id)))
        .await?;
    Ok(ok_with(
        StatusCode::OK,
        "Student deleted successfully",
        json!({ "gradesDeleted": removed }),
    ))
}
