use super::body;
use crate::api::error::{created, ok};
use crate::api::types::AppState;
use crate::db::with_tx;
use crate::error::ServiceResult;
use crate::model::NewClass;
use crate::store::classes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde_json::json;

pub async fn list(State(state): State<AppState>) -> ServiceResult<Response> {
    let rows = state.with_conn(|conn| classes::list_classes(conn)).await?;
    Ok(ok(json!(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewClass>, JsonRejection>,
) -> ServiceResult<Response> {
    let input = body(payload)?;
    let class_id = state
        .with_conn(move |conn| with_tx(conn, |tx| classes::create_class(tx, &input)))
        .await?;
    Ok(created("Class created successfully", json!({ "id": class_id })))
}
