use crate::api::error::{err, ok};
use crate::api::types::AppState;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> Response {
    ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "uploadDir": state.config.upload_dir.to_string_lossy(),
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> Response {
    err(
        StatusCode::NOT_FOUND,
        "Not Found",
        Some(json!(format!("{} {}", method, uri.path()))),
    )
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    err(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        Some(json!(format!("{} {}", method, uri.path()))),
    )
}
