use crate::api::error::ok;
use crate::api::types::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::uploads::store_upload;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;
use serde_json::json;

const FILE_FIELD: &str = "file";

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServiceResult<Response> {
    let mut multipart = multipart
        .map_err(|e| ServiceError::validation(format!("malformed upload: {}", e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::validation(format!("malformed upload: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::validation(format!("malformed upload: {}", e.body_text())))?;

        let dir = state.config.upload_dir.clone();
        let file_id = tokio::task::spawn_blocking(move || {
            store_upload(&dir, file_name.as_deref(), &bytes)
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {}", e)))??;
        return Ok(ok(json!({ "file_id": file_id })));
    }

    Err(ServiceError::validation("missing multipart field \"file\""))
}
