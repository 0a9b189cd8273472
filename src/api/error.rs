use crate::error::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

pub fn ok(data: Value) -> Response {
    ok_with(StatusCode::OK, "Success", data)
}

pub fn created(message: &str, data: Value) -> Response {
    ok_with(StatusCode::CREATED, message, data)
}

pub fn ok_with(status: StatusCode, message: &str, data: Value) -> Response {
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "status": true,
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

pub fn err(status: StatusCode, message: impl Into<String>, detail: Option<Value>) -> Response {
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "message": message.into(),
            "detail": detail,
        })),
    )
        .into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            ServiceError::Validation { message, detail } => err(status, message, detail),
            ServiceError::NotFound(message) => err(status, message, None),
            other => {
                tracing::error!(error = %other, "request failed");
                err(status, "Internal Server Error", Some(json!(other.to_string())))
            }
        }
    }
}
