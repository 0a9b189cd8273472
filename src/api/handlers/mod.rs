pub mod classes;
pub mod core;
pub mod files;
pub mod grades;
pub mod students;

use crate::error::{ServiceError, ServiceResult};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

/// Unwraps a query extractor, turning a rejection into a validation error.
pub(crate) fn query<T>(q: Result<Query<T>, QueryRejection>) -> ServiceResult<T> {
    q.map(|Query(v)| v)
        .map_err(|e| ServiceError::validation(format!("Validation Error: {}", e.body_text())))
}

pub(crate) fn body<T>(b: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
    b.map(|Json(v)| v)
        .map_err(|e| ServiceError::validation(format!("Validation Error: {}", e.body_text())))
}
