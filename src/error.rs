use serde_json::Value;

/// Failure of a single request. Every variant is terminal for that request.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        detail: Option<Value>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Parse(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            detail: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, detail: Value) -> Self {
        ServiceError::Validation {
            message: message.into(),
            detail: Some(detail),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation { .. } => 400,
            ServiceError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
