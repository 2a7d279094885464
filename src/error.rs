use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyEnrolled | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                "Database error occurred".to_string()
            }
            AppError::StoreUnavailable(ref msg) => {
                tracing::error!("Store unavailable: {}", msg);
                "Service temporarily unavailable".to_string()
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::NotFound(msg)
            | AppError::InvalidInput(msg)
            | AppError::Conflict(msg) => msg,
            AppError::AlreadyEnrolled => "Already enrolled in this course".to_string(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StoreUnavailable(err.to_string())
            }
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            _ if is_store_busy(&err) => AppError::StoreUnavailable(err.to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// True when SQLite gave up waiting for a lock (SQLITE_BUSY / SQLITE_LOCKED and
/// their extended codes).
fn is_store_busy(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };

    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// True when the error is a UNIQUE/PRIMARY KEY violation reported by the store.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AlreadyEnrolled.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::StoreUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_pool_errors_are_store_unavailable() {
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::StoreUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::PoolClosed),
            AppError::StoreUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
    }
}
