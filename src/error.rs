use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A reading already exists at ts={0}")]
    DuplicateTimestamp(i64),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Setting '{0}' is read-only")]
    ReadOnlySetting(&'static str),

    #[error("Unknown reading column: {0}")]
    UnknownColumn(String),

    #[error("Schema version mismatch: database has v{found}, code expects v{expected}")]
    SchemaVersionMismatch { found: i64, expected: i64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DuplicateTimestamp(_) => (StatusCode::CONFLICT, self.to_string()),
            Self::UnknownSetting(_) | Self::ReadOnlySetting(_) | Self::UnknownColumn(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::SchemaVersionMismatch { .. } => {
                tracing::error!("{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
