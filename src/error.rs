use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::service::password::PasswordError;

#[derive(Debug, ThisError)]
pub enum ConsoleError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template directory error: {0}")]
    TemplateLoad(String),
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        let message = match self {
            ConsoleError::TemplateError(_) | ConsoleError::TemplateLoad(_) => {
                "Failed to render page."
            }
            ConsoleError::DatabaseError(_) => "Database unavailable.",
            ConsoleError::PasswordError(_)
            | ConsoleError::Io(_)
            | ConsoleError::Config(_) => "An internal server error occurred.",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_500() {
        let resp = ConsoleError::Config("boom".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = ConsoleError::DatabaseError(SqlxError::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
