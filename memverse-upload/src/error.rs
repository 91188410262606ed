//! Upload service error types.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors that can occur while handling uploads.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request carried no file under the expected field.
    #[error("No file was uploaded")]
    MissingFile,

    /// More files than a single request may carry.
    #[error("Too many files: at most {max} per request")]
    TooManyFiles {
        /// Per-request limit.
        max: usize,
    },

    /// A file exceeded the size cap.
    #[error("File exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size cap in bytes.
        limit: usize,
    },

    /// The path segment is not a numeric upload ID.
    #[error("Invalid file id: {0}")]
    InvalidId(String),

    /// No upload with the requested ID.
    #[error("File not found")]
    NotFound,

    /// The multipart body could not be parsed.
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    /// SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience result type for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;

impl UploadError {
    /// Map a multipart parse failure. Body-limit rejections become
    /// [`UploadError::FileTooLarge`].
    #[must_use]
    pub fn from_multipart(err: &MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::FileTooLarge { limit }
        } else {
            Self::Multipart(err.body_text())
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile
            | Self::TooManyFiles { .. }
            | Self::InvalidId(_)
            | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Io(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "Upload request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(UploadError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::TooManyFiles { max: 5 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UploadError::FileTooLarge { limit: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(UploadError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            UploadError::InvalidId("abc".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let err = UploadError::Io(std::io::Error::other("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_name_the_limit() {
        assert_eq!(
            UploadError::TooManyFiles { max: 5 }.to_string(),
            "Too many files: at most 5 per request"
        );
    }
}
