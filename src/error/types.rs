use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

/// Failures of the extraction endpoint.
///
/// The `Display` text carries the internal detail and is only ever logged.
/// Clients see [`AppError::public_message`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    #[error("Upload processing failed: {message}")]
    UploadProcessing { message: String },

    #[error("Missing file in request")]
    MissingFile,

    #[error("PDF extraction failed: {message}")]
    Extraction { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            AppError::UploadProcessing { .. } => "UPLOAD_PROCESSING_ERROR",
            AppError::MissingFile => "MISSING_FILE",
            AppError::Extraction { .. } => "EXTRACTION_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UploadProcessing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::Extraction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The fixed message returned in the `error` field of the JSON body.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed { .. } => "Method not allowed",
            AppError::UploadProcessing { .. } => "Failed to process upload",
            AppError::MissingFile => "No file uploaded",
            AppError::Extraction { .. } => "Failed to parse PDF",
            AppError::Internal { .. } => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                error_message = %self,
                "Request rejected"
            );
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: format!("{:#}", err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("Task failed: {}", err),
        }
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        AppError::MethodNotAllowed {
            method: method.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        AppError::UploadProcessing {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        AppError::Extraction {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
