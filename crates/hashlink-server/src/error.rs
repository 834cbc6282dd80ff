use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hashlink_core::StorageError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("url must be valid UTF-8")]
    InvalidUtf8,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyUrl | AppError::InvalidUtf8 => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Storage(ref source) = self {
            error!(error = %source, "storage call failed");
        }
        (status, self.to_string()).into_response()
    }
}
