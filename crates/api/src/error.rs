use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of every non-200 response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid book ID")]
    InvalidBookId(String),

    #[error("Book not found or error fetching metadata")]
    BookNotFound(#[source] anyhow::Error),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBookId(_) => StatusCode::BAD_REQUEST,
            Self::BookNotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Underlying cause reported to the client
    fn detail(&self) -> Option<String> {
        match self {
            Self::BookNotFound(e) | Self::Internal(e) => Some(format!("{:#}", e)),
            Self::InvalidBookId(_) | Self::MethodNotAllowed => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            error: self.detail(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = %format!("{:#}", e), "Request failed"),
            Self::BookNotFound(e) => tracing::warn!(error = %format!("{:#}", e), "Book lookup failed"),
            Self::InvalidBookId(raw) => tracing::debug!(book_id = %raw, "Rejected book id"),
            Self::MethodNotAllowed => {}
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}
