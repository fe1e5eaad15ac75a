//! Error-to-response mapping. Validation problems carry their message
//! to the client as a 400; everything else is logged with context and
//! answered with a stable, non-leaking 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use echolingo_lookup::LookupError;
use echolingo_store::StorageError;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Validation(message) => ApiError::bad_request(message),
            LookupError::Provider(inner) => {
                tracing::error!(error = %inner, "lookup provider failed");
                ApiError::internal("lookup provider failed")
            }
            LookupError::MalformedResponse(preview) => {
                tracing::error!(%preview, "provider returned unparseable data");
                ApiError::internal("lookup returned unusable data")
            }
            LookupError::Schema(detail) => {
                tracing::error!(%detail, "provider response failed validation");
                ApiError::internal("lookup returned unusable data")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "storage operation failed");
        ApiError::internal("storage failure")
    }
}
