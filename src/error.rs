//! HTTP-facing error type. Every variant renders as
//! `{"success": false, "error": "..."}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send message. Please try again later or email me directly.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Instant reject; the reason is shown to the submitter.
    #[error("{0}")]
    Rejected(String),

    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// Every notification transport failed.
    #[error("Failed to send message. Please try again later or email me directly.")]
    Delivery,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Rejected(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Delivery | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::Validation(vec![format!("Invalid request body: {}", rej.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(target: "api", error = %self, "request failed");
        }
        let body = Json(json!({ "success": false, "error": self.public_message() }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_join_with_commas() {
        let e = ApiError::Validation(vec!["Name is too short".into(), "Invalid email".into()]);
        assert_eq!(e.public_message(), "Name is too short, Invalid email");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_details_are_hidden() {
        let e = ApiError::from(anyhow::anyhow!("db password wrong"));
        assert_eq!(e.public_message(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
