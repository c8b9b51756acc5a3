//! Gate error taxonomy. Every 4xx/5xx (and 206 partial) response is JSON
//! with a consistent shape.
//!
//! ```json
//! { "code": "partial_error", "message": "1 of 2 assets were not affected",
//!   "errors": [ { "reason": "not found", "public_id": "b" } ] }
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use media_adapter::AdapterError;
use serde::Serialize;
use thiserror::Error;

/// One resource a bulk operation left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialFailure {
    pub reason: String,
    pub public_id: String,
}

impl PartialFailure {
    pub fn not_found(public_id: impl Into<String>) -> Self {
        Self {
            reason: "not found".into(),
            public_id: public_id.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Partial {
        message: String,
        errors: Vec<PartialFailure>,
    },

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ExternalService(String),
}

impl GateError {
    pub fn missing_argument(name: &str) -> Self {
        Self::BadRequest(format!("missing argument \"{name}\""))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Partial { .. } => StatusCode::PARTIAL_CONTENT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Partial { .. } => "partial_error",
            Self::Internal(_) => "internal_error",
            Self::ExternalService(_) => "external_service_error",
        }
    }
}

impl From<AdapterError> for GateError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Remote { status: 404, message } => Self::NotFound(message),
            AdapterError::Remote { status: 401, message } => Self::Unauthorized(message),
            AdapterError::Remote { status: 403, message } => Self::Forbidden(message),
            AdapterError::NotConfigured(msg) => Self::Internal(msg),
            AdapterError::InvalidTransformation(msg) => {
                Self::BadRequest(format!("invalid transformation: {msg}"))
            }
            other => Self::ExternalService(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<PartialFailure>>,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = match self {
            Self::Partial { message, errors } => ApiErrorBody {
                code,
                message,
                errors: Some(errors),
            },
            other => ApiErrorBody {
                code,
                message: other.to_string(),
                errors: None,
            },
        };
        let mut resp = (status, Json(body)).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        resp
    }
}
