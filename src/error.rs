//! Structured error types and the JSON response envelope.

use crate::db::query::QueryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Serialize, Serializer};
use std::fmt;

/// Result codes carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok = 0,
    DbOperationAbnormal = 1,
    NotFound = 2,
    BadRequest = 3,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Default message for the code.
    pub fn reason(self) -> &'static str {
        match self {
            ErrorCode::Ok => "ok",
            ErrorCode::DbOperationAbnormal => "database operation abnormal.",
            ErrorCode::NotFound => "resource not found.",
            ErrorCode::BadRequest => "invalid request params.",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::Ok => StatusCode::OK,
            ErrorCode::DbOperationAbnormal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// `{code, message, data}` wrapper for every API response.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: ErrorCode::Ok,
            message: ErrorCode::Ok.reason().to_string(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Structured error for API responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error carrying the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.reason())
    }

    pub fn bad_request(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::BadRequest,
            format!("{} {}", ErrorCode::BadRequest.reason(), reason),
        )
    }

    pub fn not_found() -> Self {
        Self::from_code(ErrorCode::NotFound)
    }

    pub fn database() -> Self {
        Self::from_code(ErrorCode::DbOperationAbnormal)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::bad_request(err)
    }
}

// Persistence errors surface as a generic database failure; query
// validation errors are the caller's fault.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ApiError>() {
            Ok(api_err) => return api_err,
            Err(err) => err,
        };
        match err.downcast::<QueryError>() {
            Ok(query_err) => query_err.into(),
            Err(_) => ApiError::database(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::<()> {
            code: self.code,
            message: self.message,
            data: None,
        }
        .into_response()
    }
}

/// Result type for service and handler operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
