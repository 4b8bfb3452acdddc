//! Relay error types.
//!
//! [`RelayError`] is returned by the HTTP-facing surface and maps each
//! variant to a status code and structured JSON body. [`EventError`]
//! describes why an inbound socket event was dropped; it is logged and
//! never sent back to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: event name must not be empty"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-facing error with status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request             |
/// | 3000–3999 | Server     | 503 Service Unavailable     |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The relay already holds its maximum number of live connections.
    #[error("connection limit of {max} reached")]
    CapacityExceeded {
        /// Configured connection limit.
        max: usize,
    },
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::CapacityExceeded { .. } => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::CapacityExceeded { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<EventError> for RelayError {
    fn from(err: EventError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Reason an inbound event was rejected.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The frame is not valid JSON or does not match any event shape.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required identifier is empty.
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A numeric field is NaN or infinite.
    #[error("field `{0}` must be a finite number")]
    NonFinite(&'static str),

    /// A numeric field is outside its valid range.
    #[error("field `{field}` out of range: {value}")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}
