//! Backend error types.
//!
//! `BackendError` is the single error surface of the HTTP handlers. Each
//! variant maps to an HTTP status code; the conversion module turns it into
//! a JSON response so handlers can return `Result<_, BackendError>` and use
//! the `?` operator throughout.
//!
//! # Error Categories
//!
//! ## Handler Errors
//!
//! Request-level failures carrying their own status code: missing or invalid
//! input, failed authorisation, unknown resources. The message is written
//! for the client and is returned verbatim in the response body.
//!
//! ## Database Errors
//!
//! Failures from the store, converted automatically via `From<sqlx::Error>`
//! so database calls can be chained with `?`. These always surface as 500;
//! the driver-level detail is logged server-side and never leaks to the
//! client.
//!
//! # Usage
//!
//! ```rust
//! use axum::http::StatusCode;
//! use chatwire::backend::error::BackendError;
//!
//! // Explicit status code
//! let err = BackendError::handler(StatusCode::BAD_REQUEST, "invalid request");
//!
//! // Named shortcuts for the common codes
//! let err = BackendError::not_found("no pending friend request found");
//! let err = BackendError::forbidden("user not authorized to access this room");
//! ```

use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error type.
///
/// This enum represents everything a handler can fail with. It implements
/// `IntoResponse` (in the conversion module), so returning it from a handler
/// produces the right status code and a JSON body of the form
/// `{"error": "...", "status": 403}`.
///
/// # Example
///
/// ```rust
/// use axum::http::StatusCode;
/// use chatwire::backend::error::BackendError;
///
/// let err = BackendError::forbidden("user not authorized to access this room");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// assert_eq!(err.message(), "user not authorized to access this room");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level failure with an explicit status code.
    ///
    /// Covers validation failures, authorisation denials and missing
    /// resources. The message is client-facing.
    #[error("{message}")]
    Handler {
        /// HTTP status code returned for this error.
        status: StatusCode,
        /// Human-readable error message, sent to the client verbatim.
        message: String,
    },

    /// Underlying store failure. Surfaced as 500; the driver error is logged,
    /// never sent to the client.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BackendError {
    /// Create a handler error with an explicit status code.
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Client-facing error message
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::http::StatusCode;
    /// use chatwire::backend::error::BackendError;
    ///
    /// let err = BackendError::handler(StatusCode::CONFLICT, "already exists");
    /// assert_eq!(err.status_code(), StatusCode::CONFLICT);
    /// ```
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized, used by the auth gate for missing or rejected
    /// sessions.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden, used for room membership denials.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// 503 Service Unavailable, used when the identity service cannot be
    /// reached.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// 500 Internal Server Error with a custom message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// HTTP status code for this error.
    ///
    /// # Status Code Mapping
    ///
    /// - `Handler` - whatever status the error was built with
    /// - `Database` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handler { status, .. } => *status,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for this error.
    ///
    /// Database errors collapse to a generic message here; the real driver
    /// error is only ever logged.
    pub fn message(&self) -> String {
        match self {
            Self::Handler { message, .. } => message.clone(),
            Self::Database(_) => "internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_keeps_status_and_message() {
        let error = BackendError::forbidden("user not authorized to access this room");
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(error.message(), "user not authorized to access this room");
    }

    #[test]
    fn database_error_hides_driver_details() {
        let error = BackendError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "internal server error");
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            BackendError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::unavailable("x").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            BackendError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
