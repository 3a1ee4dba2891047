//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::validation::FieldViolation;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation Errors**: field-level problems with the request body,
///   reported as a list so the caller can fix them all at once
/// - **Resource Errors**: referenced account absent, or already present on
///   creation
/// - **Business Rule Errors**: insufficient funds, currency mismatch
/// - **Internal Faults**: database errors and exceeded deadlines; these are
///   logged server-side and surfaced as a generic internal error so storage
///   details never leak to clients
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operation exceeded its wall-clock deadline and was rolled back.
    #[error("Operation timed out")]
    Timeout,

    /// Request failed field-level validation.
    ///
    /// Returns HTTP 400 Bad Request with one entry per violation.
    #[error("Request validation failed")]
    Validation(Vec<FieldViolation>),

    /// Referenced account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// An account with the requested id already exists.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Account already exists")]
    AccountExists,

    /// Source account balance is smaller than the transfer amount.
    ///
    /// Returns HTTP 400 Bad Request (a business-rule violation the caller
    /// can act on, not a fault).
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Source and destination accounts hold different currencies.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Accounts must share the same currency")]
    CurrencyMismatch,
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format (`details` only for validation):
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message",
///     "details": [ { "field": "...", "message": "...", "value": "..." } ]
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `Validation` → 400 Bad Request
/// - `InsufficientFunds` → 400 Bad Request
/// - `CurrencyMismatch` → 400 Bad Request
/// - `AccountNotFound` → 404 Not Found
/// - `AccountExists` → 409 Conflict
/// - `Database`, `Timeout` → 500 Internal Server Error (hides details)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Expected business outcomes are returned directly; internal faults
        // are logged here and masked with a generic message.
        let (status, code, message, details) = match self {
            AppError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                "validation_failed",
                "Request validation failed".to_string(),
                Some(violations),
            ),
            AppError::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "insufficient_funds",
                self.to_string(),
                None,
            ),
            AppError::CurrencyMismatch => (
                StatusCode::BAD_REQUEST,
                "currency_mismatch",
                self.to_string(),
                None,
            ),
            AppError::AccountNotFound => (
                StatusCode::NOT_FOUND,
                "account_not_found",
                self.to_string(),
                None,
            ),
            AppError::AccountExists => (
                StatusCode::CONFLICT,
                "account_exists",
                self.to_string(),
                None,
            ),
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            AppError::Timeout => {
                tracing::error!("operation exceeded its deadline and was rolled back");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        // Build JSON response body
        let body = match details {
            Some(violations) => Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "details": violations
                }
            })),
            None => Json(json!({
                "error": {
                    "code": code,
                    "message": message
                }
            })),
        };

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
