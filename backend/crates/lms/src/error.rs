//! LMS Error Types
//!
//! This module provides LMS-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// LMS-specific result type alias
pub type LmsResult<T> = Result<T, LmsError>;

/// Message returned to clients for every server-side failure
pub const GENERIC_SERVER_ERROR: &str = "An error occurred. Please try again later.";

/// LMS-specific error variants
#[derive(Debug, Error)]
pub enum LmsError {
    /// Malformed or out-of-range input
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password matched but the requested role differs from the stored one
    #[error("Role mismatch")]
    RoleMismatch,

    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    /// No bearer token on a protected route
    #[error("Authentication required")]
    MissingToken,

    /// Bad signature, expired or malformed token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Wrong role or wrong owner
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("Assignment not found")]
    AssignmentNotFound,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    #[error("Email already registered")]
    EmailTaken,

    #[error("You must be enrolled in this course")]
    NotEnrolled,

    #[error("Assignment has already been graded")]
    AlreadyGraded,

    #[error("Can only grade submitted assignments")]
    NotSubmitted,

    #[error("Cannot update graded assignments")]
    AssignmentLocked,

    /// Rate limit window exhausted
    #[error("{0}")]
    RateLimited(&'static str),

    /// Writing a collection to durable storage failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LmsError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LmsError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    /// Validation failure not tied to one field (unreadable body, bad path id)
    pub fn malformed(message: impl Into<String>) -> Self {
        LmsError::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LmsError::Validation { .. }
            | LmsError::AlreadyEnrolled
            | LmsError::EmailTaken
            | LmsError::NotEnrolled
            | LmsError::AlreadyGraded
            | LmsError::NotSubmitted
            | LmsError::AssignmentLocked => ErrorKind::BadRequest,
            LmsError::InvalidCredentials
            | LmsError::RoleMismatch
            | LmsError::CurrentPasswordIncorrect
            | LmsError::MissingToken
            | LmsError::InvalidToken => ErrorKind::Unauthorized,
            LmsError::Forbidden(_) => ErrorKind::Forbidden,
            LmsError::UserNotFound
            | LmsError::CourseNotFound
            | LmsError::AssignmentNotFound
            | LmsError::RouteNotFound => ErrorKind::NotFound,
            LmsError::RateLimited(_) => ErrorKind::TooManyRequests,
            LmsError::Persistence(_) | LmsError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures never leak their cause.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            return AppError::new(kind, GENERIC_SERVER_ERROR);
        }

        let err = AppError::new(kind, self.to_string());
        match self {
            LmsError::Validation {
                field: Some(field), ..
            } => err.with_field(*field),
            LmsError::InvalidToken => err.with_action("Sign in again to obtain a new token"),
            LmsError::RateLimited(_) => err.with_action("Wait for the rate limit window to reset"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            LmsError::Persistence(msg) => {
                tracing::error!(message = %msg, "LMS persistence error");
            }
            LmsError::Internal(msg) => {
                tracing::error!(message = %msg, "LMS internal error");
            }
            LmsError::InvalidCredentials | LmsError::RoleMismatch => {
                tracing::warn!(error = %self, "Rejected login attempt");
            }
            LmsError::RateLimited(_) => {
                tracing::warn!(error = %self, "Rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "LMS error");
            }
        }
    }
}

impl IntoResponse for LmsError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::password::PasswordHashError> for LmsError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        LmsError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for LmsError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        LmsError::validation("password", err.to_string())
    }
}

impl From<tokio::task::JoinError> for LmsError {
    fn from(err: tokio::task::JoinError) -> Self {
        LmsError::Internal(format!("Blocking task failed: {err}"))
    }
}
