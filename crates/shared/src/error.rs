//! Application-wide error types.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No resolvable caller identity.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access token was valid but has expired.
    #[error("Authentication failed: token has expired")]
    TokenExpired,

    /// Caller is authenticated but not a member of the budget account.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found or not owned by the budget account.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any persistence call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) | Self::TokenExpired => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true for failures the caller cannot fix by changing the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
