//! Planning error types.

use std::fmt::Display;

use payplan_shared::AppError;
use payplan_shared::types::BudgetAccountId;
use thiserror::Error;

use crate::calendar::CalendarError;

/// Planning operation errors.
///
/// Double-unallocate and double-dismiss are not errors; they resolve to
/// [`MutationOutcome::Unchanged`](super::types::MutationOutcome::Unchanged).
#[derive(Debug, Error)]
pub enum PlanningError {
    /// No resolvable caller identity.
    #[error("authentication required")]
    NotAuthenticated,

    /// Caller is not a member of the budget account.
    #[error("not a member of budget account {0}")]
    AccessDenied(BudgetAccountId),

    /// Referenced entity does not exist or belongs to another account.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier as supplied.
        id: String,
    },

    /// Malformed input.
    #[error("{0}")]
    Validation(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PlanningError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<CalendarError> for PlanningError {
    fn from(err: CalendarError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PlanningError> for AppError {
    fn from(err: PlanningError) -> Self {
        match err {
            PlanningError::NotAuthenticated => Self::Unauthorized(err.to_string()),
            PlanningError::AccessDenied(_) => Self::Forbidden(err.to_string()),
            PlanningError::NotFound { .. } => Self::NotFound(err.to_string()),
            PlanningError::Validation(msg) => Self::Validation(msg),
            PlanningError::Repository(msg) => Self::Database(msg),
        }
    }
}
