//! Domain error model.

use thiserror::Error;

use crate::violation::ViolationList;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (rejected
/// transitions, invariants, lookups). External service failures belong to the
/// services layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A transition was rejected by its guard. Carries every violation found.
    #[error("validation failed: {0}")]
    Validation(ViolationList),

    /// An engine invariant was violated (programming error, not user error).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced entity is no longer present.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conflict occurred (e.g. a persisted record does not match the open session).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(violations: impl Into<ViolationList>) -> Self {
        Self::Validation(violations.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Violations carried by a rejected transition, if this is one.
    pub fn violations(&self) -> Option<&ViolationList> {
        match self {
            Self::Validation(list) => Some(list),
            _ => None,
        }
    }
}

/// Report a broken engine invariant.
///
/// Debug builds panic immediately. Release builds log the breach and hand back
/// an error so the caller can leave state untouched.
#[track_caller]
pub fn invariant_breach(msg: impl Into<String>) -> DomainError {
    let msg = msg.into();
    tracing::error!(invariant = %msg, "engine invariant violated");
    debug_assert!(false, "engine invariant violated: {msg}");
    DomainError::InvariantViolation(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::Violation;

    #[test]
    fn validation_error_exposes_violations() {
        let err = DomainError::validation(Violation::error("item", "quantity", "must be positive"));
        let list = err.violations().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.has_field("quantity"));
    }

    #[test]
    fn non_validation_errors_have_no_violations() {
        assert!(DomainError::not_found("item").violations().is_none());
        assert!(DomainError::conflict("stale").violations().is_none());
    }

    #[test]
    fn display_includes_messages() {
        let err = DomainError::validation(Violation::error("client", "client", "required"));
        assert_eq!(err.to_string(), "validation failed: client.client: required");
        assert_eq!(DomainError::not_found("item 42").to_string(), "not found: item 42");
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "engine invariant violated"))]
    fn invariant_breach_fails_fast_in_debug() {
        let err = invariant_breach("sub-step without session");
        assert_eq!(err, DomainError::invariant("sub-step without session"));
    }
}
