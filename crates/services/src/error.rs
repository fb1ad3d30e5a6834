//! Errors at the async boundary.

use thiserror::Error;

use cleanorder_core::{DomainError, Violation, ViolationList};

/// Failure of an external collaborator (item store, pricing, finalizer).
///
/// These never corrupt wizard state: the session keeps the previous state and
/// the caller may retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },

    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },

    #[error("{service}: {what} not found")]
    NotFound { service: &'static str, what: String },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }

    pub fn rejected(service: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            message: message.into(),
        }
    }

    pub fn not_found(service: &'static str, what: impl Into<String>) -> Self {
        Self::NotFound {
            service,
            what: what.into(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. }
            | Self::Rejected { service, .. }
            | Self::NotFound { service, .. } => *service,
        }
    }

    /// Transient failures worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Error returned by [`crate::WizardSession`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The reducer rejected the command.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An external call failed; wizard state is unchanged.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl SessionError {
    /// Violations to show the user.
    ///
    /// External failures become a single warning addressed to the service.
    pub fn violations(&self) -> ViolationList {
        match self {
            Self::Domain(DomainError::Validation(list)) => list.clone(),
            Self::Domain(other) => Violation::error("wizard", "state", other.to_string()).into(),
            Self::Service(err) => Violation::warning(err.service(), "service", err.to_string()).into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(err) if err.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanorder_core::Severity;

    #[test]
    fn service_failure_surfaces_as_warning() {
        let err = SessionError::from(ServiceError::unavailable("pricing", "timeout talking to price list"));
        let violations = err.violations();
        assert_eq!(violations.len(), 1);
        let v = violations.iter().next().unwrap();
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.section, "pricing");
        assert!(err.is_retryable());
    }

    #[test]
    fn domain_rejection_keeps_its_violations() {
        let list = ViolationList::from(Violation::error("item.basic", "quantity", "must be positive"));
        let err = SessionError::from(DomainError::Validation(list.clone()));
        assert_eq!(err.violations(), list);
        assert!(!err.is_retryable());
    }

    #[test]
    fn rejection_is_not_retryable() {
        assert!(!ServiceError::rejected("finalizer", "order closed").is_retryable());
        assert_eq!(ServiceError::not_found("item_store", "order 1").service(), "item_store");
    }
}
