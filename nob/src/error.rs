//! Coordinator error types

use thiserror::Error;

use crate::subject::SubjectRef;

/// Errors raised by the Coordinator to its immediate caller
///
/// Each precondition failure is its own variant so callers can tell "never
/// registered" from "not currently changed" from "malformed argument".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("{subject} is not a valid subject identity")]
    InvalidArgument { subject: SubjectRef },

    #[error("{subject} is not a registered subject")]
    NotRegistered { subject: SubjectRef },

    #[error("{subject} is not a changed subject")]
    NotChanged { subject: SubjectRef },

    #[error("Access violation: {operation} is reserved to the coordinator")]
    AccessViolation { operation: String },
}

impl CoordinatorError {
    /// The subject the failed call was about, if any
    pub fn subject(&self) -> Option<&SubjectRef> {
        match self {
            CoordinatorError::InvalidArgument { subject }
            | CoordinatorError::NotRegistered { subject }
            | CoordinatorError::NotChanged { subject } => Some(subject),
            CoordinatorError::AccessViolation { .. } => None,
        }
    }

    pub fn is_not_registered(&self) -> bool {
        matches!(self, CoordinatorError::NotRegistered { .. })
    }

    pub fn is_not_changed(&self) -> bool {
        matches!(self, CoordinatorError::NotChanged { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoordinatorError::InvalidArgument { .. })
    }

    /// Scoping violation rather than a precondition failure
    pub fn is_access_violation(&self) -> bool {
        matches!(self, CoordinatorError::AccessViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_message() {
        let subject = SubjectRef::new();
        let err = CoordinatorError::NotRegistered { subject };

        let msg = err.to_string();
        assert!(msg.contains(&subject.to_string()));
        assert!(msg.contains("not a registered subject"));
        assert!(err.is_not_registered());
        assert!(!err.is_access_violation());
        assert_eq!(err.subject(), Some(&subject));
    }

    #[test]
    fn test_access_violation_has_no_subject() {
        let err = CoordinatorError::AccessViolation {
            operation: "install".to_string(),
        };

        assert!(err.is_access_violation());
        assert!(err.subject().is_none());
        assert!(err.to_string().contains("install"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let subject = SubjectRef::nil();
        let invalid = CoordinatorError::InvalidArgument { subject };
        let not_changed = CoordinatorError::NotChanged { subject };

        assert!(invalid.is_invalid_argument());
        assert!(!invalid.is_not_changed());
        assert!(not_changed.is_not_changed());
        assert!(!not_changed.is_not_registered());
        assert_ne!(invalid, not_changed);
    }
}
