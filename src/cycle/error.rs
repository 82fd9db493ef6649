//! Error types for cycle operations

use thiserror::Error;

use crate::cycle::model::CycleId;

/// Errors surfaced to callers of the controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Invalid input when creating a cycle. Nothing was applied.
    #[error("Invalid cycle input: {field} {reason}")]
    Validation {
        /// The offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl CycleError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// A transition the reducer refused to apply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalTransition {
    /// The action targets a cycle that does not exist
    #[error("no cycle with id '{0}'")]
    UnknownCycle(CycleId),

    /// The action targets a cycle that is already finished or interrupted
    #[error("cycle '{0}' is already terminal")]
    AlreadyTerminal(CycleId),

    /// A cycle with the same id is already recorded
    #[error("cycle '{0}' already exists")]
    DuplicateCycle(CycleId),

    /// The cycle being added already carries a terminal timestamp
    #[error("cycle '{0}' cannot be added in a terminal state")]
    TerminalOnArrival(CycleId),
}

/// Result alias for controller operations
pub type CycleResult<T> = Result<T, CycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = CycleError::validation("task", "must not be empty");
        assert_eq!(err.to_string(), "Invalid cycle input: task must not be empty");
    }

    #[test]
    fn test_illegal_transition_messages() {
        let id = CycleId::from("abc");
        assert_eq!(
            IllegalTransition::AlreadyTerminal(id.clone()).to_string(),
            "cycle 'abc' is already terminal"
        );
        assert_eq!(
            IllegalTransition::UnknownCycle(id).to_string(),
            "no cycle with id 'abc'"
        );
    }
}
