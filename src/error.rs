// Domain errors surfaced to the user

use thiserror::Error;

/// Failures a task operation reports back to the caller.
///
/// These travel inside `eyre::Report`; recover them with `downcast_ref::<TaskError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("All fields are required! ({field} is empty)")]
    Validation { field: &'static str },

    #[error("Invalid due date: {0} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task id is ambiguous: {0} matches more than one task")]
    AmbiguousId(String),
}

impl TaskError {
    /// True for errors caused by bad user input rather than a missing task
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation { .. } | TaskError::InvalidDueDate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TaskError::Validation { field: "title" }.to_string(),
            "All fields are required! (title is empty)"
        );
        assert_eq!(TaskError::NotFound("abc".to_string()).to_string(), "Task not found: abc");
    }

    #[test]
    fn test_is_validation() {
        assert!(TaskError::Validation { field: "dueDate" }.is_validation());
        assert!(TaskError::InvalidDueDate("tomorrow".to_string()).is_validation());
        assert!(!TaskError::NotFound("x".to_string()).is_validation());
    }

    #[test]
    fn test_roundtrip_through_eyre() {
        let report: eyre::Report = TaskError::NotFound("t-1".to_string()).into();
        assert_eq!(
            report.downcast_ref::<TaskError>(),
            Some(&TaskError::NotFound("t-1".to_string()))
        );
    }
}
