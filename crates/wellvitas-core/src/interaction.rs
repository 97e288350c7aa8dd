//! Front-end abstraction for the booking wizard
//!
//! The wizard in [`crate::wizard`] only talks to an [`InteractionAdapter`];
//! the CLI provides a terminal implementation and tests provide scripted ones.

use thiserror::Error;

use crate::error::BookingError;

/// Errors raised by an interaction front-end
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// User pressed Ctrl+C or otherwise aborted
    #[error("operation cancelled by user")]
    Cancelled,

    /// Interactive input requested without a terminal
    #[error("interactive input requires a terminal")]
    NonTty,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type InteractionResult<T> = Result<T, InteractionError>;

impl From<InteractionError> for BookingError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::Cancelled => BookingError::Cancelled,
            other => BookingError::Interaction(other.to_string()),
        }
    }
}

/// Handle for an in-flight progress indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressHandle {
    id: u64,
    message: String,
}

impl ProgressHandle {
    pub fn new(id: u64, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Prompts, progress and printing for one front-end
pub trait InteractionAdapter {
    fn ask_text(&self, prompt: &str, default: Option<&str>) -> InteractionResult<String>;

    /// Pick one option, starting on `default`; returns the chosen index
    fn ask_select(&self, prompt: &str, options: &[&str], default: usize) -> InteractionResult<usize>;

    fn ask_confirm(&self, prompt: &str, default: bool) -> InteractionResult<bool>;

    /// Pick any number of options. `checked` marks the preselected ones.
    fn ask_multi_select(
        &self,
        prompt: &str,
        options: &[&str],
        checked: &[bool],
    ) -> InteractionResult<Vec<usize>>;

    fn start_progress(&self, message: &str) -> ProgressHandle;

    fn end_progress(&self, handle: ProgressHandle, success: bool);

    fn print_info(&self, message: &str);

    fn print_warning(&self, message: &str);

    fn print_error(&self, message: &str);

    fn print_success(&self, message: &str);

    fn print_header(&self, message: &str) {
        self.print_info(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_handle() {
        let handle = ProgressHandle::new(3, "Submitting");
        assert_eq!(handle.id(), 3);
        assert_eq!(handle.message(), "Submitting");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            InteractionError::Cancelled.to_string(),
            "operation cancelled by user"
        );
        assert_eq!(
            InteractionError::InvalidInput("options cannot be empty".into()).to_string(),
            "invalid input: options cannot be empty"
        );
    }

    #[test]
    fn test_converts_to_booking_error() {
        let err: BookingError = InteractionError::Cancelled.into();
        assert_eq!(err.code(), "E040");
        let err: BookingError = InteractionError::NonTty.into();
        assert_eq!(err.code(), "E041");
        assert_eq!(err.exit_code(), 1);
    }
}
