//! Error types for booking operations

use thiserror::Error;

/// Core error type for infrastructure failures around the booking flow.
///
/// Expected control flow (stage validation, sink rejections, silent aborts)
/// is never reported through this type; see [`crate::flow::Transition`] and
/// [`crate::submit::SubmitOutcome`].
#[derive(Error, Debug)]
pub enum BookingError {
    // === Configuration errors (E001-E003) ===
    /// E001: Configuration file could not be parsed
    #[error("E001: Invalid configuration in {path}: {message}")]
    InvalidConfig { path: String, message: String },

    /// E002: A configured time value is not HH:MM
    #[error("E002: Invalid time of day: {value} (expected HH:MM)")]
    InvalidTimeOfDay { value: String },

    /// E003: The clinic timezone is not a known IANA zone
    #[error("E003: Unknown timezone: {value}")]
    InvalidTimezone { value: String },

    // === Storage errors (E010-E011) ===
    /// E010: No storage directory could be determined
    #[error("E010: No storage directory available for booking snapshots")]
    StorageUnavailable,

    /// E011: Snapshot could not be serialized
    #[error("E011: Failed to serialize booking snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    // === Submission errors (E020-E022) ===
    /// E020: Transport failure talking to the booking endpoint
    #[error("E020: Booking endpoint unreachable: {reason}")]
    Transport { reason: String },

    /// E021: Endpoint answered with a body that is not a booking response
    #[error("E021: Unexpected response from booking endpoint (HTTP {status}): {reason}")]
    BadResponse { status: u16, reason: String },

    /// E022: The outbox directory could not be written
    #[error("E022: Failed to write outbox message: {0}")]
    Outbox(String),

    // === Input errors (E030-E031) ===
    /// E030: A calendar date argument is not YYYY-MM-DD
    #[error("E030: Invalid date: {value} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    /// E031: Nothing to export because no taster slot is chosen
    #[error("E031: No taster date and time selected")]
    NoTasterSelected,

    // === Interaction errors (E040-E041) ===
    /// E040: User aborted the booking wizard
    #[error("E040: Booking cancelled")]
    Cancelled,

    /// E041: The terminal could not be used for prompts
    #[error("E041: Interaction failed: {0}")]
    Interaction(String),

    // === IO ===
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BookingError {
    /// Get the error code (e.g., "E001", "E020")
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidConfig { .. } => "E001",
            BookingError::InvalidTimeOfDay { .. } => "E002",
            BookingError::InvalidTimezone { .. } => "E003",
            BookingError::StorageUnavailable => "E010",
            BookingError::Serialize(_) => "E011",
            BookingError::Transport { .. } => "E020",
            BookingError::BadResponse { .. } => "E021",
            BookingError::Outbox(_) => "E022",
            BookingError::InvalidDate { .. } => "E030",
            BookingError::NoTasterSelected => "E031",
            BookingError::Cancelled => "E040",
            BookingError::Interaction(_) => "E041",
            BookingError::Io(_) => "E010", // Storage-level failure
        }
    }

    /// Get the exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            BookingError::InvalidConfig { .. }
            | BookingError::InvalidTimeOfDay { .. }
            | BookingError::InvalidTimezone { .. } => 4,

            BookingError::StorageUnavailable | BookingError::Serialize(_) | BookingError::Io(_) => 2,

            BookingError::Transport { .. }
            | BookingError::BadResponse { .. }
            | BookingError::Outbox(_) => 3,

            BookingError::InvalidDate { .. }
            | BookingError::NoTasterSelected
            | BookingError::Interaction(_) => 1,

            BookingError::Cancelled => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = BookingError::InvalidConfig {
            path: "wellvitas.toml".to_string(),
            message: "expected table".to_string(),
        };
        assert_eq!(err.code(), "E001");
        assert_eq!(err.exit_code(), 4);

        let err = BookingError::Transport {
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.code(), "E020");
        assert_eq!(err.exit_code(), 3);

        let err = BookingError::Cancelled;
        assert_eq!(err.code(), "E040");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_error_display() {
        let err = BookingError::InvalidDate {
            value: "19/10/2026".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "E030: Invalid date: 19/10/2026 (expected YYYY-MM-DD)"
        );

        let err = BookingError::BadResponse {
            status: 502,
            reason: "not json".to_string(),
        };
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BookingError = io.into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("denied"));
    }
}
