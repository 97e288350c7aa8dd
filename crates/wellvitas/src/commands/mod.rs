//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use wellvitas_core::{BookingError, Config, SnapshotStore, SystemClock, load_config};

use crate::output::{JsonIssue, JsonResponse};

pub mod book;
pub mod calendar;
pub mod hours;
pub mod reset;
pub mod show;
pub mod slots;

pub use book::run_book;
pub use calendar::run_calendar;
pub use hours::run_hours;
pub use reset::run_reset;
pub use show::run_show;
pub use slots::run_slots;

/// Output switches shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
}

impl OutputMode {
    /// Human-readable output wanted
    pub fn human(self) -> bool {
        !self.json && !self.quiet
    }
}

/// Configuration plus the snapshot store and clinic clock it points at
pub struct Session {
    pub config: Config,
    pub store: SnapshotStore,
    pub clock: Arc<SystemClock>,
}

pub fn open_session(config_path: Option<&Path>) -> anyhow::Result<Session> {
    let config = load_config(config_path).context("loading configuration")?;
    let store = SnapshotStore::from_config(&config.booking).context("locating booking storage")?;
    let clock = Arc::new(SystemClock::from_config(&config.clinic).context("reading clinic timezone")?);
    tracing::debug!(snapshot = %store.path().display(), zone = %clock.zone(), "session opened");
    Ok(Session { config, store, clock })
}

/// Print `err` for `command` and return the exit code it maps to
pub fn report_error(command: &str, mode: OutputMode, err: &anyhow::Error) -> i32 {
    let booking = err.downcast_ref::<BookingError>();
    let code = booking.map(BookingError::code).unwrap_or("E000");
    let exit = booking.map(BookingError::exit_code).unwrap_or(1);
    let message = format!("{:#}", err);

    if mode.json {
        JsonResponse::<()>::error(command, (), vec![JsonIssue::error(code, &message)]).print();
    } else {
        eprintln!("error: {}", message);
    }
    exit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_uses_booking_exit_code() {
        let err = anyhow::Error::new(BookingError::InvalidDate {
            value: "tomorrow".to_string(),
        })
        .context("reading --date");
        let mode = OutputMode {
            json: false,
            quiet: true,
        };
        assert_eq!(report_error("slots", mode, &err), 1);

        let err = anyhow::Error::new(BookingError::InvalidConfig {
            path: "x.toml".to_string(),
            message: "bad".to_string(),
        });
        assert_eq!(report_error("show", mode, &err), 4);
    }

    #[test]
    fn test_open_session_with_storage_override() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("wellvitas.toml");
        std::fs::write(
            &config_path,
            format!(
                "[booking]\nstorage_dir = {:?}\n",
                temp.path().join("data").display().to_string()
            ),
        )
        .unwrap();
        let session = open_session(Some(&config_path)).unwrap();
        assert!(session.store.path().starts_with(temp.path().join("data")));
    }
}
