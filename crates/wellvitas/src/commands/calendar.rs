//! Implementation of the `wellvitas calendar` command

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use wellvitas_core::calendar::ICS_FILENAME;
use wellvitas_core::{BookingError, Clock, build_calendar_event};

use super::{OutputMode, open_session, report_error};
use crate::output::{CalendarData, JsonResponse};

/// Write the saved taster as an ICS file and print the Google Calendar link
pub fn run_calendar(out: Option<PathBuf>, config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    match export(out, config_path) {
        Ok(data) => {
            if mode.json {
                JsonResponse::ok("calendar", data).print();
            } else if !mode.quiet {
                println!("Saved calendar file to {}", data.path);
                println!("Google Calendar: {}", data.google_url);
            }
            Ok(0)
        }
        Err(e) => Ok(report_error("calendar", mode, &e)),
    }
}

fn export(out: Option<PathBuf>, config_path: Option<&Path>) -> anyhow::Result<CalendarData> {
    let session = open_session(config_path)?;
    let state = session
        .store
        .load()
        .map(|snapshot| snapshot.into_state())
        .ok_or(BookingError::NoTasterSelected)?;

    let clock = session.clock;
    let event = build_calendar_event(&state.taster, &session.config.clinic, clock.as_ref())
        .ok_or(BookingError::NoTasterSelected)?;

    let path = out.unwrap_or_else(|| PathBuf::from(ICS_FILENAME));
    let file = event.to_file(clock.now_utc());
    fs::write(&path, &file.contents)
        .map_err(BookingError::from)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "calendar file written");

    Ok(CalendarData {
        path: path.display().to_string(),
        google_url: event.google_calendar_url(),
    })
}
