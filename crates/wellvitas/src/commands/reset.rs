//! Implementation of the `wellvitas reset` command

use std::path::Path;

use super::{OutputMode, open_session, report_error};
use crate::output::{JsonResponse, ResetData};

/// Delete the saved booking
pub fn run_reset(config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    let session = match open_session(config_path) {
        Ok(session) => session,
        Err(e) => return Ok(report_error("reset", mode, &e)),
    };
    let store = session.store;
    let removed = store.exists();

    if let Err(e) = store.clear() {
        return Ok(report_error("reset", mode, &anyhow::Error::new(e)));
    }

    let data = ResetData {
        path: store.path().display().to_string(),
        removed,
    };
    if mode.json {
        JsonResponse::ok("reset", data).print();
    } else if !mode.quiet {
        if removed {
            println!("Cleared saved booking");
        } else {
            println!("No saved booking to clear");
        }
    }
    Ok(0)
}
