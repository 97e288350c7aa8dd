//! Implementation of the `wellvitas hours` command

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wellvitas_core::hours::DEFAULT_TICK;
use wellvitas_core::{Clock, OpenHours, OpenHoursWatch, OpenStatus};

use super::{OutputMode, open_session, report_error};
use crate::colors::styled_badge;
use crate::interaction::{is_cancelled, setup_ctrl_c_handler};
use crate::output::{HoursData, JsonResponse};

/// Show the open/closed badge, optionally following it until Ctrl+C
pub fn run_hours(watch: bool, config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    let session = match open_session(config_path) {
        Ok(session) => session,
        Err(e) => return Ok(report_error("hours", mode, &e)),
    };
    let hours = match OpenHours::from_config(&session.config.clinic) {
        Ok(hours) => hours,
        Err(e) => return Ok(report_error("hours", mode, &anyhow::Error::new(e))),
    };
    let clock: Arc<dyn Clock> = session.clock.clone();

    if !watch {
        emit(mode, &hours, hours.status_at(clock.local_now()), false);
        return Ok(0);
    }

    setup_ctrl_c_handler();
    let mut watcher = OpenHoursWatch::spawn(clock, hours, DEFAULT_TICK, move |status| {
        emit(mode, &hours, status, true);
    });
    while !is_cancelled() {
        thread::sleep(Duration::from_millis(200));
    }
    watcher.stop();
    Ok(0)
}

fn emit(mode: OutputMode, hours: &OpenHours, status: OpenStatus, streaming: bool) {
    let data = HoursData {
        open: status.is_open(),
        badge: status.badge().to_string(),
        hours: hours.describe(),
    };
    if mode.json {
        let response = JsonResponse::ok("hours", data);
        // one object per line while following
        if streaming {
            match serde_json::to_string(&response) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("error: failed to encode JSON output: {}", e),
            }
        } else {
            response.print();
        }
    } else if !mode.quiet {
        println!("{}  {}", styled_badge(status), data.hours);
    }
}
