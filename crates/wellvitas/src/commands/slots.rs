//! Implementation of the `wellvitas slots` command

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use wellvitas_core::types::BASE_SLOTS;
use wellvitas_core::{BookingConfig, BookingError, Clock, available_slots};

use super::{OutputMode, open_session, report_error};
use crate::output::{JsonResponse, SlotsData};

/// List bookable slots for `date` (today when omitted)
pub fn run_slots(date: Option<String>, config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    let session = match open_session(config_path) {
        Ok(session) => session,
        Err(e) => return Ok(report_error("slots", mode, &e)),
    };

    let now = session.clock.local_now();
    let data = match slots_for(date.as_deref(), now, &session.config.booking) {
        Ok(data) => data,
        Err(e) => return Ok(report_error("slots", mode, &anyhow::Error::new(e))),
    };

    if mode.json {
        JsonResponse::ok("slots", data).print();
    } else if !mode.quiet {
        if data.slots.is_empty() {
            println!("No taster times left on {}", data.date);
        } else {
            println!("Taster times on {}:", data.date);
            for slot in &data.slots {
                println!("  {}", slot);
            }
        }
    }
    Ok(0)
}

fn slots_for(date: Option<&str>, now: NaiveDateTime, booking: &BookingConfig) -> Result<SlotsData, BookingError> {
    let date = match date {
        Some(value) => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| BookingError::InvalidDate {
                value: value.to_string(),
            })?;
            value.to_string()
        }
        None => now.date().format("%Y-%m-%d").to_string(),
    };
    let slots = available_slots(&date, BASE_SLOTS, now, booking.lead_time());
    Ok(SlotsData { date, slots })
}
