//! Effectful dispatch of booking artifacts
//!
//! Builders in [`crate::message`] and [`crate::calendar`] are pure; opening
//! links, offering downloads and pausing go through [`Effects`] so front-ends
//! decide what those mean.

use std::time::Duration;

use crate::calendar::CalendarFile;
use crate::config::ClinicConfig;
use crate::error::BookingError;
use crate::flow::BookingFlow;

pub trait Effects {
    /// Hand a URL to whatever opens links (browser, messenger, mail client)
    fn open_url(&mut self, url: &str);

    /// Offer a generated file to the user
    fn offer_download(&mut self, file: &CalendarFile) -> Result<(), BookingError>;

    /// Bring the top of the wizard back into view
    fn focus_container(&mut self) {}

    /// Wait between two effects
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Offer the taster's ICS file; `Ok(false)` when no slot is chosen
pub fn offer_calendar_file(
    flow: &BookingFlow,
    clinic: &ClinicConfig,
    effects: &mut dyn Effects,
) -> Result<bool, BookingError> {
    let Some(event) = flow.calendar_event(clinic) else {
        return Ok(false);
    };
    effects.offer_download(&event.to_file(flow.clock().now_utc()))?;
    Ok(true)
}

/// Open the Google Calendar compose page; `false` when no slot is chosen
pub fn open_google_calendar(
    flow: &BookingFlow,
    clinic: &ClinicConfig,
    effects: &mut dyn Effects,
) -> bool {
    match flow.calendar_event(clinic) {
        Some(event) => {
            effects.open_url(&event.google_calendar_url());
            true
        }
        None => false,
    }
}

/// Records effects instead of performing them
#[derive(Debug, Default)]
pub struct RecordingEffects {
    pub opened: Vec<String>,
    pub downloads: Vec<CalendarFile>,
    pub pauses: Vec<Duration>,
    pub focus_count: usize,
}

impl Effects for RecordingEffects {
    fn open_url(&mut self, url: &str) {
        self.opened.push(url.to_string());
    }

    fn offer_download(&mut self, file: &CalendarFile) -> Result<(), BookingError> {
        self.downloads.push(file.clone());
        Ok(())
    }

    fn focus_container(&mut self) {
        self.focus_count += 1;
    }

    fn pause(&mut self, delay: Duration) {
        self.pauses.push(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::BookingConfig;
    use crate::flow::Prefill;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn flow() -> BookingFlow {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        BookingFlow::mount(
            Arc::new(ManualClock::new(now)),
            None,
            &BookingConfig::default(),
            &Prefill::default(),
        )
    }

    #[test]
    fn test_no_calendar_without_slot() {
        let flow = flow();
        let mut effects = RecordingEffects::default();
        let clinic = ClinicConfig::default();
        assert!(!offer_calendar_file(&flow, &clinic, &mut effects).unwrap());
        assert!(!open_google_calendar(&flow, &clinic, &mut effects));
        assert!(effects.downloads.is_empty());
        assert!(effects.opened.is_empty());
    }

    #[test]
    fn test_calendar_dispatch() {
        let mut flow = flow();
        flow.set_date("2026-10-20");
        let mut effects = RecordingEffects::default();
        let clinic = ClinicConfig::default();
        assert!(offer_calendar_file(&flow, &clinic, &mut effects).unwrap());
        assert!(open_google_calendar(&flow, &clinic, &mut effects));
        assert_eq!(effects.downloads.len(), 1);
        assert!(effects.downloads[0].contents.contains("DTSTART:20261020T093000Z"));
        assert!(effects.opened[0].contains("dates=20261020T093000Z/20261020T100000Z"));
    }
}
