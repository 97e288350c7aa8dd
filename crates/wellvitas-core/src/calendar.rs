//! Calendar artifacts for a booked taster
//!
//! A [`CalendarEvent`] is derived once from the taster date and time; both the
//! ICS document and the Google Calendar link render from its `start`/`end`.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::ClinicConfig;
use crate::message::encode_component;
use crate::types::Taster;

/// Taster length
pub const EVENT_MINUTES: i64 = 30;

pub const EVENT_TITLE: &str = "Wellvitas – Free Taster";
pub const EVENT_DESCRIPTION: &str = "Free taster session booked via wellvitas.co.uk";
pub const ICS_MIME: &str = "text/calendar;charset=utf-8";
pub const ICS_FILENAME: &str = "wellvitas-taster.ics";

const GOOGLE_RENDER_URL: &str = "https://calendar.google.com/calendar/render?action=TEMPLATE";

/// A 30-minute taster appointment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub location: String,
    pub description: String,
    /// Domain suffix for generated UIDs
    pub uid_domain: String,
}

/// A downloadable calendar document
#[derive(Debug, Clone)]
pub struct CalendarFile {
    pub filename: String,
    pub mime: &'static str,
    pub contents: String,
}

/// Build the taster event, or `None` when no complete slot is chosen
pub fn build_calendar_event(
    taster: &Taster,
    clinic: &ClinicConfig,
    clock: &dyn Clock,
) -> Option<CalendarEvent> {
    let local_start = taster.start()?;
    let start = clock.local_to_utc(local_start)?;
    Some(CalendarEvent {
        start,
        end: start + Duration::minutes(EVENT_MINUTES),
        title: EVENT_TITLE.to_string(),
        location: clinic.address.clone(),
        description: EVENT_DESCRIPTION.to_string(),
        uid_domain: clinic.site_domain.clone(),
    })
}

/// `YYYYMMDDTHHMMSSZ`
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

impl CalendarEvent {
    /// Render an iCalendar document with a fresh UID, stamped at `stamp`
    pub fn to_ics(&self, stamp: DateTime<Utc>) -> String {
        [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Wellvitas//Booking//EN".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}@{}", Uuid::new_v4(), self.uid_domain),
            format!("DTSTAMP:{}", format_utc(stamp)),
            format!("DTSTART:{}", format_utc(self.start)),
            format!("DTEND:{}", format_utc(self.end)),
            format!("SUMMARY:{}", self.title),
            format!("LOCATION:{}", self.location),
            format!("DESCRIPTION:{}", self.description),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ]
        .join("\r\n")
    }

    /// ICS payload ready to be offered as a download
    pub fn to_file(&self, stamp: DateTime<Utc>) -> CalendarFile {
        CalendarFile {
            filename: ICS_FILENAME.to_string(),
            mime: ICS_MIME,
            contents: self.to_ics(stamp),
        }
    }

    /// Google Calendar compose link for the same event
    pub fn google_calendar_url(&self) -> String {
        format!(
            "{}&text={}&dates={}/{}&location={}&details={}",
            GOOGLE_RENDER_URL,
            encode_component(&self.title),
            format_utc(self.start),
            format_utc(self.end),
            encode_component(&self.location),
            encode_component(&self.description)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{FixedOffset, NaiveDate};

    fn clock() -> ManualClock {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        // BST
        ManualClock::with_offset(now, FixedOffset::east_opt(3600).unwrap())
    }

    fn taster() -> Taster {
        Taster {
            date: "2026-10-20".to_string(),
            time: "11:00".to_string(),
        }
    }

    #[test]
    fn test_no_event_without_date() {
        let t = Taster {
            date: String::new(),
            time: "11:00".to_string(),
        };
        assert!(build_calendar_event(&t, &ClinicConfig::default(), &clock()).is_none());
    }

    #[test]
    fn test_no_event_without_time() {
        let t = Taster {
            date: "2026-10-20".to_string(),
            time: String::new(),
        };
        assert!(build_calendar_event(&t, &ClinicConfig::default(), &clock()).is_none());
    }

    #[test]
    fn test_event_is_thirty_minutes_in_utc() {
        let event = build_calendar_event(&taster(), &ClinicConfig::default(), &clock()).unwrap();
        assert_eq!(format_utc(event.start), "20261020T100000Z");
        assert_eq!(format_utc(event.end), "20261020T103000Z");
        assert_eq!(event.location, "1620 Great Western Rd, Anniesland, Glasgow G13 1HH");
    }

    #[test]
    fn test_ics_layout() {
        let clock = clock();
        let event = build_calendar_event(&taster(), &ClinicConfig::default(), &clock).unwrap();
        let ics = event.to_ics(clock.now_utc());
        let lines: Vec<&str> = ics.split("\r\n").collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert!(lines[4].starts_with("UID:") && lines[4].ends_with("@wellvitas.co.uk"));
        assert_eq!(lines[5], "DTSTAMP:20261019T110000Z");
        assert_eq!(lines[6], "DTSTART:20261020T100000Z");
        assert_eq!(lines[7], "DTEND:20261020T103000Z");
        assert_eq!(lines[8], "SUMMARY:Wellvitas – Free Taster");
        assert_eq!(lines[12], "END:VCALENDAR");
        assert!(!ics.contains("\n\n"));
    }

    #[test]
    fn test_ics_only_uid_varies() {
        let clock = clock();
        let event = build_calendar_event(&taster(), &ClinicConfig::default(), &clock).unwrap();
        let stamp = clock.now_utc();
        let a = event.to_ics(stamp);
        let b = event.to_ics(stamp);
        assert_ne!(a, b);
        let strip = |s: &str| {
            s.split("\r\n")
                .filter(|l| !l.starts_with("UID:"))
                .collect::<Vec<_>>()
                .join("\r\n")
        };
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn test_google_url_matches_ics_times() {
        let event = build_calendar_event(&taster(), &ClinicConfig::default(), &clock()).unwrap();
        let url = event.google_calendar_url();
        assert!(url.starts_with(GOOGLE_RENDER_URL));
        assert!(url.contains("&dates=20261020T100000Z/20261020T103000Z"));
        assert!(url.contains("&text=Wellvitas%20%E2%80%93%20Free%20Taster"));
        assert!(url.contains("&location=1620%20Great%20Western%20Rd%2C"));
    }

    #[test]
    fn test_calendar_file() {
        let clock = clock();
        let event = build_calendar_event(&taster(), &ClinicConfig::default(), &clock).unwrap();
        let file = event.to_file(clock.now_utc());
        assert_eq!(file.filename, "wellvitas-taster.ics");
        assert_eq!(file.mime, "text/calendar;charset=utf-8");
        assert!(file.contents.starts_with("BEGIN:VCALENDAR\r\n"));
    }
}
