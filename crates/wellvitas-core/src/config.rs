//! Configuration handling for the booking engine

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "wellvitas.toml";

/// Longest accepted same-day lead time (one day)
pub const MAX_LEAD_TIME_MINUTES: i64 = 24 * 60;

/// Wellvitas configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Clinic identity and contact channels
    #[serde(default)]
    pub clinic: ClinicConfig,

    /// Booking flow and submission settings
    #[serde(default)]
    pub booking: BookingConfig,
}

/// Clinic identity used in messages, links and calendar events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// Display name
    #[serde(default = "default_clinic_name")]
    pub name: String,

    /// Physical address, used as the calendar event location
    #[serde(default = "default_address")]
    pub address: String,

    /// WhatsApp number in international format without '+'
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,

    /// Mailbox that receives booking enquiries
    #[serde(default = "default_mail_to")]
    pub mail_to: String,

    /// Public site domain, used in calendar UIDs
    #[serde(default = "default_site_domain")]
    pub site_domain: String,

    /// Opening time, Monday to Saturday (HH:MM)
    #[serde(default = "default_opening_time")]
    pub opening_time: String,

    /// Closing time, Monday to Saturday (HH:MM, exclusive)
    #[serde(default = "default_closing_time")]
    pub closing_time: String,

    /// IANA zone the clinic's wall clock runs in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_clinic_name() -> String {
    "Wellvitas".to_string()
}

fn default_address() -> String {
    "1620 Great Western Rd, Anniesland, Glasgow G13 1HH".to_string()
}

fn default_whatsapp_number() -> String {
    "447379005856".to_string()
}

fn default_mail_to() -> String {
    "info@wellvitas.co.uk".to_string()
}

fn default_site_domain() -> String {
    "wellvitas.co.uk".to_string()
}

fn default_opening_time() -> String {
    "09:00".to_string()
}

fn default_closing_time() -> String {
    "20:00".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
            address: default_address(),
            whatsapp_number: default_whatsapp_number(),
            mail_to: default_mail_to(),
            site_domain: default_site_domain(),
            opening_time: default_opening_time(),
            closing_time: default_closing_time(),
            timezone: default_timezone(),
        }
    }
}

impl ClinicConfig {
    /// Parse the configured opening window
    pub fn opening_hours(&self) -> Result<(NaiveTime, NaiveTime), BookingError> {
        Ok((
            parse_time_of_day(&self.opening_time)?,
            parse_time_of_day(&self.closing_time)?,
        ))
    }

    /// Parse the configured timezone name
    pub fn time_zone(&self) -> Result<Tz, BookingError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| BookingError::InvalidTimezone {
                value: self.timezone.clone(),
            })
    }
}

/// Booking flow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Endpoint receiving booking submissions as JSON
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upper bound for a single submission request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between opening the WhatsApp link and the mail link
    #[serde(default = "default_follow_up_delay_ms")]
    pub follow_up_delay_ms: u64,

    /// Minimum time between mount and submit before a submission is sent
    #[serde(default = "default_min_dwell_secs")]
    pub min_dwell_secs: u64,

    /// Lead time required before a same-day slot
    #[serde(default = "default_lead_time_minutes")]
    pub lead_time_minutes: i64,

    /// Directory holding the in-progress snapshot (platform data dir if unset)
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Write submissions to this directory instead of calling the endpoint
    #[serde(default)]
    pub outbox_dir: Option<PathBuf>,
}

fn default_endpoint() -> String {
    "https://wellvitas.co.uk/api/booking".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_follow_up_delay_ms() -> u64 {
    400
}

fn default_min_dwell_secs() -> u64 {
    10
}

fn default_lead_time_minutes() -> i64 {
    15
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            follow_up_delay_ms: default_follow_up_delay_ms(),
            min_dwell_secs: default_min_dwell_secs(),
            lead_time_minutes: default_lead_time_minutes(),
            storage_dir: None,
            outbox_dir: None,
        }
    }
}

impl BookingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }

    pub fn min_dwell(&self) -> Duration {
        Duration::from_secs(self.min_dwell_secs)
    }

    /// Same-day lead time; values beyond chrono's range saturate
    pub fn lead_time(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.lead_time_minutes).unwrap_or(if self.lead_time_minutes < 0 {
            chrono::Duration::MIN
        } else {
            chrono::Duration::MAX
        })
    }
}

/// Parse an `HH:MM` string
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, BookingError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| BookingError::InvalidTimeOfDay {
        value: value.to_string(),
    })
}

/// Default config path: `<config dir>/wellvitas/wellvitas.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wellvitas").join(CONFIG_FILE_NAME))
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file yields the built-in defaults. An explicitly given path that
/// does not exist is still treated as "use defaults" so first runs work.
pub fn load_config(path: Option<&Path>) -> Result<Config, BookingError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content).map_err(|e| BookingError::InvalidConfig {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    // Surface bad values at load time rather than on first use
    config.clinic.opening_hours()?;
    config.clinic.time_zone()?;
    if !(0..=MAX_LEAD_TIME_MINUTES).contains(&config.booking.lead_time_minutes) {
        return Err(BookingError::InvalidConfig {
            path: path.display().to_string(),
            message: format!(
                "booking.lead_time_minutes must be between 0 and {}, got {}",
                MAX_LEAD_TIME_MINUTES, config.booking.lead_time_minutes
            ),
        });
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.clinic.whatsapp_number, "447379005856");
        assert_eq!(config.booking.min_dwell(), Duration::from_secs(10));
        assert_eq!(config.booking.lead_time(), chrono::Duration::minutes(15));
        assert_eq!(config.booking.follow_up_delay(), Duration::from_millis(400));
        assert!(config.booking.storage_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[booking]
endpoint = "http://localhost:3000/api/booking"
min_dwell_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(config.booking.endpoint, "http://localhost:3000/api/booking");
        assert_eq!(config.booking.min_dwell_secs, 0);
        assert_eq!(config.booking.request_timeout_secs, 15);
        assert_eq!(config.clinic.mail_to, "info@wellvitas.co.uk");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = load_config(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.clinic.name, "Wellvitas");
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wellvitas.toml");
        fs::write(&path, "[booking\nendpoint = 1").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[test]
    fn test_load_rejects_bad_opening_hours() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wellvitas.toml");
        fs::write(&path, "[clinic]\nopening_time = \"9am\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTimeOfDay { .. }));
    }

    #[test]
    fn test_load_rejects_out_of_range_lead_time() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wellvitas.toml");
        for value in ["-1", "1441", "9223372036854775807"] {
            fs::write(&path, format!("[booking]\nlead_time_minutes = {}\n", value)).unwrap();
            let err = load_config(Some(&path)).unwrap_err();
            assert_eq!(err.code(), "E001", "lead_time_minutes = {}", value);
            assert_eq!(err.exit_code(), 4);
        }

        fs::write(&path, "[booking]\nlead_time_minutes = 1440\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().booking.lead_time_minutes, 1440);
    }

    #[test]
    fn test_lead_time_saturates_instead_of_panicking() {
        let booking = BookingConfig {
            lead_time_minutes: i64::MAX,
            ..BookingConfig::default()
        };
        assert_eq!(booking.lead_time(), chrono::Duration::MAX);

        let booking = BookingConfig {
            lead_time_minutes: i64::MIN,
            ..BookingConfig::default()
        };
        assert_eq!(booking.lead_time(), chrono::Duration::MIN);
    }

    #[test]
    fn test_timezone_default_and_rejection() {
        assert_eq!(ClinicConfig::default().time_zone().unwrap(), chrono_tz::Europe::London);

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wellvitas.toml");
        fs::write(&path, "[clinic]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code(), "E003");
        assert_eq!(err.exit_code(), 4);
    }
}
