//! Wall-clock and monotonic time sources
//!
//! Everything that depends on "now" takes a [`Clock`] so it can be exercised
//! with a [`ManualClock`] instead of the system time.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::ClinicConfig;
use crate::error::BookingError;

/// Source of the current time in the clinic's local timezone
pub trait Clock: Send + Sync {
    /// Current UTC instant
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the clinic's timezone
    fn local_now(&self) -> NaiveDateTime;

    /// Resolve a local wall-clock time to a UTC instant.
    ///
    /// Returns `None` for local times skipped by a DST transition.
    fn local_to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>>;

    /// Monotonic reading since an arbitrary fixed origin
    fn monotonic(&self) -> Duration;
}

/// The machine's clock read in the clinic's timezone.
///
/// The host's own zone is ignored so the open badge and same-day cutoff
/// follow the clinic wherever the CLI runs.
#[derive(Debug)]
pub struct SystemClock {
    zone: Tz,
    origin: Instant,
}

impl SystemClock {
    /// System clock in `Europe/London`
    pub fn new() -> Self {
        Self::in_zone(chrono_tz::Europe::London)
    }

    pub fn in_zone(zone: Tz) -> Self {
        Self {
            zone,
            origin: Instant::now(),
        }
    }

    pub fn from_config(clinic: &ClinicConfig) -> Result<Self, BookingError> {
        Ok(Self::in_zone(clinic.time_zone()?))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Wall-clock reading of `instant` in the clinic's zone
    pub fn local_at(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.zone).naive_local()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        self.local_at(Utc::now())
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    offset: FixedOffset,
    inner: Mutex<ManualState>,
}

#[derive(Debug, Clone, Copy)]
struct ManualState {
    local: NaiveDateTime,
    monotonic: Duration,
}

impl ManualClock {
    /// Start at `local` wall-clock time in a UTC+0 zone
    pub fn new(local: NaiveDateTime) -> Self {
        Self::with_offset(local, Utc.fix())
    }

    /// Start at `local` wall-clock time in the given fixed-offset zone
    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            offset,
            inner: Mutex::new(ManualState {
                local,
                monotonic: Duration::ZERO,
            }),
        }
    }

    /// Move both the wall clock and the monotonic clock forward
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.monotonic += by;
        if let Ok(step) = chrono::Duration::from_std(by) {
            state.local += step;
        }
    }

    /// Jump the wall clock without touching the monotonic clock
    pub fn set_local(&self, local: NaiveDateTime) {
        self.lock().local = local;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // A poisoned lock only means another test thread panicked mid-update
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let local = self.lock().local;
        self.local_to_utc(local)
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    fn local_now(&self) -> NaiveDateTime {
        self.lock().local
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn monotonic(&self) -> Duration {
        self.lock().monotonic
    }
}
