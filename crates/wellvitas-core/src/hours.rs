//! Open-hours evaluation and the periodic "open now" watch
//!
//! The badge is advisory only. [`OpenHoursWatch`] re-evaluates it on a
//! background thread it owns; dropping the watch stops and joins the thread.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

use crate::clock::Clock;
use crate::config::ClinicConfig;
use crate::error::BookingError;

/// How often the watch re-evaluates
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// Monday to Saturday opening window, closing time exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenHours {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
}

impl OpenHours {
    pub fn from_config(clinic: &ClinicConfig) -> Result<Self, BookingError> {
        let (opens, closes) = clinic.opening_hours()?;
        Ok(Self { opens, closes })
    }

    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        if at.weekday() == Weekday::Sun {
            return false;
        }
        let t = at.time();
        t >= self.opens && t < self.closes
    }

    pub fn status_at(&self, at: NaiveDateTime) -> OpenStatus {
        if self.is_open_at(at) {
            OpenStatus::Open
        } else {
            OpenStatus::Closed
        }
    }

    /// e.g. `Mon–Sat · 9:00–20:00`
    pub fn describe(&self) -> String {
        format!(
            "Mon–Sat · {}–{}",
            self.opens.format("%-H:%M"),
            self.closes.format("%-H:%M")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    Open,
    Closed,
}

impl OpenStatus {
    pub fn is_open(self) -> bool {
        self == OpenStatus::Open
    }

    pub fn badge(self) -> &'static str {
        match self {
            OpenStatus::Open => "● Open now",
            OpenStatus::Closed => "○ Closed",
        }
    }
}

impl fmt::Display for OpenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge())
    }
}

/// Background task reporting open/closed changes
pub struct OpenHoursWatch {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl OpenHoursWatch {
    /// Evaluate immediately, then every `tick`. `on_change` runs on the
    /// watch thread for the first reading and whenever the status flips.
    pub fn spawn<F>(clock: Arc<dyn Clock>, hours: OpenHours, tick: Duration, mut on_change: F) -> Self
    where
        F: FnMut(OpenStatus) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let mut last: Option<OpenStatus> = None;
            loop {
                let status = hours.status_at(clock.local_now());
                if last != Some(status) {
                    tracing::debug!(%status, "open hours status changed");
                    on_change(status);
                    last = Some(status);
                }
                match stop_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the task and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("open hours watch panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for OpenHoursWatch {
    fn drop(&mut self) {
        self.stop();
    }
}
