//! wellvitas-core: Booking flow engine for the Wellvitas clinic
//!
//! This crate holds the booking wizard state machine, slot availability,
//! message and calendar builders, persistence and submission. Front-ends plug
//! in through [`interaction::InteractionAdapter`] and [`effects::Effects`].

/// Core error types for booking operations
pub mod error;

/// Configuration handling
pub mod config;

/// Core data types (BookingState, Stage, Package, etc.)
pub mod types;

/// Wall-clock and monotonic time sources
pub mod clock;

/// Taster slot availability
pub mod slots;

/// Per-stage validation rules
pub mod validation;

/// Summary message and deep links
pub mod message;

/// ICS and Google Calendar artifacts
pub mod calendar;

/// Snapshot persistence
pub mod storage;

/// The booking wizard state machine
pub mod flow;

/// Effectful dispatch of links and files
pub mod effects;

/// Submission coordinator and HTTP sink
pub mod submit;

/// Offline outbox sink and transactional emails
pub mod notify;

/// Open-hours badge and periodic watch
pub mod hours;

/// Front-end abstraction
pub mod interaction;

/// Interactive wizard driver
pub mod wizard;

// Re-exports for convenience
pub use calendar::{CalendarEvent, CalendarFile, build_calendar_event};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BookingConfig, ClinicConfig, Config, load_config};
pub use effects::{Effects, RecordingEffects};
pub use error::BookingError;
pub use flow::{BookingFlow, FlowEffect, Prefill, Transition};
pub use hours::{OpenHours, OpenHoursWatch, OpenStatus};
pub use message::{build_summary_message, mailto_link, whatsapp_link};
pub use notify::OutboxSink;
pub use slots::available_slots;
pub use storage::{Snapshot, SnapshotStore};
pub use submit::{
    BookingSubmission, HttpSink, SinkResponse, SubmissionSink, SubmitOptions, SubmitOutcome,
    submit_booking,
};
pub use types::{BookingState, Package, Payment, PreferredContact, Stage};
pub use wizard::{Wizard, WizardResult};
