//! Implementation of the `wellvitas book` command

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use wellvitas_core::{
    BookingError, BookingFlow, Clock, HttpSink, OpenHours, OutboxSink, Prefill, SubmissionSink,
    SubmitOptions, Wizard, WizardResult,
};

use super::{OutputMode, open_session, report_error};
use crate::cli::BookArgs;
use crate::interaction::{CliAdapter, TerminalEffects};
use crate::output::{BookData, JsonResponse};
use crate::splash::show_splash;

/// Run the booking wizard
pub fn run_book(args: BookArgs, config_path: Option<&Path>, mode: OutputMode) -> Result<i32, String> {
    let session = match open_session(config_path) {
        Ok(session) => session,
        Err(e) => return Ok(report_error("book", mode, &e)),
    };
    let config = session.config;
    let store = session.store;

    if args.fresh {
        if let Err(e) = store.clear() {
            return Ok(report_error("book", mode, &anyhow::Error::new(e).context("discarding saved booking")));
        }
    }

    let adapter = CliAdapter::new();
    if !adapter.is_tty() {
        let err = anyhow::Error::new(BookingError::Interaction(
            "the booking wizard needs an interactive terminal".to_string(),
        ));
        return Ok(report_error("book", mode, &err));
    }

    let clock: Arc<dyn Clock> = session.clock;
    if mode.human() {
        let status = OpenHours::from_config(&config.clinic)
            .ok()
            .map(|hours| hours.status_at(clock.local_now()));
        show_splash(&config.clinic, status);
    }

    let prefill = Prefill {
        service: args.service,
        name: args.name,
        email: args.email,
        phone: args.phone,
    };
    let mut flow = BookingFlow::mount(clock, Some(store.clone()), &config.booking, &prefill);

    let outbox_dir = args.outbox.or_else(|| config.booking.outbox_dir.clone());
    let sink: Box<dyn SubmissionSink> = match &outbox_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using offline outbox");
            Box::new(OutboxSink::new(dir, config.clinic.clone()))
        }
        None => Box::new(HttpSink::from_config(&config.booking)),
    };

    let download_dir = match std::env::current_dir().context("resolving current directory") {
        Ok(dir) => dir,
        Err(e) => return Ok(report_error("book", mode, &e)),
    };
    let mut effects = TerminalEffects::new(&download_dir, !mode.json);
    let options = SubmitOptions::from_config(&config.booking);

    let result = Wizard {
        adapter: &adapter,
        sink: sink.as_ref(),
        effects: &mut effects,
        clinic: &config.clinic,
        options: &options,
    }
    .run(&mut flow);

    let taster = &flow.state().taster;
    let data = |result: &str, snapshot: Option<String>| BookData {
        result: result.to_string(),
        date: taster.date.clone(),
        time: taster.time.clone(),
        links: effects.opened().to_vec(),
        snapshot,
    };

    match result {
        Ok(WizardResult::Submitted) => {
            if mode.json {
                JsonResponse::ok("book", data("submitted", None)).print();
            }
            Ok(0)
        }
        Ok(WizardResult::Saved) => {
            let snapshot = store.path().display().to_string();
            if mode.json {
                JsonResponse::ok("book", data("saved", Some(snapshot))).print();
            } else if !mode.quiet {
                println!("Progress saved. Run `wellvitas book` to pick up where you left off.");
            }
            Ok(0)
        }
        Err(BookingError::Cancelled) => {
            if !mode.json {
                eprintln!("Booking cancelled. Your progress is saved.");
            }
            Ok(BookingError::Cancelled.exit_code())
        }
        Err(e) => Ok(report_error("book", mode, &anyhow::Error::new(e))),
    }
}
