//! Interactive driver for [`BookingFlow`]
//!
//! Renders one stage at a time through an [`InteractionAdapter`], applies the
//! answers to the flow and handles navigation. Stage rules, slot selection and
//! submission stay in the flow and the coordinator.

use chrono::{Duration as ChronoDuration, NaiveDate};

use crate::config::ClinicConfig;
use crate::effects::{Effects, offer_calendar_file, open_google_calendar};
use crate::error::BookingError;
use crate::flow::{BookingFlow, FlowEffect, Transition};
use crate::interaction::InteractionAdapter;
use crate::submit::{SubmissionSink, SubmitOptions, SubmitOutcome, submit_booking};
use crate::types::{
    CONDITION_OPTIONS, Package, Payment, PreferredContact, Programme, Stage, THERAPY_OPTIONS,
};

pub const NAV_CONTINUE: &str = "Continue";
pub const NAV_BACK: &str = "Back";
pub const NAV_SUBMIT: &str = "Submit booking";
pub const NAV_ICS: &str = "Download calendar file (.ics)";
pub const NAV_GOOGLE: &str = "Add to Google Calendar";
pub const NAV_SAVE: &str = "Save and exit";
pub const NAV_DONE: &str = "Done";

pub const CONSENT_PROMPT: &str =
    "I agree to be contacted about this booking and accept the privacy notice";

/// How the wizard ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardResult {
    Submitted,
    /// Left early; the snapshot keeps the progress
    Saved,
}

/// Everything the wizard needs besides the flow itself
pub struct Wizard<'a> {
    pub adapter: &'a dyn InteractionAdapter,
    pub sink: &'a dyn SubmissionSink,
    pub effects: &'a mut dyn Effects,
    pub clinic: &'a ClinicConfig,
    pub options: &'a SubmitOptions,
}

enum Nav {
    Continue,
    Back,
    Submit,
    Ics,
    Google,
    Save,
}

/// `Step 3 of 5 · Taster (50%)`
pub fn stage_heading(stage: Stage) -> String {
    format!(
        "Step {} of {} · {} ({}%)",
        stage.index() + 1,
        Stage::ALL.len(),
        stage.label(),
        stage.progress_percent()
    )
}

impl Wizard<'_> {
    /// Drive `flow` until it is submitted or the user saves and exits
    pub fn run(&mut self, flow: &mut BookingFlow) -> Result<WizardResult, BookingError> {
        loop {
            if flow.is_submitted() {
                return Ok(WizardResult::Submitted);
            }

            let stage = flow.stage();
            self.adapter.print_header(&stage_heading(stage));
            for error in flow.errors() {
                self.adapter.print_error(error);
            }

            match stage {
                Stage::Enquiry => self.enquiry(flow)?,
                Stage::Screening => self.screening(flow)?,
                Stage::Taster => self.taster(flow)?,
                Stage::Programme => self.programme(flow)?,
                Stage::Review => self.review(flow)?,
            }

            match self.navigation(stage)? {
                Nav::Continue => self.apply(flow.advance()),
                Nav::Back => self.apply(flow.retreat()),
                Nav::Submit => self.submit(flow)?,
                Nav::Ics => self.download_calendar(flow),
                Nav::Google => self.google_calendar(flow),
                Nav::Save => return Ok(WizardResult::Saved),
            }
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Moved {
                effect: FlowEffect::FocusContainer,
                ..
            } => self.effects.focus_container(),
            // errors are rendered at the top of the next pass
            Transition::Blocked { .. } => {}
        }
    }

    fn navigation(&self, stage: Stage) -> Result<Nav, BookingError> {
        let mut choices: Vec<(&str, Nav)> = Vec::new();
        if stage == Stage::Review {
            choices.push((NAV_SUBMIT, Nav::Submit));
            choices.push((NAV_ICS, Nav::Ics));
            choices.push((NAV_GOOGLE, Nav::Google));
        } else {
            choices.push((NAV_CONTINUE, Nav::Continue));
        }
        if stage != Stage::Enquiry {
            choices.push((NAV_BACK, Nav::Back));
        }
        choices.push((NAV_SAVE, Nav::Save));

        let labels: Vec<&str> = choices.iter().map(|(label, _)| *label).collect();
        let picked = self.adapter.ask_select("What next?", &labels, 0)?;
        if picked >= choices.len() {
            return Err(BookingError::Interaction(format!(
                "selection {} out of range",
                picked
            )));
        }
        Ok(choices.swap_remove(picked).1)
    }

    // === Stages ===

    fn enquiry(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        let current = flow.state().enquiry.clone();

        let name = self.adapter.ask_text("Full name", non_empty(&current.name))?;
        flow.set_name(name.trim());
        let email = self.adapter.ask_text("Email", non_empty(&current.email))?;
        flow.set_email(email.trim());
        let phone = self.adapter.ask_text("Phone", non_empty(&current.phone))?;
        flow.set_phone(phone.trim());

        let contact_default = match current.preferred_contact {
            PreferredContact::Whatsapp => 0,
            PreferredContact::Email => 1,
        };
        let contact = self.adapter.ask_select(
            "How should we contact you?",
            &["WhatsApp", "Email"],
            contact_default,
        )?;
        flow.set_preferred_contact(if contact == 1 {
            PreferredContact::Email
        } else {
            PreferredContact::Whatsapp
        });

        let checked = checked_flags(THERAPY_OPTIONS, &current.therapies);
        let picked = self
            .adapter
            .ask_multi_select("Therapies you are interested in", THERAPY_OPTIONS, &checked)?;
        sync_selection(THERAPY_OPTIONS, &checked, &picked, |option| {
            flow.toggle_therapy(option)
        });
        Ok(())
    }

    fn screening(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        let current = flow.state().screening.clone();

        let checked = checked_flags(CONDITION_OPTIONS, &current.conditions);
        let picked = self.adapter.ask_multi_select(
            "Do any of these apply to you?",
            CONDITION_OPTIONS,
            &checked,
        )?;
        sync_selection(CONDITION_OPTIONS, &checked, &picked, |option| {
            flow.toggle_condition(option)
        });

        let notes = self
            .adapter
            .ask_text("Anything else we should know?", non_empty(&current.notes))?;
        flow.set_notes(notes.trim());
        Ok(())
    }

    fn taster(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        let today = flow.clock().local_now().date();
        let suggested = suggested_date(flow, today);

        let answer = self
            .adapter
            .ask_text("Taster date (YYYY-MM-DD)", Some(&suggested))?;
        let answer = answer.trim();
        match NaiveDate::parse_from_str(answer, "%Y-%m-%d") {
            Ok(date) if date < today => {
                self.adapter.print_warning("Choose today or a later date.");
                return Ok(());
            }
            Ok(_) => flow.set_date(answer),
            Err(_) => {
                self.adapter.print_warning("Enter the date as YYYY-MM-DD.");
                return Ok(());
            }
        }

        let slots = flow.available_slots();
        if slots.is_empty() {
            self.adapter
                .print_warning("No times left on this date. Please choose another day.");
            return Ok(());
        }
        let labels: Vec<&str> = slots.iter().map(String::as_str).collect();
        let current = &flow.state().taster.time;
        let default = slots.iter().position(|s| s == current).unwrap_or(0);
        let picked = self.adapter.ask_select("Taster time", &labels, default)?;
        if let Some(time) = slots.get(picked) {
            flow.set_time(time);
        }
        Ok(())
    }

    fn programme(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        let current = flow.state().programme;

        let labels: Vec<String> = Package::ALL
            .iter()
            .map(|package| {
                let priced = Programme {
                    package: *package,
                    payment: Payment::Payg,
                };
                format!("{} · {}", package.describe(), priced.price_label())
            })
            .collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let default = Package::ALL
            .iter()
            .position(|p| *p == current.package)
            .unwrap_or(0);
        let picked = self.adapter.ask_select("Programme", &labels, default)?;
        if let Some(package) = Package::ALL.get(picked) {
            flow.set_package(*package);
        }

        let payments = [Payment::Payg, Payment::Plan];
        let labels: Vec<&str> = payments.iter().map(|p| p.describe()).collect();
        let default = usize::from(current.payment == Payment::Plan);
        let picked = self.adapter.ask_select("Payment", &labels, default)?;
        if let Some(payment) = payments.get(picked) {
            flow.set_payment(*payment);
        }
        Ok(())
    }

    fn review(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        self.adapter.print_info(&flow.summary_message());
        self.adapter.print_info(&format!(
            "Price: {}",
            flow.state().programme.price_label()
        ));

        let accepted = self
            .adapter
            .ask_confirm(CONSENT_PROMPT, flow.state().accepted)?;
        flow.set_accepted(accepted);
        Ok(())
    }

    // === Actions ===

    fn submit(&mut self, flow: &mut BookingFlow) -> Result<(), BookingError> {
        let progress = self.adapter.start_progress("Sending your booking");
        let outcome = submit_booking(
            flow,
            self.sink,
            &mut *self.effects,
            self.clinic,
            self.options,
        );
        self.adapter
            .end_progress(progress, outcome == SubmitOutcome::Submitted);

        match outcome {
            SubmitOutcome::Submitted => {
                self.adapter.print_success(
                    "Thanks! Your booking request has been sent. We'll be in touch to confirm.",
                );
                self.after_submit(flow)?;
            }
            // Invalid, Rejected and Failed leave their messages on the flow;
            // Ignored shows nothing at all.
            SubmitOutcome::Ignored
            | SubmitOutcome::Invalid(_)
            | SubmitOutcome::Rejected(_)
            | SubmitOutcome::Failed(_) => {}
        }
        Ok(())
    }

    fn after_submit(&mut self, flow: &BookingFlow) -> Result<(), BookingError> {
        loop {
            let picked = self.adapter.ask_select(
                "Add the taster to your calendar?",
                &[NAV_ICS, NAV_GOOGLE, NAV_DONE],
                2,
            )?;
            match picked {
                0 => self.download_calendar(flow),
                1 => self.google_calendar(flow),
                _ => return Ok(()),
            }
        }
    }

    fn download_calendar(&mut self, flow: &BookingFlow) {
        match offer_calendar_file(flow, self.clinic, &mut *self.effects) {
            Ok(true) => {}
            Ok(false) => self
                .adapter
                .print_warning("Choose a taster date and time first."),
            Err(e) => self.adapter.print_error(&e.to_string()),
        }
    }

    fn google_calendar(&mut self, flow: &BookingFlow) {
        if !open_google_calendar(flow, self.clinic, &mut *self.effects) {
            self.adapter
                .print_warning("Choose a taster date and time first.");
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

fn checked_flags(options: &[&str], selected: &[String]) -> Vec<bool> {
    options
        .iter()
        .map(|option| selected.iter().any(|s| s == option))
        .collect()
}

/// Toggle every option whose checked state differs from the new selection
fn sync_selection(options: &[&str], checked: &[bool], picked: &[usize], mut toggle: impl FnMut(&str)) {
    for (index, option) in options.iter().enumerate() {
        let now_checked = picked.contains(&index);
        if checked.get(index).copied().unwrap_or(false) != now_checked {
            toggle(option);
        }
    }
}

/// Saved date, else today while it still has slots, else tomorrow
fn suggested_date(flow: &BookingFlow, today: NaiveDate) -> String {
    let saved = &flow.state().taster.date;
    if !saved.is_empty() {
        return saved.clone();
    }
    let today_str = today.format("%Y-%m-%d").to_string();
    let has_slots_today = !crate::slots::available_slots(
        &today_str,
        crate::types::BASE_SLOTS,
        flow.clock().local_now(),
        flow.lead_time(),
    )
    .is_empty();
    if has_slots_today {
        today_str
    } else {
        (today + ChronoDuration::days(1))
            .format("%Y-%m-%d")
            .to_string()
    }
}
