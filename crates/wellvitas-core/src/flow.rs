//! The five-stage booking wizard
//!
//! [`BookingFlow`] owns the [`BookingState`] for one session. Every mutation
//! goes through it so the persisted snapshot and the taster slot stay in step
//! with the state.

use std::sync::Arc;
use std::time::Duration;

use crate::calendar::{CalendarEvent, build_calendar_event};
use crate::clock::Clock;
use crate::config::{BookingConfig, ClinicConfig};
use crate::message::build_summary_message;
use crate::slots::{available_slots, reconcile_time};
use crate::storage::{Snapshot, SnapshotStore};
use crate::types::{
    BASE_SLOTS, BookingState, Package, Payment, PreferredContact, Stage, THERAPY_OPTIONS, toggle_in,
};
use crate::validation::validate_stage;

/// Values passed in by a deep link when the flow mounts
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub service: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Prefill {
    fn apply(&self, state: &mut BookingState) -> bool {
        let before = state.enquiry.clone();
        if let Some(name) = &self.name {
            state.enquiry.name = name.clone();
        }
        if let Some(email) = &self.email {
            state.enquiry.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            state.enquiry.phone = phone.clone();
        }
        if let Some(service) = &self.service {
            let known = THERAPY_OPTIONS.contains(&service.as_str());
            if known && !state.enquiry.therapies.contains(service) {
                state.enquiry.therapies.push(service.clone());
            }
        }
        state.enquiry != before
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEffect {
    /// Bring the top of the wizard back into view
    FocusContainer,
}

/// Result of a stage transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved { to: Stage, effect: FlowEffect },
    Blocked { errors: Vec<String> },
}

/// One booking session
pub struct BookingFlow {
    state: BookingState,
    clock: Arc<dyn Clock>,
    store: Option<SnapshotStore>,
    lead: chrono::Duration,
    started_at: Duration,
    honeypot: String,
    submitting: bool,
    submitted: bool,
}

impl BookingFlow {
    /// Start a session, restoring any saved snapshot and applying `prefill`.
    ///
    /// The dwell-time origin is taken here and never reset afterwards.
    pub fn mount(
        clock: Arc<dyn Clock>,
        store: Option<SnapshotStore>,
        config: &BookingConfig,
        prefill: &Prefill,
    ) -> Self {
        let restored = store.as_ref().and_then(SnapshotStore::load);
        let was_restored = restored.is_some();
        let mut state = restored.map(Snapshot::into_state).unwrap_or_default();

        let prefilled = prefill.apply(&mut state);
        let started_at = clock.monotonic();

        let mut flow = Self {
            state,
            clock,
            store,
            lead: config.lead_time(),
            started_at,
            honeypot: String::new(),
            submitting: false,
            submitted: false,
        };
        let reselected = flow.refresh_slot();

        tracing::debug!(
            restored = was_restored,
            stage = %flow.state.stage,
            prefilled,
            "booking flow mounted"
        );
        // refresh_slot already wrote the snapshot when it reselected
        if prefilled && !reselected {
            flow.persist();
        }
        flow
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn errors(&self) -> &[String] {
        &self.state.errors
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Minimum gap between now and a bookable same-day slot
    pub fn lead_time(&self) -> chrono::Duration {
        self.lead
    }

    /// Time since the flow mounted
    pub fn dwell(&self) -> Duration {
        self.clock.monotonic().saturating_sub(self.started_at)
    }

    /// Validate the current stage and move forward on success
    pub fn advance(&mut self) -> Transition {
        if self.state.stage == Stage::Taster {
            self.refresh_slot();
        }
        let errors = validate_stage(&self.state, self.state.stage);
        if !errors.is_empty() {
            tracing::debug!(stage = %self.state.stage, count = errors.len(), "advance blocked");
            self.state.errors = errors.clone();
            return Transition::Blocked { errors };
        }

        self.state.errors.clear();
        self.state.stage = self.state.stage.next();
        self.persist();
        Transition::Moved {
            to: self.state.stage,
            effect: FlowEffect::FocusContainer,
        }
    }

    /// Step back one stage without validation
    pub fn retreat(&mut self) -> Transition {
        self.state.errors.clear();
        self.state.stage = self.state.stage.previous();
        self.persist();
        Transition::Moved {
            to: self.state.stage,
            effect: FlowEffect::FocusContainer,
        }
    }

    // === Field edits ===

    pub fn set_name(&mut self, value: &str) {
        self.edit(|s| s.enquiry.name = value.to_string());
    }

    pub fn set_email(&mut self, value: &str) {
        self.edit(|s| s.enquiry.email = value.to_string());
    }

    pub fn set_phone(&mut self, value: &str) {
        self.edit(|s| s.enquiry.phone = value.to_string());
    }

    pub fn set_preferred_contact(&mut self, value: PreferredContact) {
        self.edit(|s| s.enquiry.preferred_contact = value);
    }

    pub fn toggle_therapy(&mut self, therapy: &str) {
        self.edit(|s| toggle_in(&mut s.enquiry.therapies, therapy));
    }

    pub fn toggle_condition(&mut self, condition: &str) {
        self.edit(|s| toggle_in(&mut s.screening.conditions, condition));
    }

    pub fn set_notes(&mut self, value: &str) {
        self.edit(|s| s.screening.notes = value.to_string());
    }

    /// Change the taster date and re-pick the time against the new slots
    pub fn set_date(&mut self, date: &str) {
        let now = self.clock.local_now();
        let lead = self.lead;
        self.edit(|s| {
            s.taster.date = date.to_string();
            reconcile_time(&mut s.taster, BASE_SLOTS, now, lead);
        });
    }

    /// Choose a time; only currently offered slots are accepted
    pub fn set_time(&mut self, time: &str) -> bool {
        if !self.available_slots().iter().any(|s| s == time) {
            return false;
        }
        self.edit(|s| s.taster.time = time.to_string());
        true
    }

    pub fn set_package(&mut self, package: Package) {
        self.edit(|s| s.programme.package = package);
    }

    pub fn set_payment(&mut self, payment: Payment) {
        self.edit(|s| s.programme.payment = payment);
    }

    pub fn set_accepted(&mut self, accepted: bool) {
        self.edit(|s| s.accepted = accepted);
    }

    /// Hidden field only bots fill in; never persisted
    pub fn set_honeypot(&mut self, value: &str) {
        self.honeypot = value.to_string();
    }

    pub fn honeypot(&self) -> &str {
        &self.honeypot
    }

    // === Derived data ===

    /// Slots bookable for the selected date at this moment
    pub fn available_slots(&self) -> Vec<String> {
        available_slots(
            &self.state.taster.date,
            BASE_SLOTS,
            self.clock.local_now(),
            self.lead,
        )
    }

    /// Re-read the clock and re-pick the time if it is no longer offered
    pub fn refresh_slot(&mut self) -> bool {
        let changed = reconcile_time(
            &mut self.state.taster,
            BASE_SLOTS,
            self.clock.local_now(),
            self.lead,
        );
        if changed {
            self.persist();
        }
        changed
    }

    pub fn summary_message(&self) -> String {
        build_summary_message(&self.state)
    }

    pub fn calendar_event(&self, clinic: &ClinicConfig) -> Option<CalendarEvent> {
        build_calendar_event(&self.state.taster, clinic, self.clock.as_ref())
    }

    // === Lifecycle ===

    /// Replace the current errors, e.g. with messages from the sink
    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.state.errors = errors;
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Finish the session: mark submitted and drop the snapshot
    pub(crate) fn complete(&mut self) {
        self.submitted = true;
        self.state.errors.clear();
        self.purge_snapshot();
    }

    /// Start over from an empty booking and delete the snapshot
    pub fn reset(&mut self) {
        self.state = BookingState::default();
        self.honeypot.clear();
        self.submitted = false;
        self.purge_snapshot();
    }

    fn purge_snapshot(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to delete booking snapshot");
            }
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut BookingState)) {
        if self.submitted {
            return;
        }
        change(&mut self.state);
        self.persist();
    }

    fn persist(&self) {
        if self.submitted {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = Snapshot::from_state(&self.state, self.clock.now_utc().to_rfc3339());
        if let Err(e) = store.save(&snapshot) {
            tracing::warn!(error = %e, "failed to save booking snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::validation::{MSG_CONSENT, MSG_EMAIL, MSG_NAME, MSG_PHONE};
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 20, 0)
            .unwrap()
    }

    fn flow_without_store() -> (Arc<ManualClock>, BookingFlow) {
        let clock = Arc::new(ManualClock::new(now()));
        let flow = BookingFlow::mount(
            clock.clone(),
            None,
            &BookingConfig::default(),
            &Prefill::default(),
        );
        (clock, flow)
    }

    fn fill_enquiry(flow: &mut BookingFlow) {
        flow.set_name("Jane Doe");
        flow.set_email("jane@x.com");
        flow.set_phone("07000000000");
    }

    #[test]
    fn test_starts_at_enquiry() {
        let (_, flow) = flow_without_store();
        assert_eq!(flow.stage(), Stage::Enquiry);
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn test_blocked_advance_is_idempotent() {
        let (_, mut flow) = flow_without_store();
        let first = flow.advance();
        let second = flow.advance();
        assert_eq!(first, second);
        assert_eq!(
            first,
            Transition::Blocked {
                errors: vec![MSG_NAME.into(), MSG_EMAIL.into(), MSG_PHONE.into()]
            }
        );
        assert_eq!(flow.stage(), Stage::Enquiry);
    }

    #[test]
    fn test_advance_clears_errors() {
        let (_, mut flow) = flow_without_store();
        flow.advance();
        fill_enquiry(&mut flow);
        let t = flow.advance();
        assert_eq!(
            t,
            Transition::Moved {
                to: Stage::Screening,
                effect: FlowEffect::FocusContainer
            }
        );
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn test_stage_stays_in_bounds() {
        let (_, mut flow) = flow_without_store();
        fill_enquiry(&mut flow);
        flow.set_date("2026-10-21");
        for _ in 0..10 {
            flow.advance();
            assert!(flow.stage() <= Stage::Review);
        }
        assert_eq!(flow.stage(), Stage::Review);
        assert_eq!(
            flow.advance(),
            Transition::Blocked {
                errors: vec![MSG_CONSENT.into()]
            }
        );
        for _ in 0..10 {
            flow.retreat();
        }
        assert_eq!(flow.stage(), Stage::Enquiry);
    }

    #[test]
    fn test_retreat_clears_errors_without_validation() {
        let (_, mut flow) = flow_without_store();
        fill_enquiry(&mut flow);
        flow.advance();
        flow.advance(); // to taster
        assert_eq!(flow.stage(), Stage::Taster);
        assert!(matches!(flow.advance(), Transition::Blocked { .. }));
        flow.retreat();
        assert_eq!(flow.stage(), Stage::Screening);
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn test_set_date_autoselects_time() {
        let (_, mut flow) = flow_without_store();
        flow.set_date("2026-10-19");
        assert_eq!(flow.state().taster.time, "16:00");
        flow.set_date("2026-10-22");
        assert_eq!(flow.state().taster.time, "16:00");
    }

    #[test]
    fn test_date_change_to_today_reselects() {
        let (_, mut flow) = flow_without_store();
        flow.set_date("2026-10-22");
        assert!(flow.set_time("09:30"));
        flow.set_date("2026-10-19");
        assert_eq!(flow.state().taster.time, "16:00");
    }

    #[test]
    fn test_clock_moving_past_slot_reselects_on_advance() {
        let (clock, mut flow) = flow_without_store();
        fill_enquiry(&mut flow);
        flow.advance();
        flow.advance();
        flow.set_date("2026-10-19");
        assert_eq!(flow.state().taster.time, "16:00");

        clock.advance(Duration::from_secs(4 * 3600)); // 18:20, nothing left
        assert_eq!(
            flow.advance(),
            Transition::Blocked {
                errors: vec![crate::validation::MSG_TIME.into()]
            }
        );
        assert_eq!(flow.state().taster.time, "");
    }

    #[test]
    fn test_set_time_rejects_unavailable_slot() {
        let (_, mut flow) = flow_without_store();
        flow.set_date("2026-10-19");
        assert!(!flow.set_time("11:00"));
        assert!(!flow.set_time("12:00"));
        assert!(flow.set_time("18:30"));
        assert_eq!(flow.state().taster.time, "18:30");
    }

    #[test]
    fn test_prefill_known_service_once() {
        let clock = Arc::new(ManualClock::new(now()));
        let prefill = Prefill {
            service: Some("PEMF Therapy".to_string()),
            name: Some("Jane".to_string()),
            ..Prefill::default()
        };
        let flow = BookingFlow::mount(clock, None, &BookingConfig::default(), &prefill);
        assert_eq!(flow.state().enquiry.therapies, vec!["PEMF Therapy"]);
        assert_eq!(flow.state().enquiry.name, "Jane");
    }

    #[test]
    fn test_prefill_unknown_service_ignored() {
        let clock = Arc::new(ManualClock::new(now()));
        let prefill = Prefill {
            service: Some("Reiki".to_string()),
            ..Prefill::default()
        };
        let flow = BookingFlow::mount(clock, None, &BookingConfig::default(), &prefill);
        assert!(flow.state().enquiry.therapies.is_empty());
    }

    #[test]
    fn test_snapshot_follows_every_change() {
        let temp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::in_dir(temp.path());
        let clock = Arc::new(ManualClock::new(now()));

        let mut flow = BookingFlow::mount(
            clock.clone(),
            Some(store.clone()),
            &BookingConfig::default(),
            &Prefill::default(),
        );
        fill_enquiry(&mut flow);
        flow.toggle_therapy("Physiotherapy");
        flow.advance();

        let saved = store.load().unwrap();
        assert_eq!(saved.stage, Stage::Screening);
        assert_eq!(saved.enquiry.therapies, vec!["Physiotherapy"]);
        assert!(saved.saved_at.is_some());

        // A new session picks up where the last one stopped
        let resumed = BookingFlow::mount(clock, Some(store), &BookingConfig::default(), &Prefill::default());
        assert_eq!(resumed.stage(), Stage::Screening);
        assert_eq!(resumed.state().enquiry.name, "Jane Doe");
    }

    #[test]
    fn test_prefill_overrides_restored_values() {
        let temp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::in_dir(temp.path());
        let clock = Arc::new(ManualClock::new(now()));

        let mut flow = BookingFlow::mount(clock.clone(), Some(store.clone()), &BookingConfig::default(), &Prefill::default());
        fill_enquiry(&mut flow);
        flow.toggle_therapy("PEMF Therapy");

        let prefill = Prefill {
            service: Some("PEMF Therapy".to_string()),
            email: Some("jane@new.com".to_string()),
            ..Prefill::default()
        };
        let resumed = BookingFlow::mount(clock, Some(store), &BookingConfig::default(), &prefill);
        assert_eq!(resumed.state().enquiry.email, "jane@new.com");
        assert_eq!(resumed.state().enquiry.therapies, vec!["PEMF Therapy"]);
    }

    #[test]
    fn test_reset_clears_state_and_snapshot() {
        let temp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::in_dir(temp.path());
        let clock = Arc::new(ManualClock::new(now()));
        let mut flow = BookingFlow::mount(clock, Some(store.clone()), &BookingConfig::default(), &Prefill::default());
        fill_enquiry(&mut flow);
        assert!(store.exists());

        flow.reset();
        assert_eq!(flow.state(), &BookingState::default());
        assert!(!store.exists());
    }

    #[test]
    fn test_dwell_survives_transitions() {
        let (clock, mut flow) = flow_without_store();
        clock.advance(Duration::from_secs(4));
        fill_enquiry(&mut flow);
        flow.advance();
        flow.retreat();
        clock.advance(Duration::from_secs(7));
        assert_eq!(flow.dwell(), Duration::from_secs(11));
    }
}
