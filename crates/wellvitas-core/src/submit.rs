//! Final submission of a booking
//!
//! The coordinator re-validates, applies the two anti-abuse gates, sends the
//! [`BookingSubmission`] to a [`SubmissionSink`] and, once the sink accepts,
//! fires the follow-up links and purges the snapshot.

use std::time::Duration;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::config::{BookingConfig, ClinicConfig};
use crate::effects::Effects;
use crate::error::BookingError;
use crate::flow::BookingFlow;
use crate::message::{mailto_link, whatsapp_link};
use crate::types::{Enquiry, Programme, Screening, Stage, Taster};
use crate::validation::validate_stage;

/// Shown when the sink rejects without saying why
pub const MSG_SUBMISSION_FAILED: &str = "Submission failed. Please try again.";

/// Shown for any transport or unexpected failure
pub const MSG_NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";

/// Submission metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    /// RFC 3339, UTC
    pub submitted_at: String,
    pub user_agent: String,
}

/// Body posted to the booking endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSubmission {
    pub enquiry: Enquiry,
    pub screening: Screening,
    pub taster: Taster,
    pub programme: Programme,
    pub meta: SubmissionMeta,
    /// Honeypot field
    #[serde(default)]
    pub website: String,
}

/// Acknowledgement from the booking endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SinkResponse {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            errors,
            error: None,
        }
    }
}

/// Anything that accepts booking submissions
pub trait SubmissionSink {
    /// Deliver one submission. `Err` means the outcome is unknown
    /// (transport failure or unreadable answer).
    fn submit(&self, submission: &BookingSubmission) -> Result<SinkResponse, BookingError>;
}

/// Posts submissions as JSON over HTTP
pub struct HttpSink {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn from_config(config: &BookingConfig) -> Self {
        Self::new(&config.endpoint, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SubmissionSink for HttpSink {
    fn submit(&self, submission: &BookingSubmission) -> Result<SinkResponse, BookingError> {
        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .send_json(submission)
            .map_err(|e| BookingError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut body: SinkResponse =
            response
                .body_mut()
                .read_json()
                .map_err(|e| BookingError::BadResponse {
                    status,
                    reason: e.to_string(),
                })?;

        // A non-2xx status is a rejection whatever the body claims
        if !(200..300).contains(&status) {
            body.ok = false;
        }
        tracing::info!(status, ok = body.ok, endpoint = %self.endpoint, "booking endpoint answered");
        Ok(body)
    }
}

/// What happened to a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Sink accepted; follow-up links opened, snapshot purged
    Submitted,
    /// Dropped by an anti-abuse gate. Front-ends must render this exactly
    /// like an idle no-op.
    Ignored,
    /// Review-stage validation failed
    Invalid(Vec<String>),
    /// Sink answered with field errors
    Rejected(Vec<String>),
    /// Transport or unexpected failure; state is kept for a retry
    Failed(String),
}

/// Tunables for [`submit_booking`]
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub min_dwell: Duration,
    pub follow_up_delay: Duration,
    pub user_agent: String,
}

impl SubmitOptions {
    pub fn from_config(config: &BookingConfig) -> Self {
        Self {
            min_dwell: config.min_dwell(),
            follow_up_delay: config.follow_up_delay(),
            ..Self::default()
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            min_dwell: Duration::from_secs(10),
            follow_up_delay: Duration::from_millis(400),
            user_agent: format!("wellvitas/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Assemble the submission body from the current flow state
pub fn build_submission(flow: &BookingFlow, user_agent: &str) -> BookingSubmission {
    let state = flow.state();
    BookingSubmission {
        enquiry: state.enquiry.clone(),
        screening: state.screening.clone(),
        taster: state.taster.clone(),
        programme: state.programme,
        meta: SubmissionMeta {
            submitted_at: flow
                .clock()
                .now_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: user_agent.to_string(),
        },
        website: flow.honeypot().to_string(),
    }
}

/// Run one user-initiated submit attempt. Never retries on its own.
pub fn submit_booking(
    flow: &mut BookingFlow,
    sink: &dyn SubmissionSink,
    effects: &mut dyn Effects,
    clinic: &ClinicConfig,
    options: &SubmitOptions,
) -> SubmitOutcome {
    if flow.is_submitted() {
        return SubmitOutcome::Submitted;
    }

    // The snapshot may be old, so re-check the slot against the clock
    flow.refresh_slot();
    let errors = validate_stage(flow.state(), Stage::Review);
    flow.set_errors(errors.clone());
    if !errors.is_empty() {
        return SubmitOutcome::Invalid(errors);
    }

    if !flow.honeypot().trim().is_empty() {
        tracing::debug!("honeypot filled, dropping submission");
        return SubmitOutcome::Ignored;
    }

    let dwell = flow.dwell();
    if dwell < options.min_dwell {
        tracing::debug!(dwell_ms = dwell.as_millis() as u64, "submitted too fast, dropping submission");
        return SubmitOutcome::Ignored;
    }

    let submission = build_submission(flow, &options.user_agent);
    flow.set_submitting(true);
    let result = sink.submit(&submission);
    flow.set_submitting(false);

    match result {
        Ok(response) if response.ok => {
            let body = flow.summary_message();
            effects.open_url(&whatsapp_link(clinic, &body));
            effects.pause(options.follow_up_delay);
            effects.open_url(&mailto_link(clinic, &body));
            flow.complete();
            tracing::info!(date = %submission.taster.date, time = %submission.taster.time, "booking submitted");
            SubmitOutcome::Submitted
        }
        Ok(response) => {
            if let Some(error) = &response.error {
                tracing::warn!(error = %error, "booking endpoint reported a failure");
            }
            let errors = if response.errors.is_empty() {
                vec![MSG_SUBMISSION_FAILED.to_string()]
            } else {
                response.errors
            };
            flow.set_errors(errors.clone());
            SubmitOutcome::Rejected(errors)
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.code(), "booking submission failed");
            flow.set_errors(vec![MSG_NETWORK_ERROR.to_string()]);
            SubmitOutcome::Failed(MSG_NETWORK_ERROR.to_string())
        }
    }
}
