//! Offline outbox sink
//!
//! Performs the booking endpoint's own checks and composes the clinic
//! notification and the customer confirmation, then drops both into an outbox
//! directory as JSON for a separate mailer to pick up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{BookingConfig, ClinicConfig};
use crate::error::BookingError;
use crate::submit::{BookingSubmission, SinkResponse, SubmissionSink};
use crate::validation::is_email;

pub const CONFIRMATION_SUBJECT: &str = "Booking Confirmation - Wellvitas";

/// One outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Server-side checks, in the order the endpoint reports them.
///
/// Blank means empty after trimming, matching the wizard's own rules.
pub fn validate_submission(submission: &BookingSubmission) -> Vec<String> {
    let mut errors = Vec::new();
    let enquiry = &submission.enquiry;
    if enquiry.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if enquiry.email.is_empty() || !is_email(&enquiry.email) {
        errors.push("Valid email is required".to_string());
    }
    if enquiry.phone.trim().is_empty() {
        errors.push("Phone is required".to_string());
    }
    if submission.taster.date.is_empty() {
        errors.push("Taster date is required".to_string());
    }
    if submission.taster.time.is_empty() {
        errors.push("Taster time is required".to_string());
    }
    errors
}

fn sender(clinic: &ClinicConfig) -> String {
    format!("{} Bookings <bookings@{}>", clinic.name, clinic.site_domain)
}

/// `447379005856` -> `+44 7379 005856`
fn display_whatsapp(number: &str) -> String {
    if number.len() == 12 && number.starts_with("44") && number.is_ascii() {
        format!("+{} {} {}", &number[..2], &number[2..6], &number[6..])
    } else {
        format!("+{}", number)
    }
}

/// Email to the clinic, replying to the customer
pub fn notification_email(submission: &BookingSubmission, clinic: &ClinicConfig) -> EmailMessage {
    let BookingSubmission {
        enquiry,
        screening,
        taster,
        programme,
        meta,
        ..
    } = submission;

    let therapies = if enquiry.therapies.is_empty() {
        "To be confirmed".to_string()
    } else {
        enquiry.therapies.join(", ")
    };
    let conditions = if screening.conditions.is_empty() {
        "None specified".to_string()
    } else {
        screening.conditions.join(", ")
    };
    let user_agent = if meta.user_agent.is_empty() {
        "N/A"
    } else {
        meta.user_agent.as_str()
    };

    let mut lines = vec![
        format!("New Booking Request from {} Website", clinic.name),
        String::new(),
        "CUSTOMER DETAILS:".to_string(),
        format!("- Name: {}", enquiry.name),
        format!("- Email: {}", enquiry.email),
        format!("- Phone: {}", enquiry.phone),
        format!("- Preferred Contact: {}", enquiry.preferred_contact),
        String::new(),
        "THERAPIES OF INTEREST:".to_string(),
        therapies,
        String::new(),
        "HEALTH SCREENING:".to_string(),
        format!("- Conditions: {}", conditions),
    ];
    if !screening.notes.trim().is_empty() {
        lines.push(format!("- Notes: {}", screening.notes));
    }
    lines.extend([
        String::new(),
        "TASTER APPOINTMENT:".to_string(),
        format!("- Date: {}", taster.date),
        format!("- Time: {}", taster.time),
        String::new(),
        "PROGRAMME SELECTION:".to_string(),
        format!("- Package: {}", programme.package.describe()),
        format!("- Payment: {}", programme.payment.describe()),
        String::new(),
        "SUBMISSION INFO:".to_string(),
        format!("- Submitted: {}", meta.submitted_at),
        format!("- User Agent: {}", user_agent),
    ]);

    EmailMessage {
        from: sender(clinic),
        to: vec![clinic.mail_to.clone()],
        reply_to: Some(enquiry.email.clone()),
        subject: format!(
            "New Booking: {} - {} {}",
            enquiry.name, taster.date, taster.time
        ),
        text: lines.join("\n"),
    }
}

/// Email to the customer acknowledging the request
pub fn confirmation_email(submission: &BookingSubmission, clinic: &ClinicConfig) -> EmailMessage {
    let enquiry = &submission.enquiry;
    let taster = &submission.taster;
    let text = [
        format!("Hello {},", enquiry.name),
        String::new(),
        format!(
            "Thank you for booking with {}! We've received your request for a free taster session.",
            clinic.name
        ),
        String::new(),
        "Your Appointment:".to_string(),
        format!("- Date: {}", taster.date),
        format!("- Time: {}", taster.time),
        format!("- Location: {}", clinic.address),
        String::new(),
        format!(
            "We'll confirm your appointment shortly via {}.",
            enquiry.preferred_contact
        ),
        String::new(),
        "If you have any questions, feel free to reach out:".to_string(),
        format!("- WhatsApp: {}", display_whatsapp(&clinic.whatsapp_number)),
        format!("- Email: {}", clinic.mail_to),
        String::new(),
        "Looking forward to seeing you!".to_string(),
        String::new(),
        "Best regards,".to_string(),
        format!("{} Team", clinic.name),
    ]
    .join("\n");

    EmailMessage {
        from: sender(clinic),
        to: vec![enquiry.email.clone()],
        reply_to: None,
        subject: CONFIRMATION_SUBJECT.to_string(),
        text,
    }
}

/// Sink writing composed emails to a directory
#[derive(Debug, Clone)]
pub struct OutboxSink {
    dir: PathBuf,
    clinic: ClinicConfig,
}

impl OutboxSink {
    pub fn new(dir: &Path, clinic: ClinicConfig) -> Self {
        Self {
            dir: dir.to_path_buf(),
            clinic,
        }
    }

    /// Outbox from config, or `None` when no outbox directory is set
    pub fn from_config(booking: &BookingConfig, clinic: &ClinicConfig) -> Option<Self> {
        booking
            .outbox_dir
            .as_deref()
            .map(|dir| Self::new(dir, clinic.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn deliver(&self, submission: &BookingSubmission) -> Result<(), BookingError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| BookingError::Outbox(format!("{}: {}", self.dir.display(), e)))?;

        let id = Uuid::new_v4();
        let notification = self.write_message(&id, "notification", &notification_email(submission, &self.clinic))?;
        let confirmation = self.write_message(&id, "confirmation", &confirmation_email(submission, &self.clinic))?;
        tracing::info!(
            notification = %notification.display(),
            confirmation = %confirmation.display(),
            "booking emails queued"
        );
        Ok(())
    }

    fn write_message(&self, id: &Uuid, kind: &str, message: &EmailMessage) -> Result<PathBuf, BookingError> {
        let path = self.dir.join(format!("{}-{}.json", id, kind));
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(message)?;
        fs::write(&temp_path, content)
            .and_then(|_| fs::rename(&temp_path, &path))
            .map_err(|e| BookingError::Outbox(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

impl SubmissionSink for OutboxSink {
    fn submit(&self, submission: &BookingSubmission) -> Result<SinkResponse, BookingError> {
        if !submission.website.is_empty() {
            return Ok(SinkResponse::accepted());
        }

        let errors = validate_submission(submission);
        if !errors.is_empty() {
            return Ok(SinkResponse::rejected(errors));
        }

        // The endpoint answers a failed send with a plain rejection
        match self.deliver(submission) {
            Ok(()) => Ok(SinkResponse::accepted()),
            Err(e) => {
                tracing::error!(error = %e, "failed to queue booking emails");
                Ok(SinkResponse {
                    ok: false,
                    errors: Vec::new(),
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submit::SubmissionMeta;
    use crate::types::{Enquiry, Package, Payment, Programme, Screening, Taster};

    fn submission() -> BookingSubmission {
        BookingSubmission {
            enquiry: Enquiry {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "07000000000".to_string(),
                therapies: vec!["PEMF Therapy".to_string()],
                ..Enquiry::default()
            },
            screening: Screening::default(),
            taster: Taster {
                date: "2026-10-20".to_string(),
                time: "11:00".to_string(),
            },
            programme: Programme {
                package: Package::Eight,
                payment: Payment::Plan,
            },
            meta: SubmissionMeta {
                submitted_at: "2026-10-19T10:00:00.000Z".to_string(),
                user_agent: String::new(),
            },
            website: String::new(),
        }
    }

    #[test]
    fn test_validation_messages() {
        let mut s = submission();
        s.enquiry.name.clear();
        s.enquiry.email = "nope".to_string();
        s.enquiry.phone.clear();
        s.taster = Taster::default();
        assert_eq!(
            validate_submission(&s),
            vec![
                "Name is required",
                "Valid email is required",
                "Phone is required",
                "Taster date is required",
                "Taster time is required",
            ]
        );
        assert!(validate_submission(&submission()).is_empty());
    }

    #[test]
    fn test_validation_treats_whitespace_as_blank() {
        let mut s = submission();
        s.enquiry.name = "   ".to_string();
        s.enquiry.phone = "\t".to_string();
        assert_eq!(validate_submission(&s), vec!["Name is required", "Phone is required"]);

        s.screening.notes = "  ".to_string();
        let email = notification_email(&s, &ClinicConfig::default());
        assert!(!email.text.contains("- Notes:"));
    }

    #[test]
    fn test_notification_email() {
        let email = notification_email(&submission(), &ClinicConfig::default());
        assert_eq!(email.subject, "New Booking: Jane Doe - 2026-10-20 11:00");
        assert_eq!(email.to, vec!["info@wellvitas.co.uk"]);
        assert_eq!(email.reply_to.as_deref(), Some("jane@x.com"));
        assert!(email.text.contains("- Preferred Contact: whatsapp"));
        assert!(email.text.contains("THERAPIES OF INTEREST:\nPEMF Therapy"));
        assert!(email.text.contains("- Conditions: None specified"));
        assert!(!email.text.contains("- Notes:"));
        assert!(email.text.contains("- Package: 8 sessions"));
        assert!(email.text.contains("- Payment: Installment plan"));
        assert!(email.text.ends_with("- User Agent: N/A"));
    }

    #[test]
    fn test_confirmation_email() {
        let email = confirmation_email(&submission(), &ClinicConfig::default());
        assert_eq!(email.subject, CONFIRMATION_SUBJECT);
        assert_eq!(email.to, vec!["jane@x.com"]);
        assert!(email.reply_to.is_none());
        assert!(email.text.starts_with("Hello Jane Doe,"));
        assert!(email.text.contains("- Location: 1620 Great Western Rd, Anniesland, Glasgow G13 1HH"));
        assert!(email.text.contains("- WhatsApp: +44 7379 005856"));
        assert!(email.text.contains("shortly via whatsapp."));
    }

    #[test]
    fn test_outbox_writes_both_emails() {
        let temp = tempfile::tempdir().unwrap();
        let sink = OutboxSink::new(&temp.path().join("outbox"), ClinicConfig::default());
        let response = sink.submit(&submission()).unwrap();
        assert!(response.ok);

        let mut names: Vec<String> = fs::read_dir(sink.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("-confirmation.json"));
        assert!(names[1].ends_with("-notification.json"));

        let written: EmailMessage =
            serde_json::from_str(&fs::read_to_string(sink.dir().join(&names[1])).unwrap()).unwrap();
        assert_eq!(written.reply_to.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn test_outbox_rejects_incomplete() {
        let temp = tempfile::tempdir().unwrap();
        let sink = OutboxSink::new(temp.path(), ClinicConfig::default());
        let mut s = submission();
        s.taster.time.clear();
        let response = sink.submit(&s).unwrap();
        assert!(!response.ok);
        assert_eq!(response.errors, vec!["Taster time is required"]);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_outbox_write_failure_is_a_rejection() {
        let temp = tempfile::tempdir().unwrap();
        // A regular file where the outbox directory should be
        let blocked = temp.path().join("outbox");
        fs::write(&blocked, "not a directory").unwrap();
        let sink = OutboxSink::new(&blocked, ClinicConfig::default());

        let response = sink.submit(&submission()).unwrap();
        assert!(!response.ok);
        assert!(response.errors.is_empty());
        assert!(response.error.unwrap().starts_with("E022"));
    }

    #[test]
    fn test_outbox_honeypot_accepts_silently() {
        let temp = tempfile::tempdir().unwrap();
        let sink = OutboxSink::new(&temp.path().join("outbox"), ClinicConfig::default());
        let mut s = submission();
        s.website = "spam".to_string();
        assert!(sink.submit(&s).unwrap().ok);
        assert!(!sink.dir().exists());
    }
}
