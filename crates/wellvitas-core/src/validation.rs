//! Per-stage validation rules

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{BookingState, Stage};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

pub const MSG_NAME: &str = "Enter your full name.";
pub const MSG_EMAIL: &str = "Enter a valid email.";
pub const MSG_PHONE: &str = "Enter your phone number.";
pub const MSG_DATE: &str = "Choose a date for your taster.";
pub const MSG_TIME: &str = "Choose a time for your taster.";
pub const MSG_CONSENT: &str = "Please accept the contact & privacy notice.";

/// `local@domain.tld` shape check
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validate the fields required by `stage`, in display order
pub fn validate_stage(state: &BookingState, stage: Stage) -> Vec<String> {
    let mut errors = Vec::new();
    match stage {
        Stage::Enquiry => {
            if state.enquiry.name.trim().is_empty() {
                errors.push(MSG_NAME.to_string());
            }
            if !is_email(&state.enquiry.email) {
                errors.push(MSG_EMAIL.to_string());
            }
            if state.enquiry.phone.trim().is_empty() {
                errors.push(MSG_PHONE.to_string());
            }
        }
        Stage::Taster => {
            if state.taster.date.is_empty() {
                errors.push(MSG_DATE.to_string());
            }
            if state.taster.time.is_empty() {
                errors.push(MSG_TIME.to_string());
            }
        }
        Stage::Review => {
            if !state.accepted {
                errors.push(MSG_CONSENT.to_string());
            }
        }
        Stage::Screening | Stage::Programme => {}
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_email("jane@x.com"));
        assert!(is_email("a.b+c@mail.example.co.uk"));
        assert!(!is_email("jane@x"));
        assert!(!is_email("jane x@x.com"));
        assert!(!is_email("@x.com"));
        assert!(!is_email(""));
    }

    #[test]
    fn test_enquiry_errors_in_order() {
        let state = BookingState::default();
        assert_eq!(
            validate_stage(&state, Stage::Enquiry),
            vec![MSG_NAME, MSG_EMAIL, MSG_PHONE]
        );
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut state = BookingState::default();
        state.enquiry.name = "   ".to_string();
        state.enquiry.email = "jane@x.com".to_string();
        state.enquiry.phone = "07000000000".to_string();
        assert_eq!(validate_stage(&state, Stage::Enquiry), vec![MSG_NAME]);
    }

    #[test]
    fn test_optional_stages_always_pass() {
        let state = BookingState::default();
        assert!(validate_stage(&state, Stage::Screening).is_empty());
        assert!(validate_stage(&state, Stage::Programme).is_empty());
    }

    #[test]
    fn test_taster_requires_date_and_time() {
        let mut state = BookingState::default();
        assert_eq!(validate_stage(&state, Stage::Taster), vec![MSG_DATE, MSG_TIME]);
        state.taster.date = "2026-10-20".to_string();
        assert_eq!(validate_stage(&state, Stage::Taster), vec![MSG_TIME]);
    }

    #[test]
    fn test_review_requires_consent() {
        let mut state = BookingState::default();
        assert_eq!(validate_stage(&state, Stage::Review), vec![MSG_CONSENT]);
        state.accepted = true;
        assert!(validate_stage(&state, Stage::Review).is_empty());
    }
}
