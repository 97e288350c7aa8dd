//! Booking summary text and the deep links that carry it

use crate::config::ClinicConfig;
use crate::types::BookingState;

/// Subject of the enquiry mail link
pub const MAIL_SUBJECT: &str = "Wellvitas booking enquiry";

/// Keep digits and '+' only
pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "—" } else { value }
}

/// Render the human-readable booking summary.
///
/// The output depends only on `state`; the same text is sent over WhatsApp
/// and by mail.
pub fn build_summary_message(state: &BookingState) -> String {
    let enquiry = &state.enquiry;
    let screening = &state.screening;
    let taster = &state.taster;
    let programme = &state.programme;

    let therapies = enquiry.therapies.join(", ");
    let conditions = screening.conditions.join(", ");
    let phone = normalize_phone(&enquiry.phone);

    let mut lines = vec![
        "Hello Wellvitas — I'd like to book.".to_string(),
        format!("Name: {}", or_dash(&enquiry.name)),
        format!("Email: {}", or_dash(&enquiry.email)),
        format!("Phone: {}", or_dash(&phone)),
        format!("Contact: {}", enquiry.preferred_contact),
        format!(
            "Therapies: {}",
            if therapies.is_empty() { "TBC" } else { therapies.as_str() }
        ),
        format!("Conditions: {}", or_dash(&conditions)),
    ];
    if !screening.notes.trim().is_empty() {
        lines.push(format!("Notes: {}", screening.notes));
    }
    lines.push(format!(
        "Taster: {} {}",
        if taster.date.is_empty() { "TBC" } else { taster.date.as_str() },
        taster.time
    ));
    lines.push(format!(
        "Programme: {} ({})",
        programme.package.describe(),
        programme.payment
    ));

    lines.join("\n")
}

/// Percent-encode a URI component.
///
/// Leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched and encodes every other
/// byte of the UTF-8 representation.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// `https://wa.me/<number>?text=<body>`
pub fn whatsapp_link(clinic: &ClinicConfig, body: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        clinic.whatsapp_number,
        encode_component(body)
    )
}

/// `mailto:` link addressed to the clinic with the summary as body
pub fn mailto_link(clinic: &ClinicConfig, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        clinic.mail_to,
        encode_component(MAIL_SUBJECT),
        encode_component(body)
    )
}
