//! JSON output formatting

use serde::{Deserialize, Serialize};
use wellvitas_core::BookingError;

const SCHEMA_VERSION: &str = "1";

/// JSON response envelope shared by every command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for forward compatibility
    pub schema_version: String,
    /// Command that generated this response
    pub command: String,
    /// Status: "ok" or "error"
    pub status: String,
    /// Command-specific payload
    pub data: T,
    /// Errors and warnings
    pub issues: Vec<JsonIssue>,
}

impl<T> JsonResponse<T> {
    pub fn ok(command: &str, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.to_string(),
            status: "ok".to_string(),
            data,
            issues: vec![],
        }
    }

    pub fn error(command: &str, data: T, issues: Vec<JsonIssue>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            command: command.to_string(),
            status: "error".to_string(),
            data,
            issues,
        }
    }
}

impl<T: Serialize> JsonResponse<T> {
    /// Print pretty JSON to stdout
    pub fn print(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("error: failed to encode JSON output: {}", e),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonIssue {
    /// Error code (e.g., "E020")
    pub code: String,
    /// "error" or "warning"
    pub severity: String,
    pub message: String,
}

impl JsonIssue {
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            severity: "error".to_string(),
            message: message.to_string(),
        }
    }
}

impl From<&BookingError> for JsonIssue {
    fn from(err: &BookingError) -> Self {
        JsonIssue::error(err.code(), &err.to_string())
    }
}

/// Data payload for book command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookData {
    /// "submitted" or "saved"
    pub result: String,
    pub date: String,
    pub time: String,
    /// Follow-up links handed to the user
    pub links: Vec<String>,
    /// Snapshot location when progress was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

/// Data payload for slots command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsData {
    pub date: String,
    pub slots: Vec<String>,
}

/// Data payload for hours command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursData {
    pub open: bool,
    pub badge: String,
    pub hours: String,
}

/// Data payload for show command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowData {
    pub stage: String,
    pub message: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Data payload for calendar command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarData {
    /// Where the ICS file was written
    pub path: String,
    pub google_url: String,
}

/// Data payload for reset command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetData {
    pub path: String,
    /// Whether a snapshot existed before the reset
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let response = JsonResponse::ok(
            "slots",
            SlotsData {
                date: "2026-10-19".to_string(),
                slots: vec!["16:00".to_string(), "18:30".to_string()],
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["schema_version"], "1");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["data"]["slots"][1], "18:30");
        assert!(json["issues"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_error_envelope_from_booking_error() {
        let err = BookingError::NoTasterSelected;
        let response: JsonResponse<()> = JsonResponse::error("calendar", (), vec![(&err).into()]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["issues"][0]["code"], "E031");
        assert_eq!(json["issues"][0]["severity"], "error");
    }

    #[test]
    fn test_optional_fields_skipped() {
        let data = BookData {
            result: "submitted".to_string(),
            date: "2026-10-20".to_string(),
            time: "11:00".to_string(),
            links: vec![],
            snapshot: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("snapshot").is_none());
    }
}
