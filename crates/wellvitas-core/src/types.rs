//! Core data types for the booking flow

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Therapies offered in the enquiry stage
pub const THERAPY_OPTIONS: &[&str] = &[
    "Hyperbaric Oxygen",
    "Light-based Therapies",
    "Laser Acupuncture",
    "PEMF Therapy",
    "Compression Therapy",
    "Physiotherapy",
    "Combined Programme",
];

/// Conditions offered in the screening stage
pub const CONDITION_OPTIONS: &[&str] = &[
    "Back pain",
    "Neck/shoulder pain",
    "Sports injury",
    "Arthritis",
    "Post-surgery rehab",
    "Stress/anxiety",
    "Other",
];

/// Fixed daily schedule of taster start times
pub const BASE_SLOTS: &[&str] = &["09:30", "11:00", "14:30", "16:00", "18:30"];

/// Wizard stage, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    #[default]
    Enquiry,
    Screening,
    Taster,
    Programme,
    Review,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Enquiry,
        Stage::Screening,
        Stage::Taster,
        Stage::Programme,
        Stage::Review,
    ];

    /// Zero-based position in the wizard
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Next stage, saturating at `Review`
    pub fn next(self) -> Stage {
        match self {
            Stage::Enquiry => Stage::Screening,
            Stage::Screening => Stage::Taster,
            Stage::Taster => Stage::Programme,
            Stage::Programme | Stage::Review => Stage::Review,
        }
    }

    /// Previous stage, saturating at `Enquiry`
    pub fn previous(self) -> Stage {
        match self {
            Stage::Enquiry | Stage::Screening => Stage::Enquiry,
            Stage::Taster => Stage::Screening,
            Stage::Programme => Stage::Taster,
            Stage::Review => Stage::Programme,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Enquiry => "Enquiry",
            Stage::Screening => "Screening",
            Stage::Taster => "Taster",
            Stage::Programme => "Programme",
            Stage::Review => "Review",
        }
    }

    /// Completion percentage shown in the progress bar
    pub fn progress_percent(self) -> u8 {
        self.index() * 25
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| format!("stage {} out of range 0..=4", value))
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.index()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the clinic should get back to the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredContact {
    #[default]
    Whatsapp,
    Email,
}

impl PreferredContact {
    pub fn as_str(self) -> &'static str {
        match self {
            PreferredContact::Whatsapp => "whatsapp",
            PreferredContact::Email => "email",
        }
    }
}

impl fmt::Display for PreferredContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Programme size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Package {
    #[default]
    #[serde(rename = "taster")]
    Taster,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "12")]
    Twelve,
}

impl Package {
    pub const ALL: [Package; 4] = [Package::Taster, Package::Four, Package::Eight, Package::Twelve];

    /// Wire value ("taster", "4", "8", "12")
    pub fn as_str(self) -> &'static str {
        match self {
            Package::Taster => "taster",
            Package::Four => "4",
            Package::Eight => "8",
            Package::Twelve => "12",
        }
    }

    /// "Taster only" or "N sessions"
    pub fn describe(self) -> String {
        match self {
            Package::Taster => "Taster only".to_string(),
            other => format!("{} sessions", other.as_str()),
        }
    }

    /// Price in whole pounds
    pub fn price_gbp(self) -> u32 {
        match self {
            Package::Taster => 0,
            Package::Four => 180,
            Package::Eight => 320,
            Package::Twelve => 450,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payment {
    #[default]
    Payg,
    Plan,
}

impl Payment {
    pub fn as_str(self) -> &'static str {
        match self {
            Payment::Payg => "payg",
            Payment::Plan => "plan",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Payment::Payg => "Pay-as-you-go",
            Payment::Plan => "Installment plan",
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage 0: who is booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact: PreferredContact,
    /// Selected therapies, in selection order
    pub therapies: Vec<String>,
}

/// Stage 1: health screening
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Screening {
    /// Selected conditions, in selection order
    pub conditions: Vec<String>,
    pub notes: String,
}

/// Stage 2: free taster slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taster {
    /// `YYYY-MM-DD`, empty when unset
    pub date: String,
    /// `HH:MM`, empty when unset
    pub time: String,
}

impl Taster {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        if self.date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        parse_slot(&self.time)
    }

    /// Local start of the taster, if both date and time are usable
    pub fn start(&self) -> Option<NaiveDateTime> {
        Some(self.parsed_date()?.and_time(self.parsed_time()?))
    }
}

/// Parse an `HH:MM` slot string
pub fn parse_slot(value: &str) -> Option<NaiveTime> {
    if value.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Stage 3: programme choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Programme {
    pub package: Package,
    pub payment: Payment,
}

impl Programme {
    /// Price line shown on the review stage
    pub fn price_label(&self) -> String {
        match self.package.price_gbp() {
            0 => "Free taster".to_string(),
            price if self.payment == Payment::Plan => {
                format!("£{} • monthly plan available", price)
            }
            price => format!("£{}", price),
        }
    }
}

/// The whole in-progress booking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingState {
    pub stage: Stage,
    pub enquiry: Enquiry,
    pub screening: Screening,
    pub taster: Taster,
    pub programme: Programme,
    /// Contact and privacy consent, required on the review stage
    pub accepted: bool,
    /// Messages from the last failed transition or submission
    pub errors: Vec<String>,
}

/// Toggle `value` in an insertion-ordered set
pub fn toggle_in(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}
