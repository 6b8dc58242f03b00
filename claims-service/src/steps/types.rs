use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Context keys shared across the wizard steps.
pub mod session_keys {
    /// The pending step submission, as raw JSON.
    pub const USER_INPUT: &str = "user_input";
    /// The incrementally assembled claim record.
    pub const CLAIM_RECORD: &str = "claim_record";
    /// Stable per-visitor identifier, used to key the resume store.
    pub const CLIENT_ID: &str = "client_id";
    pub const SESSION_ID: &str = "session_id";
}

/// Contact details collected at the first step.
///
/// Serialized camelCase to match the `contactFormData` shape the funnel's
/// clients already cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    /// Digits only, 10 to 15 of them, after normalization.
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    pub fn is_complete(&self) -> bool {
        !self.first_name.is_empty()
            && !self.last_name.is_empty()
            && !self.phone.is_empty()
            && !self.email.is_empty()
    }
}

/// The visitor's role in the accident.
///
/// Two legacy spellings (`driver`, `other_vehicle`) still arrive from older
/// clients; they are kept as distinct variants rather than silently merged.
/// Only `Guest` changes the wizard's behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccidentRole {
    #[serde(rename = "passenger")]
    Passenger,
    #[serde(rename = "guest")]
    Guest,
    #[serde(rename = "otherVehicle")]
    OtherVehicle,
    #[serde(rename = "driver")]
    Driver,
    #[serde(rename = "other_vehicle")]
    OtherVehicleLegacy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RideshareCompany {
    Uber,
    Lyft,
}

/// Exact rejection copy shown when neither a rideshare report nor a police
/// report exists.
pub const REJECTION_NO_REPORT: &str =
    "To process a rideshare claim, there must be either a rideshare report or a police report.";

/// Exact rejection copy shown when no qualifying medical treatment occurred.
pub const REJECTION_NO_TREATMENT: &str =
    "To qualify, you must have received medical treatment within 48 hours or within 7 days of the accident.";

/// The claim, assembled field by field as each step is confirmed. Discarded
/// once the terminal screen is shown; durable storage is the submission
/// backend's responsibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub contact: Option<ContactInfo>,
    pub role: Option<AccidentRole>,
    pub guest_info: Option<String>,
    pub rideshare_company: Option<RideshareCompany>,
    pub accident_date: Option<NaiveDate>,
    #[serde(default)]
    pub filed_complaint: bool,
    #[serde(default)]
    pub has_police_report: bool,
    #[serde(default)]
    pub medical_treatment_48h: bool,
    #[serde(default)]
    pub medical_treatment_7d: bool,
}

impl ClaimRecord {
    /// The qualification gate. Returns the rejection reason when the claim
    /// cannot proceed; order matters, the report check comes first.
    pub fn qualification_failure(&self) -> Option<&'static str> {
        if !self.filed_complaint && !self.has_police_report {
            return Some(REJECTION_NO_REPORT);
        }
        if !self.medical_treatment_48h && !self.medical_treatment_7d {
            return Some(REJECTION_NO_TREATMENT);
        }
        None
    }
}

/// Strip formatting and validate the digit count.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if (10..=15).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}
