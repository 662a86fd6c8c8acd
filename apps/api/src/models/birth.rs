//! Request-level input types shared across the chart and interpretation APIs.

use serde::{Deserialize, Serialize};

/// User-submitted birth details. Immutable, consumed once per request.
///
/// `date` and `time` stay as raw strings here — parsing against the expected
/// patterns is the chart deriver's first step, so a malformed value fails
/// with a typed error before any capability is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthInput {
    pub name: String,
    /// Free-text place of birth, resolved through the geocoder.
    pub place: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time, 24-hour `HH:MM`.
    pub time: String,
    /// Informational only — never feeds the chart computation.
    #[serde(default)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Signed decimal degrees. Positive latitude is north, positive longitude east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}
