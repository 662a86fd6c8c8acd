//! Ephemeris boundary — natal positions behind a trait.
//!
//! The deriver hands the capability a localized moment plus the library's
//! own coordinate encoding and gets back raw ecliptic longitudes. Everything
//! zodiac-shaped (signs, aspects, balances) is layered on top by `chart`.
//!
//! Production implementation: `meeus::MeeusEphemeris`, a self-contained
//! low-precision backend. Tests swap in fakes.

pub mod geopos;
pub mod meeus;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ephemeris::geopos::EncodedCoordinate;

/// The ten classical bodies, in traditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two lunar nodes. Serialized names match the chart record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    #[serde(rename = "North Node")]
    North,
    #[serde(rename = "South Node")]
    South,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Node::North => "North Node",
            Node::South => "South Node",
        })
    }
}

/// One chart invocation: local civil date and time, the UTC offset the
/// deriver resolved for them (`±HH:MM`), and the encoded birth position.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub utc_offset: String,
    pub position: EncodedCoordinate,
}

/// Ecliptic longitude in degrees plus daily motion (negative = retrograde).
#[derive(Debug, Clone, Copy)]
pub struct RawBody {
    pub lon: f64,
    pub speed: f64,
}

/// Raw chart output. A body missing from `bodies` means the backend could
/// not resolve it — the deriver records it with all fields unset.
#[derive(Debug, Clone)]
pub struct RawChart {
    pub bodies: BTreeMap<Planet, RawBody>,
    pub nodes: BTreeMap<Node, f64>,
    pub ascendant: f64,
    pub houses: [f64; 12],
}

#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("coordinate encoding unreadable: {0}")]
    InvalidCoordinate(String),

    #[error("UTC offset unreadable: {0}")]
    InvalidOffset(String),

    #[error("date outside supported range 1800-2050: year {0}")]
    OutOfRange(i32),
}

/// The ephemeris capability. Synchronous by design — the production backend
/// is pure computation, and fakes stay trivial in tests.
pub trait Ephemeris: Send + Sync {
    fn compute(&self, request: &ChartRequest) -> Result<RawChart, EphemerisError>;
}
