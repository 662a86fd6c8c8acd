//! Chart derivation — the deterministic pipeline from birth moment to chart.
//!
//! Flow: parse date/time → resolve timezone → format UTC offset → encode
//! coordinate → ephemeris → extract bodies/nodes/angle/houses → aspects →
//! element and modality balances.
//!
//! Parse failures abort before any capability is touched. Timezone and
//! offset degradations never abort: the chart is computed best-effort in UTC
//! and the degradation travels with the result as a typed warning.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::{debug, warn};

use crate::chart::aspects::major_aspect;
use crate::chart::models::{
    AnglePosition, Aspect, BodyPosition, ChartRecord, ChartWarning, NodePosition,
};
use crate::chart::zodiac::{ElementBalance, ModalityBalance, Sign};
use crate::ephemeris::geopos::EncodedCoordinate;
use crate::ephemeris::{ChartRequest, Ephemeris, EphemerisError, Node, Planet};
use crate::geo::timezone::{utc_offset_for, TimezoneLookup, UTC_OFFSET_FALLBACK};
use crate::models::birth::GeoCoordinate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Zone name substituted when the coordinate resolves to no IANA zone.
const FALLBACK_TZ: &str = "UTC";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid date or time: {0}")]
    DateParse(String),

    #[error("chart computation failed: {0}")]
    Computation(#[from] EphemerisError),
}

/// A chart plus the context it was computed in.
#[derive(Debug, Clone)]
pub struct DerivedChart {
    pub record: ChartRecord,
    pub timezone: String,
    pub utc_offset: String,
    pub warnings: Vec<ChartWarning>,
}

/// Derives the full natal chart for a birth moment at a coordinate.
pub fn derive_chart(
    date_str: &str,
    time_str: &str,
    coordinate: GeoCoordinate,
    timezones: &dyn TimezoneLookup,
    ephemeris: &dyn Ephemeris,
) -> Result<DerivedChart, ChartError> {
    // Step 1: parse — before any capability call.
    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|e| ChartError::DateParse(format!("date {date_str:?}: {e}")))?;
    let time = NaiveTime::parse_from_str(time_str, TIME_FORMAT)
        .map_err(|e| ChartError::DateParse(format!("time {time_str:?}: {e}")))?;
    let local = NaiveDateTime::new(date, time);

    let mut warnings = Vec::new();

    // Step 2: timezone, degrading to UTC.
    let timezone = match timezones.timezone_at(coordinate) {
        Some(name) => name,
        None => {
            warn!(
                "No timezone for ({}, {}); computing chart in UTC",
                coordinate.latitude, coordinate.longitude
            );
            warnings.push(ChartWarning::TimezoneUnresolved {
                fallback: FALLBACK_TZ.to_string(),
            });
            FALLBACK_TZ.to_string()
        }
    };

    // Step 3: UTC offset of the localized moment, degrading to +00:00.
    let utc_offset = match utc_offset_for(&timezone, local) {
        Some(offset) => offset,
        None => {
            warn!("No usable offset for {local} in {timezone}; using {UTC_OFFSET_FALLBACK}");
            warnings.push(ChartWarning::OffsetUnresolved {
                fallback: UTC_OFFSET_FALLBACK.to_string(),
            });
            UTC_OFFSET_FALLBACK.to_string()
        }
    };
    debug!("Localized {local} as {timezone} ({utc_offset})");

    // Step 4: library coordinate encoding.
    let position = EncodedCoordinate::from_decimal(coordinate);
    debug!("Encoded position: {} {}", position.latitude, position.longitude);

    // Step 5: ephemeris invocation — failures propagate, no retry.
    let raw = ephemeris.compute(&ChartRequest {
        date,
        time,
        utc_offset: utc_offset.clone(),
        position,
    })?;

    // Step 6: classical bodies and nodes. A body the ephemeris did not
    // resolve stays in the record with every field unset.
    let mut planets = BTreeMap::new();
    let mut resolved_signs = Vec::new();
    for planet in Planet::ALL {
        let body = match raw.bodies.get(&planet) {
            Some(raw_body) => {
                let sign = Sign::from_longitude(raw_body.lon);
                resolved_signs.push(sign);
                BodyPosition {
                    sign: Some(sign),
                    lon: Some(raw_body.lon),
                    speed: Some(raw_body.speed),
                }
            }
            None => BodyPosition::default(),
        };
        planets.insert(planet, body);
    }

    let mut nodes = BTreeMap::new();
    for node in [Node::North, Node::South] {
        let position = match raw.nodes.get(&node) {
            Some(&lon) => NodePosition {
                sign: Some(Sign::from_longitude(lon)),
                lon: Some(lon),
            },
            None => NodePosition::default(),
        };
        nodes.insert(node, position);
    }

    let ascendant = AnglePosition {
        sign: Sign::from_longitude(raw.ascendant),
        lon: raw.ascendant,
    };
    let houses = raw
        .houses
        .iter()
        .map(|&lon| AnglePosition {
            sign: Sign::from_longitude(lon),
            lon,
        })
        .collect();

    // Step 7: every unordered pair of classical bodies; a pair with an
    // unresolved member is silently skipped.
    let mut aspects = Vec::new();
    for (i, &p1) in Planet::ALL.iter().enumerate() {
        for &p2 in &Planet::ALL[i + 1..] {
            let (Some(a), Some(b)) = (raw.bodies.get(&p1), raw.bodies.get(&p2)) else {
                continue;
            };
            if let Some((aspect, orb)) = major_aspect(a.lon, b.lon) {
                aspects.push(Aspect { p1, p2, aspect, orb });
            }
        }
    }

    // Step 8: balances over the resolved signs.
    let element_balance = ElementBalance::tally(&resolved_signs);
    let modality_balance = ModalityBalance::tally(&resolved_signs);

    let sun = planets.get(&Planet::Sun).copied().unwrap_or_default();
    let moon = planets.get(&Planet::Moon).copied().unwrap_or_default();

    Ok(DerivedChart {
        record: ChartRecord {
            sun,
            moon,
            ascendant,
            planets,
            nodes,
            houses,
            aspects,
            element_balance,
            modality_balance,
            chiron: None,
            stelliums: Vec::new(),
        },
        timezone,
        utc_offset,
        warnings,
    })
}
