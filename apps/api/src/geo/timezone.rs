//! Timezone lookup and UTC-offset formatting.
//!
//! Coordinate → IANA name goes through a trait so the chart deriver can be
//! tested with fakes; the production implementation wraps an embedded
//! timezone-boundary index built once at startup (construction is expensive,
//! the lookups are cheap).

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::models::birth::GeoCoordinate;

/// Offset string used when no zone or no unambiguous offset is available.
pub const UTC_OFFSET_FALLBACK: &str = "+00:00";

pub trait TimezoneLookup: Send + Sync {
    /// IANA timezone name for the coordinate, or `None` if unresolved.
    fn timezone_at(&self, coordinate: GeoCoordinate) -> Option<String>;
}

pub struct TzfTimezoneLookup {
    finder: tzf_rs::DefaultFinder,
}

impl TzfTimezoneLookup {
    pub fn new() -> Self {
        Self {
            finder: tzf_rs::DefaultFinder::new(),
        }
    }
}

impl TimezoneLookup for TzfTimezoneLookup {
    fn timezone_at(&self, coordinate: GeoCoordinate) -> Option<String> {
        let name = self
            .finder
            .get_tz_name(coordinate.longitude, coordinate.latitude);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Computes the `±HH:MM` UTC offset of a naive local datetime in the named
/// zone. `None` if the name is not a known zone or the local time has no
/// usable offset (DST gap). An ambiguous time (clocks rolled back) resolves
/// to the earlier offset.
pub fn utc_offset_for(tz_name: &str, local: NaiveDateTime) -> Option<String> {
    let tz: Tz = tz_name.parse().ok()?;
    let offset = tz.offset_from_local_datetime(&local).earliest()?;
    Some(format_offset(offset.fix()))
}

fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let magnitude = seconds.abs();
    format!("{sign}{:02}:{:02}", magnitude / 3600, (magnitude % 3600) / 60)
}
