//! Degree-minute direction string encoding for geographic positions.
//!
//! The encoding the ephemeris layer expects: integer degree, truncated
//! minute, hemisphere letter. Longitude degrees are zero-padded to 3 digits,
//! latitude degrees are not. `40.7128 → 40N42`, `-74.0060 → 074W00`.

use serde::{Deserialize, Serialize};

use crate::models::birth::GeoCoordinate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCoordinate {
    pub latitude: String,
    pub longitude: String,
}

impl EncodedCoordinate {
    pub fn from_decimal(coordinate: GeoCoordinate) -> Self {
        EncodedCoordinate {
            latitude: encode_latitude(coordinate.latitude),
            longitude: encode_longitude(coordinate.longitude),
        }
    }

    /// Decodes back to decimal degrees at minute precision.
    /// Returns `None` if either component does not match the encoding.
    pub fn decode(&self) -> Option<GeoCoordinate> {
        Some(GeoCoordinate {
            latitude: decode_component(&self.latitude, 'N', 'S')?,
            longitude: decode_component(&self.longitude, 'E', 'W')?,
        })
    }
}

pub fn encode_latitude(latitude: f64) -> String {
    let (degrees, minutes) = split_degrees(latitude);
    let direction = if latitude >= 0.0 { 'N' } else { 'S' };
    format!("{degrees}{direction}{minutes:02}")
}

pub fn encode_longitude(longitude: f64) -> String {
    let (degrees, minutes) = split_degrees(longitude);
    let direction = if longitude >= 0.0 { 'E' } else { 'W' };
    format!("{degrees:03}{direction}{minutes:02}")
}

/// Integer degree and truncated (not rounded) minute of the absolute value.
fn split_degrees(value: f64) -> (u32, u32) {
    let degrees = value.abs().trunc();
    let minutes = ((value.abs() - degrees) * 60.0).trunc();
    (degrees as u32, minutes as u32)
}

fn decode_component(encoded: &str, positive: char, negative: char) -> Option<f64> {
    let split = encoded.find([positive, negative])?;
    let direction = encoded[split..].chars().next()?;
    let degrees: u32 = encoded[..split].parse().ok()?;
    let minutes: u32 = encoded[split + 1..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let magnitude = f64::from(degrees) + f64::from(minutes) / 60.0;
    Some(if direction == negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_latitude_north() {
        assert_eq!(encode_latitude(40.7128), "40N42");
    }

    #[test]
    fn test_encode_latitude_south() {
        assert_eq!(encode_latitude(-40.7128), "40S42");
    }

    #[test]
    fn test_encode_longitude_west_zero_padded() {
        assert_eq!(encode_longitude(-74.0060), "074W00");
    }

    #[test]
    fn test_encode_longitude_east() {
        assert_eq!(encode_longitude(151.2093), "151E12");
    }

    #[test]
    fn test_minutes_truncate_rather_than_round() {
        // 0.999' of a minute still truncates: 10.9999 deg = 10 deg 59.994'
        assert_eq!(encode_latitude(10.9999), "10N59");
    }

    #[test]
    fn test_decode_preserves_direction_and_minute_precision() {
        let encoded = EncodedCoordinate::from_decimal(GeoCoordinate {
            latitude: 40.7128,
            longitude: -74.0060,
        });
        let decoded = encoded.decode().unwrap();
        assert!((decoded.latitude - 40.7).abs() < 0.02, "{}", decoded.latitude);
        assert!((decoded.longitude - -74.0).abs() < 0.02, "{}", decoded.longitude);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let bad = EncodedCoordinate {
            latitude: "40X42".to_string(),
            longitude: "074W00".to_string(),
        };
        assert!(bad.decode().is_none());

        let bad_minutes = EncodedCoordinate {
            latitude: "40N99".to_string(),
            longitude: "074W00".to_string(),
        };
        assert!(bad_minutes.decode().is_none());
    }
}
