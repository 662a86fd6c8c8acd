//! Major-aspect classification between two ecliptic longitudes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The classical major aspects. Minor aspects are out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectType {
    pub const ALL: [AspectType; 5] = [
        AspectType::Conjunction,
        AspectType::Sextile,
        AspectType::Square,
        AspectType::Trine,
        AspectType::Opposition,
    ];

    /// Exact angular separation, degrees.
    pub fn angle(&self) -> f64 {
        match self {
            AspectType::Conjunction => 0.0,
            AspectType::Sextile => 60.0,
            AspectType::Square => 90.0,
            AspectType::Trine => 120.0,
            AspectType::Opposition => 180.0,
        }
    }

    /// Maximum deviation from exact that still counts as the aspect.
    pub fn max_orb(&self) -> f64 {
        match self {
            AspectType::Conjunction | AspectType::Trine | AspectType::Opposition => 8.0,
            AspectType::Square => 7.0,
            AspectType::Sextile => 6.0,
        }
    }
}

impl fmt::Display for AspectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AspectType::Conjunction => "conjunction",
            AspectType::Sextile => "sextile",
            AspectType::Square => "square",
            AspectType::Trine => "trine",
            AspectType::Opposition => "opposition",
        })
    }
}

/// Classifies the major aspect between two longitudes, if any, returning the
/// aspect and its orb (absolute deviation from exact). The orb windows of the
/// five major aspects never overlap, so at most one aspect matches.
pub fn major_aspect(lon_a: f64, lon_b: f64) -> Option<(AspectType, f64)> {
    let mut separation = (lon_a - lon_b).rem_euclid(360.0);
    if separation > 180.0 {
        separation = 360.0 - separation;
    }
    AspectType::ALL.iter().find_map(|aspect| {
        let orb = (separation - aspect.angle()).abs();
        (orb <= aspect.max_orb()).then_some((*aspect, orb))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_angles_classify_with_zero_orb() {
        for aspect in AspectType::ALL {
            let (found, orb) = major_aspect(10.0, 10.0 + aspect.angle()).unwrap();
            assert_eq!(found, aspect);
            assert!(orb < 1e-9);
        }
    }

    #[test]
    fn test_separation_is_direction_agnostic() {
        // 350° and 20° are 30° apart, not 330°.
        assert!(major_aspect(350.0, 20.0).is_none());
        let (aspect, orb) = major_aspect(355.0, 55.0).unwrap();
        assert_eq!(aspect, AspectType::Sextile);
        assert!(orb < 1e-9);
    }

    #[test]
    fn test_orb_edges() {
        let (aspect, orb) = major_aspect(0.0, 96.9).unwrap();
        assert_eq!(aspect, AspectType::Square);
        assert!((orb - 6.9).abs() < 1e-9);

        // Just past the square orb.
        assert!(major_aspect(0.0, 97.1).is_none());
    }

    #[test]
    fn test_mid_separation_is_no_aspect() {
        assert!(major_aspect(0.0, 45.0).is_none());
        assert!(major_aspect(0.0, 150.0).is_none());
    }
}
