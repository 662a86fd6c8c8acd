//! The natal chart record and its serialized shape.
//!
//! Top-level keys (`Sun`, `Moon`, `Ascendant`, `Planets`, `Nodes`, `Houses`,
//! `Aspects`, `ElementBalance`, `ModalityBalance`, `Chiron`, `Stelliums`) are
//! part of the prompt contract — the composer serializes the whole record
//! into the generation prompt, so renames here change model-visible text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chart::aspects::AspectType;
use crate::chart::zodiac::{ElementBalance, ModalityBalance, Sign};
use crate::ephemeris::{Node, Planet};

/// Position of a classical body. All fields unset means the ephemeris could
/// not resolve the body — kept in the record rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub sign: Option<Sign>,
    pub lon: Option<f64>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub sign: Option<Sign>,
    pub lon: Option<f64>,
}

/// A chart angle or house cusp — always resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnglePosition {
    pub sign: Sign,
    pub lon: f64,
}

/// A classified angular relationship between two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub p1: Planet,
    pub p2: Planet,
    #[serde(rename = "type")]
    pub aspect: AspectType,
    pub orb: f64,
}

/// Immutable snapshot of a natal chart. Computed once per request, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChartRecord {
    pub sun: BodyPosition,
    pub moon: BodyPosition,
    pub ascendant: AnglePosition,
    pub planets: BTreeMap<Planet, BodyPosition>,
    pub nodes: BTreeMap<Node, NodePosition>,
    pub houses: Vec<AnglePosition>,
    pub aspects: Vec<Aspect>,
    pub element_balance: ElementBalance,
    pub modality_balance: ModalityBalance,
    /// Unsupported placeholder — always `null`.
    pub chiron: Option<BodyPosition>,
    /// Unsupported placeholder — always empty.
    pub stelliums: Vec<String>,
}

impl ChartRecord {
    pub fn big_three(&self) -> BigThree {
        BigThree {
            sun: self.sun.sign,
            moon: self.moon.sign,
            ascendant: Some(self.ascendant.sign),
        }
    }

    /// Position of a single classical body, unset if unresolved.
    pub fn planet(&self, planet: Planet) -> BodyPosition {
        self.planets.get(&planet).copied().unwrap_or_default()
    }

    /// 1-based house cusp lookup.
    pub fn house(&self, number: usize) -> Option<AnglePosition> {
        number
            .checked_sub(1)
            .and_then(|idx| self.houses.get(idx))
            .copied()
    }
}

/// Sun, Moon, and Ascendant signs — the headline summary shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BigThree {
    pub sun: Option<Sign>,
    pub moon: Option<Sign>,
    pub ascendant: Option<Sign>,
}

/// A degradation that did not abort the computation. Carried alongside the
/// chart so callers can tell an exact chart from a best-effort one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartWarning {
    /// No IANA zone found for the coordinate; chart computed in UTC.
    TimezoneUnresolved { fallback: String },
    /// Zone resolved but the local time has no single offset (DST gap);
    /// chart computed at +00:00.
    OffsetUnresolved { fallback: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_record_serializes_original_top_level_keys() {
        let record = ChartRecord {
            sun: BodyPosition::default(),
            moon: BodyPosition::default(),
            ascendant: AnglePosition {
                sign: Sign::Leo,
                lon: 123.4,
            },
            planets: BTreeMap::new(),
            nodes: BTreeMap::new(),
            houses: Vec::new(),
            aspects: Vec::new(),
            element_balance: ElementBalance::default(),
            modality_balance: ModalityBalance::default(),
            chiron: None,
            stelliums: Vec::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "Sun",
            "Moon",
            "Ascendant",
            "Planets",
            "Nodes",
            "Houses",
            "Aspects",
            "ElementBalance",
            "ModalityBalance",
            "Chiron",
            "Stelliums",
        ] {
            assert!(json.get(key).is_some(), "missing top-level key {key}");
        }
    }

    #[test]
    fn test_aspect_serializes_type_field() {
        let aspect = Aspect {
            p1: Planet::Venus,
            p2: Planet::Mars,
            aspect: AspectType::Trine,
            orb: 2.5,
        };
        let json = serde_json::to_value(aspect).unwrap();
        assert_eq!(json["p1"], "Venus");
        assert_eq!(json["p2"], "Mars");
        assert_eq!(json["type"], "trine");
    }

    #[test]
    fn test_node_keys_use_spaced_names() {
        let mut nodes = BTreeMap::new();
        nodes.insert(Node::North, NodePosition::default());
        nodes.insert(Node::South, NodePosition::default());
        let json = serde_json::to_value(&nodes).unwrap();
        assert!(json.get("North Node").is_some());
        assert!(json.get("South Node").is_some());
    }
}
