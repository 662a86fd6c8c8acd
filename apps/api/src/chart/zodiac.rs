//! The twelve zodiac signs and their static element / modality partition.
//!
//! Both classifications are total and disjoint: every sign belongs to exactly
//! one of the 4 elements and exactly one of the 3 modalities. Pure data — no
//! dynamic dispatch, no configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Sign {
    /// Ecliptic order, Aries first. Index i covers longitudes [30i, 30i+30).
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    /// Maps an ecliptic longitude (any real number of degrees) to its sign.
    pub fn from_longitude(lon: f64) -> Sign {
        let idx = (lon.rem_euclid(360.0) / 30.0) as usize;
        // rem_euclid keeps idx in 0..12; min() guards the lon == 360.0-epsilon
        // rounding edge where the division lands exactly on 12.0.
        Sign::ALL[idx.min(11)]
    }

    pub fn element(&self) -> Element {
        match self {
            Sign::Aries | Sign::Leo | Sign::Sagittarius => Element::Fire,
            Sign::Taurus | Sign::Virgo | Sign::Capricorn => Element::Earth,
            Sign::Gemini | Sign::Libra | Sign::Aquarius => Element::Air,
            Sign::Cancer | Sign::Scorpio | Sign::Pisces => Element::Water,
        }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Sign::Aries | Sign::Cancer | Sign::Libra | Sign::Capricorn => Modality::Cardinal,
            Sign::Taurus | Sign::Leo | Sign::Scorpio | Sign::Aquarius => Modality::Fixed,
            Sign::Gemini | Sign::Virgo | Sign::Sagittarius | Sign::Pisces => Modality::Mutable,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Count of classical bodies per element. Field order is the serialized order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ElementBalance {
    pub fire: u8,
    pub earth: u8,
    pub air: u8,
    pub water: u8,
}

impl ElementBalance {
    pub fn tally(signs: &[Sign]) -> Self {
        let mut balance = ElementBalance::default();
        for sign in signs {
            match sign.element() {
                Element::Fire => balance.fire += 1,
                Element::Earth => balance.earth += 1,
                Element::Air => balance.air += 1,
                Element::Water => balance.water += 1,
            }
        }
        balance
    }

    pub fn total(&self) -> u32 {
        u32::from(self.fire) + u32::from(self.earth) + u32::from(self.air) + u32::from(self.water)
    }
}

/// Count of classical bodies per modality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ModalityBalance {
    pub cardinal: u8,
    pub fixed: u8,
    pub mutable: u8,
}

impl ModalityBalance {
    pub fn tally(signs: &[Sign]) -> Self {
        let mut balance = ModalityBalance::default();
        for sign in signs {
            match sign.modality() {
                Modality::Cardinal => balance.cardinal += 1,
                Modality::Fixed => balance.fixed += 1,
                Modality::Mutable => balance.mutable += 1,
            }
        }
        balance
    }

    pub fn total(&self) -> u32 {
        u32::from(self.cardinal) + u32::from(self.fixed) + u32::from(self.mutable)
    }
}
