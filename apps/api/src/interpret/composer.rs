//! Prompt Composer — renders the fixed interpretation prompt from a chart
//! record and the user's birth details.
//!
//! Pure: same chart and user always produce the same prompt. The only
//! failure mode is input serialization.

use serde_json::Error as SerdeError;

use crate::chart::models::ChartRecord;
use crate::chart::zodiac::Sign;
use crate::ephemeris::Planet;
use crate::interpret::prompts::{
    PARTNER_PROMPT_TEMPLATE, PARTNER_SYSTEM_TEMPLATE, UNKNOWN_PLACEMENT,
};
use crate::llm::ComposedPrompt;
use crate::models::birth::BirthInput;

pub fn build_prompt(chart: &ChartRecord, user: &BirthInput) -> Result<ComposedPrompt, SerdeError> {
    let system = PARTNER_SYSTEM_TEMPLATE
        .replace("{sun_sign}", &sign_or_unknown(chart.sun.sign))
        .replace("{moon_sign}", &sign_or_unknown(chart.moon.sign))
        .replace("{asc_sign}", chart.ascendant.sign.name())
        .replace("{venus_sign}", &sign_or_unknown(chart.planet(Planet::Venus).sign))
        .replace("{mars_sign}", &sign_or_unknown(chart.planet(Planet::Mars).sign))
        .replace("{fifth_house}", &house_or_unknown(chart, 5))
        .replace("{seventh_house}", &house_or_unknown(chart, 7))
        .replace("{eighth_house}", &house_or_unknown(chart, 8))
        .replace(
            "{element_balance}",
            &serde_json::to_string(&chart.element_balance)?,
        )
        .replace(
            "{modality_balance}",
            &serde_json::to_string(&chart.modality_balance)?,
        );

    let user_message = PARTNER_PROMPT_TEMPLATE
        .replace("{user_json}", &serde_json::to_string_pretty(user)?)
        .replace("{chart_json}", &serde_json::to_string_pretty(chart)?);

    Ok(ComposedPrompt {
        system,
        user: user_message,
    })
}

fn sign_or_unknown(sign: Option<Sign>) -> String {
    sign.map_or_else(|| UNKNOWN_PLACEMENT.to_string(), |s| s.name().to_string())
}

fn house_or_unknown(chart: &ChartRecord, number: usize) -> String {
    chart
        .house(number)
        .map_or_else(|| UNKNOWN_PLACEMENT.to_string(), |h| h.sign.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::models::{AnglePosition, BodyPosition};
    use crate::chart::zodiac::{ElementBalance, ModalityBalance};
    use std::collections::BTreeMap;

    fn chart_with_positions() -> ChartRecord {
        let mut planets = BTreeMap::new();
        for (planet, lon) in [
            (Planet::Sun, 83.9),
            (Planet::Moon, 123.4),
            (Planet::Venus, 45.0),
            (Planet::Mars, 132.0),
        ] {
            planets.insert(
                planet,
                BodyPosition {
                    sign: Some(Sign::from_longitude(lon)),
                    lon: Some(lon),
                    speed: Some(1.0),
                },
            );
        }
        let sun = planets[&Planet::Sun];
        let moon = planets[&Planet::Moon];
        ChartRecord {
            sun,
            moon,
            ascendant: AnglePosition {
                sign: Sign::Libra,
                lon: 190.0,
            },
            planets,
            nodes: BTreeMap::new(),
            houses: (0..12)
                .map(|i| AnglePosition {
                    sign: Sign::from_longitude(190.0 + 30.0 * i as f64),
                    lon: (190.0 + 30.0 * i as f64) % 360.0,
                })
                .collect(),
            aspects: Vec::new(),
            element_balance: ElementBalance::tally(&[Sign::Gemini, Sign::Leo]),
            modality_balance: ModalityBalance::tally(&[Sign::Gemini, Sign::Leo]),
            chiron: None,
            stelliums: Vec::new(),
        }
    }

    fn user() -> BirthInput {
        BirthInput {
            name: "Ada Lovelace".to_string(),
            place: "London, UK".to_string(),
            date: "1815-12-10".to_string(),
            time: "04:00".to_string(),
            gender: None,
        }
    }

    #[test]
    fn test_prompt_contains_user_name() {
        let prompt = build_prompt(&chart_with_positions(), &user()).unwrap();
        assert!(prompt.user.contains("Ada Lovelace"));
    }

    #[test]
    fn test_prompt_contains_every_top_level_chart_key() {
        let prompt = build_prompt(&chart_with_positions(), &user()).unwrap();
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
            assert!(prompt.user.contains(key), "prompt missing chart key {key}");
        }
    }

    #[test]
    fn test_system_prompt_substitutes_headline_placements() {
        let prompt = build_prompt(&chart_with_positions(), &user()).unwrap();
        assert!(prompt.system.contains("Sun in Gemini"));
        assert!(prompt.system.contains("Moon in Leo"));
        assert!(prompt.system.contains("Ascendant in Libra"));
        assert!(prompt.system.contains("Venus in Taurus"));
        assert!(prompt.system.contains("Mars in Leo"));
        assert!(prompt.system.contains(r#""FIRE":1"#));
        for placeholder in ["{sun_sign}", "{moon_sign}", "{asc_sign}", "{element_balance}"] {
            assert!(
                !prompt.system.contains(placeholder),
                "unsubstituted {placeholder}"
            );
        }
    }

    #[test]
    fn test_missing_placement_renders_unknown_not_placeholder() {
        let mut chart = chart_with_positions();
        chart.planets.remove(&Planet::Venus);
        chart.houses.clear();
        let prompt = build_prompt(&chart, &user()).unwrap();
        assert!(prompt.system.contains("Venus in unknown"));
        assert!(prompt.system.contains("7th House (partnership) in unknown"));
        assert!(!prompt.system.contains("{venus_sign}"));
    }
}
