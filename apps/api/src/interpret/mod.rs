//! Interpretation — orchestrates the full partner-traits pipeline.
//!
//! Flow: geocode → derive_chart → build_prompt → generation backend →
//! logbook → response. Chart warnings ride along in the response; a
//! generation failure is a typed error, never a fabricated narrative.

pub mod composer;
pub mod handlers;
pub mod logbook;
pub mod prompts;

use serde::Serialize;
use tracing::info;

use crate::chart::deriver::{derive_chart, DerivedChart};
use crate::chart::models::{BigThree, ChartRecord, ChartWarning};
use crate::ephemeris::Ephemeris;
use crate::errors::AppError;
use crate::geo::timezone::TimezoneLookup;
use crate::geo::Geocoder;
use crate::interpret::composer::build_prompt;
use crate::interpret::logbook::{GenerationLog, GenerationLogRecord};
use crate::llm::{GenerationBackend, SamplingParams};
use crate::models::birth::{BirthInput, GeoCoordinate};

/// Response from the full interpretation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct InterpretResponse {
    pub big_three: BigThree,
    pub coordinate: GeoCoordinate,
    pub timezone: String,
    pub utc_offset: String,
    pub chart: ChartRecord,
    pub warnings: Vec<ChartWarning>,
    pub interpretation: String,
    pub backend: String,
}

/// Geocodes the birthplace and derives the chart — the shared front half of
/// both the chart and interpret endpoints.
pub async fn resolve_chart(
    geocoder: &dyn Geocoder,
    timezones: &dyn TimezoneLookup,
    ephemeris: &dyn Ephemeris,
    input: &BirthInput,
) -> Result<(GeoCoordinate, DerivedChart), AppError> {
    info!("Geocoding birthplace {:?}", input.place);
    let coordinate = geocoder.geocode(&input.place).await?;

    info!(
        "Deriving chart for {} {} at ({}, {})",
        input.date, input.time, coordinate.latitude, coordinate.longitude
    );
    let derived = derive_chart(&input.date, &input.time, coordinate, timezones, ephemeris)?;

    Ok((coordinate, derived))
}

/// Runs the full interpretation pipeline.
///
/// Steps:
/// 1. geocode the birthplace
/// 2. derive the natal chart (warnings collected, not raised)
/// 3. compose the partner-traits prompt
/// 4. call the generation backend with the fixed sampling parameters
/// 5. append the outcome to the generation logbook, success or failure
pub async fn run_interpretation(
    geocoder: &dyn Geocoder,
    timezones: &dyn TimezoneLookup,
    ephemeris: &dyn Ephemeris,
    generator: &dyn GenerationBackend,
    log: &GenerationLog,
    input: BirthInput,
) -> Result<InterpretResponse, AppError> {
    let (coordinate, derived) = resolve_chart(geocoder, timezones, ephemeris, &input).await?;

    let prompt = build_prompt(&derived.record, &input)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize prompt context: {e}")))?;

    info!("Requesting interpretation from {} backend", generator.name());
    match generator.generate(&prompt, &SamplingParams::default()).await {
        Ok(interpretation) => {
            log.append(&GenerationLogRecord::success(&prompt.user, &interpretation))
                .await;
            Ok(InterpretResponse {
                big_three: derived.record.big_three(),
                coordinate,
                timezone: derived.timezone,
                utc_offset: derived.utc_offset,
                chart: derived.record,
                warnings: derived.warnings,
                interpretation,
                backend: generator.name().to_string(),
            })
        }
        Err(e) => {
            log.append(&GenerationLogRecord::error(&prompt.user, &e.to_string()))
                .await;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{ChartRequest, EphemerisError, Node, Planet, RawBody, RawChart};
    use crate::geo::GeocodeError;
    use crate::interpret::logbook::LogStatus;
    use crate::llm::{ComposedPrompt, GenerationError};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct FakeGeocoder {
        result: Option<GeoCoordinate>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, place: &str) -> Result<GeoCoordinate, GeocodeError> {
            self.result
                .ok_or_else(|| GeocodeError::NotFound(place.to_string()))
        }
    }

    struct FakeTimezones;

    impl TimezoneLookup for FakeTimezones {
        fn timezone_at(&self, _coordinate: GeoCoordinate) -> Option<String> {
            Some("America/New_York".to_string())
        }
    }

    struct FakeEphemeris;

    impl Ephemeris for FakeEphemeris {
        fn compute(&self, _request: &ChartRequest) -> Result<RawChart, EphemerisError> {
            let mut bodies = BTreeMap::new();
            for (i, planet) in Planet::ALL.into_iter().enumerate() {
                bodies.insert(
                    planet,
                    RawBody {
                        lon: 15.0 + 33.0 * i as f64,
                        speed: 1.0,
                    },
                );
            }
            let mut nodes = BTreeMap::new();
            nodes.insert(Node::North, 95.0);
            nodes.insert(Node::South, 275.0);
            Ok(RawChart {
                bodies,
                nodes,
                ascendant: 200.0,
                houses: std::array::from_fn(|i| (200.0 + 30.0 * i as f64) % 360.0),
            })
        }
    }

    struct FakeGenerator {
        reply: Result<&'static str, ()>,
    }

    #[async_trait]
    impl GenerationBackend for FakeGenerator {
        async fn generate(
            &self,
            _prompt: &ComposedPrompt,
            _params: &SamplingParams,
        ) -> Result<String, GenerationError> {
            self.reply.map(str::to_string).map_err(|_| {
                GenerationError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }
            })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn input() -> BirthInput {
        BirthInput {
            name: "Test Person".to_string(),
            place: "New York, USA".to_string(),
            date: "1995-06-15".to_string(),
            time: "12:00".to_string(),
            gender: None,
        }
    }

    const NYC: GeoCoordinate = GeoCoordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    #[tokio::test]
    async fn test_pipeline_returns_interpretation_and_logs_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generations.jsonl");
        let log = GenerationLog::new(Some(path.clone()));

        let response = run_interpretation(
            &FakeGeocoder { result: Some(NYC) },
            &FakeTimezones,
            &FakeEphemeris,
            &FakeGenerator { reply: Ok("Your ideal partner...") },
            &log,
            input(),
        )
        .await
        .unwrap();

        assert_eq!(response.interpretation, "Your ideal partner...");
        assert_eq!(response.backend, "fake");
        assert_eq!(response.timezone, "America/New_York");
        assert_eq!(response.utc_offset, "-04:00");
        assert!(response.warnings.is_empty());
        assert!(response.big_three.sun.is_some());

        let contents = std::fs::read_to_string(&path).unwrap();
        let record: GenerationLogRecord =
            serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(record.status, LogStatus::Success);
        assert!(record.prompt.contains("Test Person"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_typed_error_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generations.jsonl");
        let log = GenerationLog::new(Some(path.clone()));

        let err = run_interpretation(
            &FakeGeocoder { result: Some(NYC) },
            &FakeTimezones,
            &FakeEphemeris,
            &FakeGenerator { reply: Err(()) },
            &log,
            input(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));

        let contents = std::fs::read_to_string(&path).unwrap();
        let record: GenerationLogRecord =
            serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(record.status, LogStatus::Error);
        assert!(record.response.contains("500"));
    }

    #[tokio::test]
    async fn test_unresolvable_place_is_geocode_not_found() {
        let err = run_interpretation(
            &FakeGeocoder { result: None },
            &FakeTimezones,
            &FakeEphemeris,
            &FakeGenerator { reply: Ok("unused") },
            &GenerationLog::disabled(),
            input(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::GeocodeNotFound(_)));
    }
}
