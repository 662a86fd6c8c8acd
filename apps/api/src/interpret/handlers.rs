//! Axum route handlers for the chart and interpretation APIs.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::deriver::DATE_FORMAT;
use crate::chart::models::{BigThree, ChartRecord, ChartWarning};
use crate::config::Config;
use crate::errors::AppError;
use crate::interpret::{resolve_chart, run_interpretation, InterpretResponse};
use crate::models::birth::{BirthInput, GeoCoordinate};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body for the chart-only endpoint — no name or gender needed.
#[derive(Debug, Deserialize)]
pub struct ChartRequestBody {
    pub place: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub big_three: BigThree,
    pub coordinate: GeoCoordinate,
    pub timezone: String,
    pub utc_offset: String,
    pub chart: ChartRecord,
    pub warnings: Vec<ChartWarning>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chart
///
/// Geocodes the birthplace and returns the derived natal chart without
/// calling the generation backend. Useful for previewing the chart.
pub async fn handle_chart(
    State(state): State<AppState>,
    Json(request): Json<ChartRequestBody>,
) -> Result<Json<ChartResponse>, AppError> {
    require_non_empty("place", &request.place)?;
    validate_birth_date(&request.date, &state.config)?;

    let input = BirthInput {
        name: String::new(),
        place: request.place,
        date: request.date,
        time: request.time,
        gender: None,
    };

    let (coordinate, derived) = resolve_chart(
        state.geocoder.as_ref(),
        state.timezones.as_ref(),
        state.ephemeris.as_ref(),
        &input,
    )
    .await?;

    Ok(Json(ChartResponse {
        big_three: derived.record.big_three(),
        coordinate,
        timezone: derived.timezone,
        utc_offset: derived.utc_offset,
        chart: derived.record,
        warnings: derived.warnings,
    }))
}

/// POST /api/v1/interpret
///
/// Full pipeline: geocode → chart → prompt → generation backend. Returns the
/// chart plus the generated partner-traits narrative.
pub async fn handle_interpret(
    State(state): State<AppState>,
    Json(input): Json<BirthInput>,
) -> Result<Json<InterpretResponse>, AppError> {
    require_non_empty("name", &input.name)?;
    require_non_empty("place", &input.place)?;
    validate_birth_date(&input.date, &state.config)?;

    let response = run_interpretation(
        state.geocoder.as_ref(),
        state.timezones.as_ref(),
        state.ephemeris.as_ref(),
        state.generator.as_ref(),
        &state.log,
        input,
    )
    .await?;

    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// The birth date must parse and fall within [min_birth_date, today].
fn validate_birth_date(date_str: &str, config: &Config) -> Result<(), AppError> {
    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|e| AppError::DateParse(format!("date {date_str:?}: {e}")))?;

    let today = Utc::now().date_naive();
    if date < config.min_birth_date || date > today {
        return Err(AppError::Validation(format!(
            "date of birth must be between {} and {today}",
            config.min_birth_date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    fn config() -> Config {
        Config {
            backend: BackendKind::Remote,
            llm_api_base: "https://api.example.test/v1".to_string(),
            llm_api_key: Some("test-key".to_string()),
            llm_model: "test-model".to_string(),
            geocoder_base_url: "https://nominatim.example.test".to_string(),
            min_birth_date: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
            generation_log_path: None,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_non_iso_date_is_a_parse_error() {
        let err = validate_birth_date("15-06-1995", &config()).unwrap_err();
        assert!(matches!(err, AppError::DateParse(_)));
    }

    #[test]
    fn test_date_before_minimum_rejected() {
        let err = validate_birth_date("1949-12-31", &config()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_future_date_rejected() {
        let err = validate_birth_date("2999-01-01", &config()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_in_range_date_accepted() {
        assert!(validate_birth_date("1995-06-15", &config()).is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        assert!(require_non_empty("name", "   ").is_err());
        assert!(require_non_empty("place", "London").is_ok());
    }
}
