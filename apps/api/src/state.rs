use std::sync::Arc;

use crate::config::Config;
use crate::ephemeris::Ephemeris;
use crate::geo::timezone::TimezoneLookup;
use crate::geo::Geocoder;
use crate::interpret::logbook::GenerationLog;
use crate::llm::GenerationBackend;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external capability sits behind a trait so the pipeline can be
/// exercised with fakes in tests.
#[derive(Clone)]
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    /// Timezone-boundary index — built once at startup, lookups are cheap.
    pub timezones: Arc<dyn TimezoneLookup>,
    pub ephemeris: Arc<dyn Ephemeris>,
    /// Selected via GENERATION_BACKEND (remote | local).
    pub generator: Arc<dyn GenerationBackend>,
    pub log: GenerationLog,
    pub config: Config,
}
