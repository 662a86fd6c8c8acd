//! Geocoding — free-text place to coordinates.
//!
//! One trait, one production implementation (a Nominatim-style endpoint).
//! Place resolution failure is terminal for the request; the caller surfaces
//! it rather than guessing a location.

pub mod timezone;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::birth::GeoCoordinate;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no location found for {0:?}")]
    NotFound(String),

    #[error("geocoding transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding response malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<GeoCoordinate, GeocodeError>;
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                // Nominatim's usage policy requires an identifying agent.
                .user_agent(concat!("astrovars-api/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<GeoCoordinate, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(place.to_string()))?;

        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("latitude {:?}", hit.lat)))?;
        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|_| GeocodeError::Malformed(format!("longitude {:?}", hit.lon)))?;

        debug!("Geocoded {place:?} to ({latitude}, {longitude})");
        Ok(GeoCoordinate {
            latitude,
            longitude,
        })
    }
}
