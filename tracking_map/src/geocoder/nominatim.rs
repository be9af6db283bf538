use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shipment_tracker_lib::coordinate::Coordinate;

use super::{GeocodeError, Geocoder};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Live lookup against an OSM Nominatim compatible search endpoint
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodeError::Backend(format!("Failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("Nominatim lookup for \"{}\"", query);

        let response = self.client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send().await
            .map_err(|e| GeocodeError::Backend(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Backend(format!("{url} answered {}", response.status())));
        }

        let hits: Vec<SearchHit> = response
            .json().await
            .map_err(|e| GeocodeError::Malformed(format!("Unparseable search response: {e}")))?;

        hits.first().map(parse_hit).transpose()
    }
}

fn parse_hit(hit: &SearchHit) -> Result<Coordinate, GeocodeError> {
    let latitude = hit.lat.parse::<f64>().map_err(|_| GeocodeError::Malformed(format!("Bad latitude {}", hit.lat)))?;
    let longitude = hit.lon.parse::<f64>().map_err(|_| GeocodeError::Malformed(format!("Bad longitude {}", hit.lon)))?;

    if !(-90. ..=90.).contains(&latitude) || !(-180. ..=180.).contains(&longitude) {
        return Err(GeocodeError::Malformed(format!("Out of range position {latitude}, {longitude}")));
    }

    Ok(Coordinate::new(latitude, longitude))
}
