//! OneMap search API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{GeocodeCandidate, GeocodeError, Geocoder};
use crate::models::Coordinate;

const SEARCH_PATH: &str = "api/common/elastic/search";

/// Geocoder backed by the OneMap elastic search endpoint.
#[derive(Clone)]
pub struct OneMapClient {
    client: Client,
    search_url: Url,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "ADDRESS", default)]
    address: String,
    #[serde(rename = "POSTAL")]
    postal: Option<String>,
    #[serde(rename = "LATITUDE", default)]
    latitude: serde_json::Value,
    #[serde(rename = "LONGITUDE", default)]
    longitude: serde_json::Value,
}

impl OneMapClient {
    /// Create a client against `base_url` (e.g. `https://www.onemap.gov.sg`).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base.join(SEARCH_PATH)?;

        let mut builder = Client::builder().user_agent("Waypost/0.1 (address resolver)");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            search_url,
        })
    }
}

#[async_trait]
impl Geocoder for OneMapClient {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("searchVal", query),
                ("returnGeom", "Y"),
                ("getAddrDetails", "Y"),
                ("pageNum", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Geocoding provider returned {} for '{}'",
                response.status(),
                query
            );
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        parse_response(query, body)
    }
}

fn parse_response(query: &str, body: SearchResponse) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    if body.found == 0 || body.results.is_empty() {
        return Err(GeocodeError::NotFound(query.to_string()));
    }

    let mut candidates = Vec::with_capacity(body.results.len());
    for (rank, hit) in body.results.into_iter().enumerate() {
        match parse_hit(&hit) {
            Ok(coordinate) => candidates.push(GeocodeCandidate {
                coordinate,
                formatted_address: hit.address,
                postal: hit.postal.filter(|p| p != "NIL" && !p.is_empty()),
            }),
            // The first-ranked result is the one the pipeline relies on
            Err(message) if rank == 0 => return Err(GeocodeError::InvalidResult { message }),
            Err(message) => debug!("Skipping geocoder result {}: {}", rank, message),
        }
    }

    Ok(candidates)
}

fn parse_hit(hit: &SearchHit) -> Result<Coordinate, String> {
    let lat = number(&hit.latitude).ok_or_else(|| format!("latitude {}", hit.latitude))?;
    let lng = number(&hit.longitude).ok_or_else(|| format!("longitude {}", hit.longitude))?;
    Coordinate::new(lat, lng).map_err(|e| e.to_string())
}

/// OneMap sends coordinates as strings; accept bare numbers too.
fn number(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
