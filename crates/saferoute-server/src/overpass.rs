//! Minimal Overpass API client shared by the lighting and city lookups.

use reqwest::Client;
use saferoute_core::GeoPoint;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::FetchError;

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub tags: Option<HashMap<String, String>>,
}

impl OverpassElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl OverpassClient {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Server-side timeout embedded in the query, in seconds.
    fn query_timeout_s(&self) -> u64 {
        self.timeout.as_secs().max(5)
    }

    /// Run one Overpass QL query. A single attempt; callers decide on retries.
    pub async fn query(&self, ql: &str) -> Result<OverpassResponse, FetchError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/plain")
            .timeout(self.timeout)
            .body(ql.to_string())
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(&self.url, &err))?;

        if !response.status().is_success() {
            return Err(FetchError::from_status(&self.url, response.status()));
        }

        response
            .json::<OverpassResponse>()
            .await
            .map_err(|err| FetchError::Parse(err.to_string()))
    }

    /// Ways tagged `highway` within `radius_m` of any sample, as one batch.
    pub fn road_query(&self, samples: &[GeoPoint], radius_m: f64) -> String {
        let radius = radius_m.round() as i64;
        let clauses: String = samples
            .iter()
            .map(|p| format!("  way(around:{radius},{:.6},{:.6})[\"highway\"];\n", p.lat, p.lng))
            .collect();
        format!(
            "[out:json][timeout:{}];\n(\n{clauses});\nout tags;",
            self.query_timeout_s()
        )
    }

    /// City and town nodes within `radius_m` of `point`.
    pub fn settlement_query(&self, point: GeoPoint, radius_m: f64) -> String {
        let radius = radius_m.round() as i64;
        format!(
            "[out:json][timeout:{}];\nnode(around:{radius},{:.6},{:.6})[\"place\"~\"^(city|town)$\"];\nout body;",
            self.query_timeout_s(),
            point.lat,
            point.lng
        )
    }
}
