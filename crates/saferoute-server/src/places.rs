//! Settlements passed along a route.

use futures::future::join_all;
use saferoute_core::spatial::sample_path;
use saferoute_core::{CityWaypoint, GeoPoint};
use std::collections::HashSet;

use crate::config::Config;
use crate::overpass::{OverpassClient, OverpassResponse};

#[derive(Debug, Clone)]
pub struct CityFinder {
    overpass: OverpassClient,
    sample_count: usize,
    radius_m: f64,
    max_results: usize,
}

impl CityFinder {
    pub fn new(overpass: OverpassClient, config: &Config) -> Self {
        Self {
            overpass,
            sample_count: config.city_sample_count.max(3),
            radius_m: config.city_radius_m,
            max_results: config.city_max_results,
        }
    }

    /// Up to three distinct named cities near the interior of `path`.
    ///
    /// The first and last samples are dropped so the origin and destination
    /// are never reported as waypoints. Lookups that fail are skipped.
    pub async fn find(&self, path: &[GeoPoint]) -> Vec<CityWaypoint> {
        let samples = sample_path(path, self.sample_count);
        if samples.len() <= 2 {
            return Vec::new();
        }
        let interior = &samples[1..samples.len() - 1];

        let lookups = interior.iter().map(|point| async move {
            let query = self.overpass.settlement_query(*point, self.radius_m);
            match self.overpass.query(&query).await {
                Ok(payload) => cities_from_response(payload),
                Err(err) => {
                    tracing::warn!("city lookup near {:.4},{:.4} failed: {}", point.lat, point.lng, err);
                    Vec::new()
                }
            }
        });
        let per_sample = join_all(lookups).await;

        let mut seen = HashSet::new();
        per_sample
            .into_iter()
            .flatten()
            .filter(|city| seen.insert(city.name.clone()))
            .take(self.max_results)
            .collect()
    }
}

fn cities_from_response(payload: OverpassResponse) -> Vec<CityWaypoint> {
    payload
        .elements
        .iter()
        .filter_map(|element| {
            let name = element
                .tag("name:en")
                .or_else(|| element.tag("name"))
                .map(str::trim)
                .filter(|name| !name.is_empty())?;
            Some(CityWaypoint {
                name: name.to_string(),
                lat: element.lat?,
                lng: element.lon?,
            })
        })
        .collect()
}
