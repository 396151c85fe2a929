//! Ambient lighting estimation for a route path.
//!
//! Samples the path, checks the fingerprint cache, and otherwise scores the
//! roads the road-attribute service reports around each sample.

use saferoute_core::lighting::{score_segments, RoadSegment};
use saferoute_core::spatial::{fingerprint, sample_path};
use saferoute_core::{GeoPoint, DEFAULT_LIGHTING_SCORE, NO_DATA_LIGHTING_SCORE};
use serde::Serialize;
use std::sync::Arc;

use crate::backoff::{retry_transient, RetryPolicy};
use crate::cache::LightingCache;
use crate::config::Config;
use crate::overpass::{OverpassClient, OverpassResponse};

/// Where a lighting score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingSource {
    Cache,
    Live,
    /// Lookup succeeded but found no roads.
    NoData,
    /// Lookup failed; the neutral default was used and not cached.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingEstimate {
    pub score: u8,
    pub source: LightingSource,
    pub attempts_made: u32,
}

#[derive(Debug, Clone)]
pub struct LightingEstimator {
    overpass: OverpassClient,
    cache: Arc<LightingCache>,
    policy: RetryPolicy,
    sample_count: usize,
    radius_m: f64,
}

impl LightingEstimator {
    pub fn new(
        overpass: OverpassClient,
        cache: Arc<LightingCache>,
        policy: RetryPolicy,
        config: &Config,
    ) -> Self {
        Self {
            overpass,
            cache,
            policy,
            sample_count: config.lighting_sample_count.clamp(10, 15),
            radius_m: config.lighting_radius_m.clamp(60.0, 100.0),
        }
    }

    pub fn cache(&self) -> &Arc<LightingCache> {
        &self.cache
    }

    /// Lighting score in `2..=10`. Never fails.
    pub async fn estimate(&self, path: &[GeoPoint]) -> u8 {
        self.estimate_detailed(path).await.score
    }

    pub async fn estimate_detailed(&self, path: &[GeoPoint]) -> LightingEstimate {
        let samples: Vec<GeoPoint> = sample_path(path, self.sample_count)
            .into_iter()
            .filter(GeoPoint::is_finite)
            .collect();
        if samples.is_empty() {
            return LightingEstimate {
                score: DEFAULT_LIGHTING_SCORE,
                source: LightingSource::Fallback,
                attempts_made: 0,
            };
        }

        let key = fingerprint(&samples);
        if let Some(score) = self.cache.get(&key) {
            tracing::debug!("lighting cache hit for {} samples", samples.len());
            return LightingEstimate {
                score,
                source: LightingSource::Cache,
                attempts_made: 0,
            };
        }

        let query = self.overpass.road_query(&samples, self.radius_m);
        let result = retry_transient(&self.policy, "lighting lookup", || {
            self.overpass.query(&query)
        })
        .await;

        let payload = match result.outcome {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(
                    "lighting lookup failed after {} attempt(s), using default: {}",
                    result.attempts_made,
                    err
                );
                return LightingEstimate {
                    score: DEFAULT_LIGHTING_SCORE,
                    source: LightingSource::Fallback,
                    attempts_made: result.attempts_made,
                };
            }
        };

        let segments = segments_from_response(payload);
        let (score, source) = match score_segments(&segments) {
            Some(score) => (score, LightingSource::Live),
            None => (NO_DATA_LIGHTING_SCORE, LightingSource::NoData),
        };
        tracing::debug!(
            "lighting score {} from {} road segment(s)",
            score,
            segments.len()
        );
        self.cache.insert(key, score);

        LightingEstimate {
            score,
            source,
            attempts_made: result.attempts_made,
        }
    }
}

fn segments_from_response(payload: OverpassResponse) -> Vec<RoadSegment> {
    payload
        .elements
        .iter()
        .filter(|element| element.tag("highway").is_some())
        .map(|element| RoadSegment::from_tags(element.id, element.tag("lit"), element.tag("highway")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_skip_elements_without_highway_tag() {
        let json = r#"{"elements":[
            {"type":"way","id":1,"tags":{"highway":"primary","lit":"yes"}},
            {"type":"way","id":2,"tags":{"building":"yes"}},
            {"type":"way","id":3}
        ]}"#;
        let payload: OverpassResponse = serde_json::from_str(json).unwrap();
        let segments = segments_from_response(payload);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 1);
        assert_eq!(segments[0].score(), 10);
    }
}
