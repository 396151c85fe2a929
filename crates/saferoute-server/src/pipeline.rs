//! Turns raw directions alternatives into enriched, classifiable routes.

use chrono::{NaiveDate, NaiveTime};
use futures::future::join_all;
use reqwest::Client;
use saferoute_core::routing::{describe_route, meters_to_km, seconds_to_minutes};
use saferoute_core::spatial::path_length_m;
use saferoute_core::{
    baseline_activity, classify_road_type, route_id, EnrichedRoute, GeoPoint, RawRoute,
};
use std::sync::Arc;

use crate::backoff::RetryPolicy;
use crate::cache::LightingCache;
use crate::config::Config;
use crate::lighting::LightingEstimator;
use crate::overpass::OverpassClient;
use crate::places::CityFinder;
use crate::weather::{WeatherAggregator, WeatherClient};

/// Per-route inputs that depend on the whole alternative set.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext {
    pub index: usize,
    pub total_routes: usize,
    pub fastest_duration_s: f64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct EnrichmentPipeline {
    lighting: LightingEstimator,
    weather: WeatherAggregator,
}

impl EnrichmentPipeline {
    pub fn new(lighting: LightingEstimator, weather: WeatherAggregator) -> Self {
        Self { lighting, weather }
    }

    /// Wire up the external clients from `config` with a fresh lighting cache.
    pub fn with_client(client: Client, config: &Config) -> Self {
        let timeout = config.request_timeout();
        let overpass = OverpassClient::new(client.clone(), config.overpass_url.clone(), timeout);
        let cache = Arc::new(LightingCache::new(config.lighting_cache_max_entries));
        let lighting = LightingEstimator::new(
            overpass.clone(),
            cache,
            RetryPolicy::from_config(config),
            config,
        );
        let weather = WeatherAggregator::new(
            WeatherClient::new(client, config.weather_url.clone(), timeout),
            CityFinder::new(overpass, config),
        );
        Self::new(lighting, weather)
    }

    pub fn lighting_cache(&self) -> &Arc<LightingCache> {
        self.lighting.cache()
    }

    /// Enrich one route. Lighting and weather run concurrently and neither
    /// can fail, so every route comes back fully populated.
    pub async fn enrich(&self, raw: &RawRoute, ctx: &RouteContext) -> EnrichedRoute {
        let (lighting_score, weather) = tokio::join!(
            self.lighting.estimate(&raw.path),
            self.weather.aggregate(
                ctx.origin,
                ctx.destination,
                Some(raw.path.as_slice()),
                ctx.date,
                ctx.time
            ),
        );

        let road_type = classify_road_type(ctx.index, raw.duration_s, ctx.fastest_duration_s);
        let distance_km = meters_to_km(route_distance_m(raw));

        EnrichedRoute {
            id: route_id(&raw.start_address, &raw.end_address, ctx.index),
            source: raw.start_address.clone(),
            destination: raw.end_address.clone(),
            eta_minutes: seconds_to_minutes(raw.duration_s),
            distance_km,
            activity_score: baseline_activity(road_type),
            lighting_score,
            weather: Some(weather),
            road_type,
            description: describe_route(road_type, ctx.index, ctx.total_routes, distance_km),
            raw_geometry: raw.raw_geometry.clone(),
        }
    }

    /// Enrich every alternative concurrently, preserving input order.
    pub async fn enrich_all(
        &self,
        raw_routes: &[RawRoute],
        origin: GeoPoint,
        destination: GeoPoint,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> Vec<EnrichedRoute> {
        if raw_routes.is_empty() {
            return Vec::new();
        }
        let fastest_duration_s = fastest_duration(raw_routes).unwrap_or(0.0);
        let total_routes = raw_routes.len();
        tracing::debug!(
            "enriching {} route(s), fastest {:.0}s",
            total_routes,
            fastest_duration_s
        );

        let jobs = raw_routes.iter().enumerate().map(|(index, raw)| {
            let ctx = RouteContext {
                index,
                total_routes,
                fastest_duration_s,
                origin,
                destination,
                date,
                time,
            };
            async move { self.enrich(raw, &ctx).await }
        });
        join_all(jobs).await
    }
}

/// Provider distance, or the geometry's length when the provider sent none.
pub fn route_distance_m(raw: &RawRoute) -> f64 {
    if raw.distance_m.is_finite() && raw.distance_m > 0.0 {
        raw.distance_m
    } else {
        path_length_m(&raw.path)
    }
}

/// Shortest finite duration among the alternatives.
pub fn fastest_duration(raw_routes: &[RawRoute]) -> Option<f64> {
    raw_routes
        .iter()
        .map(|route| route.duration_s)
        .filter(|duration| duration.is_finite())
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(duration_s: f64) -> RawRoute {
        RawRoute {
            path: vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.1)],
            distance_m: 10_000.0,
            duration_s,
            start_address: "A".to_string(),
            end_address: "B".to_string(),
            raw_geometry: serde_json::Value::Null,
        }
    }

    #[test]
    fn fastest_is_minimum_not_first() {
        let routes = vec![raw(3_300.0), raw(3_000.0), raw(3_900.0)];
        assert_eq!(fastest_duration(&routes), Some(3_000.0));
    }

    #[test]
    fn missing_distance_falls_back_to_path_length() {
        let mut route = raw(600.0);
        assert_eq!(route_distance_m(&route), 10_000.0);

        route.distance_m = 0.0;
        // 0.1 degree of longitude on the equator
        let measured = route_distance_m(&route);
        assert!((measured - 11_119.5).abs() < 1.0, "{measured}");

        route.distance_m = f64::NAN;
        assert_eq!(route_distance_m(&route), measured);
    }

    #[test]
    fn fastest_ignores_non_finite_durations() {
        let routes = vec![raw(f64::NAN), raw(600.0)];
        assert_eq!(fastest_duration(&routes), Some(600.0));
        assert_eq!(fastest_duration(&[]), None);
    }
}
