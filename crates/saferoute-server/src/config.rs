//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub user_agent: String,
    /// Timeout applied to each individual external call.
    pub request_timeout_s: u64,
    pub overpass_url: String,
    pub weather_url: String,
    pub directions_url: String,
    /// Alternatives requested from the directions provider.
    pub directions_alternatives: usize,
    /// Points sampled per path for lighting lookups (10..=15).
    pub lighting_sample_count: usize,
    /// Road search radius around each lighting sample (60..=100 m).
    pub lighting_radius_m: f64,
    pub lighting_cache_max_entries: usize,
    pub city_sample_count: usize,
    pub city_radius_m: f64,
    pub city_max_results: usize,
    pub retry_base_ms: u64,
    pub retry_factor: u32,
    pub retry_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            user_agent: "saferoute/0.2".to_string(),
            request_timeout_s: 12,
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            directions_url: "https://router.project-osrm.org".to_string(),
            directions_alternatives: 3,
            lighting_sample_count: 12,
            lighting_radius_m: 80.0,
            lighting_cache_max_entries: 512,
            city_sample_count: 7,
            city_radius_m: 10_000.0,
            city_max_results: 3,
            retry_base_ms: 1_000,
            retry_factor: 2,
            retry_max_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SAFEROUTE_PORT", defaults.server_port),
            user_agent: env::var("SAFEROUTE_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_s: env_parse("SAFEROUTE_REQUEST_TIMEOUT_S", defaults.request_timeout_s)
                .clamp(1, 60),
            overpass_url: env::var("SAFEROUTE_OVERPASS_URL").unwrap_or(defaults.overpass_url),
            weather_url: env::var("SAFEROUTE_WEATHER_URL").unwrap_or(defaults.weather_url),
            directions_url: env::var("SAFEROUTE_DIRECTIONS_URL")
                .unwrap_or(defaults.directions_url),
            directions_alternatives: env_parse(
                "SAFEROUTE_DIRECTIONS_ALTERNATIVES",
                defaults.directions_alternatives,
            )
            .clamp(1, 5),
            lighting_sample_count: env_parse(
                "SAFEROUTE_LIGHTING_SAMPLES",
                defaults.lighting_sample_count,
            )
            .clamp(10, 15),
            lighting_radius_m: env_parse("SAFEROUTE_LIGHTING_RADIUS_M", defaults.lighting_radius_m)
                .clamp(60.0, 100.0),
            lighting_cache_max_entries: env_parse(
                "SAFEROUTE_LIGHTING_CACHE_MAX_ENTRIES",
                defaults.lighting_cache_max_entries,
            )
            .max(1),
            city_sample_count: defaults.city_sample_count,
            city_radius_m: env_parse("SAFEROUTE_CITY_RADIUS_M", defaults.city_radius_m)
                .clamp(1_000.0, 50_000.0),
            city_max_results: defaults.city_max_results,
            retry_base_ms: env_parse("SAFEROUTE_RETRY_BASE_MS", defaults.retry_base_ms),
            retry_factor: env_parse("SAFEROUTE_RETRY_FACTOR", defaults.retry_factor).max(1),
            retry_max_attempts: env_parse(
                "SAFEROUTE_RETRY_MAX_ATTEMPTS",
                defaults.retry_max_attempts,
            )
            .clamp(1, 5),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
