//! Core data models for route enrichment and ranking.

use serde::{Deserialize, Serialize};

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Ordered polyline of a route, start to end.
pub type Path = Vec<GeoPoint>;

/// Weather at one location.
///
/// `wmo_code == -1` with description `"Unavailable"` marks a failed lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    pub temperature_celsius: f64,
    pub wmo_code: i32,
    pub description: String,
}

impl WeatherPoint {
    pub const UNAVAILABLE_CODE: i32 = -1;
    pub const UNAVAILABLE_DESCRIPTION: &'static str = "Unavailable";

    /// Sentinel returned when a lookup fails.
    pub fn unavailable() -> Self {
        Self {
            temperature_celsius: 0.0,
            wmo_code: Self::UNAVAILABLE_CODE,
            description: Self::UNAVAILABLE_DESCRIPTION.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.wmo_code == Self::UNAVAILABLE_CODE
    }
}

/// A named settlement passed along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWaypoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl CityWaypoint {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointWeather {
    pub name: String,
    pub weather: WeatherPoint,
}

/// Weather for both endpoints and every waypoint city, in route order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWeather {
    pub origin: WeatherPoint,
    pub destination: WeatherPoint,
    pub waypoints: Vec<WaypointWeather>,
}

impl RouteWeather {
    /// Fully degraded result used when nothing could be fetched.
    pub fn unavailable() -> Self {
        Self {
            origin: WeatherPoint::unavailable(),
            destination: WeatherPoint::unavailable(),
            waypoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    Highway,
    Scenic,
    Backroads,
}

impl RoadType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Highway => "Highway",
            Self::Scenic => "Scenic",
            Self::Backroads => "Backroads",
        }
    }
}

/// One route alternative as returned by a directions provider.
///
/// Provider-specific geometry is converted to [`GeoPoint`]s once, when the
/// raw route is built; `raw_geometry` keeps the original for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRoute {
    pub path: Path,
    pub distance_m: f64,
    pub duration_s: f64,
    pub start_address: String,
    pub end_address: String,
    #[serde(default)]
    pub raw_geometry: serde_json::Value,
}

/// A route alternative with lighting, activity and weather attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRoute {
    /// Stable across re-fetches of the same route set.
    pub id: String,
    pub source: String,
    pub destination: String,
    pub eta_minutes: f64,
    pub distance_km: f64,
    /// 0..=10
    pub activity_score: u8,
    /// 2..=10
    pub lighting_score: u8,
    #[serde(default)]
    pub weather: Option<RouteWeather>,
    pub road_type: RoadType,
    pub description: String,
    #[serde(default)]
    pub raw_geometry: serde_json::Value,
}
