pub mod error;
pub mod lighting;
pub mod models;
pub mod profiles;
pub mod ranking;
pub mod routing;
pub mod spatial;
pub mod weather;

pub use error::CoreError;
pub use lighting::{
    score_segments, LitAttribute, RoadClass, RoadSegment, DEFAULT_LIGHTING_SCORE,
    NO_DATA_LIGHTING_SCORE,
};
pub use models::{
    CityWaypoint, EnrichedRoute, GeoPoint, Path, RawRoute, RoadType, RouteWeather,
    WaypointWeather, WeatherPoint,
};
pub use profiles::{find_profile, profile_catalog, DrivingProfile, ProfileWeights};
pub use ranking::{explain_route, rank_routes, rank_with_reasons, RankedRoute};
pub use routing::{baseline_activity, classify_road_type, route_id};
pub use spatial::{fingerprint, haversine_distance, sample_path};
pub use weather::describe_weather_code;
