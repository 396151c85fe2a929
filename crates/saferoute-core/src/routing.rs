//! Route classification, baseline activity and stable route identity.

use crate::models::RoadType;

/// Alternatives slower than the fastest by more than this ratio are scenic.
pub const SCENIC_DURATION_RATIO: f64 = 1.2;
/// Characters of each endpoint address kept in a route id.
const ROUTE_ID_ADDRESS_CHARS: usize = 12;

/// Classify an alternative by its position and duration.
///
/// The first alternative is always the highway option.
pub fn classify_road_type(index: usize, duration_s: f64, fastest_duration_s: f64) -> RoadType {
    if index == 0 {
        return RoadType::Highway;
    }
    if fastest_duration_s > 0.0 && duration_s > fastest_duration_s * SCENIC_DURATION_RATIO {
        RoadType::Scenic
    } else {
        RoadType::Backroads
    }
}

/// Static activity estimate for a road type, 0..=10.
pub fn baseline_activity(road_type: RoadType) -> u8 {
    match road_type {
        RoadType::Highway => 4,
        RoadType::Scenic => 8,
        RoadType::Backroads => 6,
    }
}

/// Identity built from truncated endpoint names and the ordinal index.
///
/// Geometry is deliberately left out, so refetching an unchanged route set
/// yields the same ids.
pub fn route_id(start_address: &str, end_address: &str, index: usize) -> String {
    format!(
        "{}-{}-{}",
        slug(start_address),
        slug(end_address),
        index
    )
}

fn slug(address: &str) -> String {
    let slug: String = address
        .trim()
        .chars()
        .take(ROUTE_ID_ADDRESS_CHARS)
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

/// One-line summary shown under a route.
pub fn describe_route(road_type: RoadType, index: usize, total_routes: usize, distance_km: f64) -> String {
    let kind = match road_type {
        RoadType::Highway => "Main route along major roads",
        RoadType::Scenic => "Longer scenic alternative",
        RoadType::Backroads => "Alternative via local roads",
    };
    format!(
        "{kind} ({distance_km:.1} km, option {} of {})",
        index + 1,
        total_routes.max(index + 1)
    )
}

pub fn seconds_to_minutes(duration_s: f64) -> f64 {
    if duration_s.is_finite() && duration_s > 0.0 {
        duration_s / 60.0
    } else {
        0.0
    }
}

pub fn meters_to_km(distance_m: f64) -> f64 {
    if distance_m.is_finite() && distance_m > 0.0 {
        distance_m / 1000.0
    } else {
        0.0
    }
}
