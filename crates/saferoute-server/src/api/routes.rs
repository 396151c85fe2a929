//! REST API routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveTime};
use saferoute_core::lighting::{MAX_LIGHTING_SCORE, MIN_LIGHTING_SCORE};
use saferoute_core::profiles::{parse_date, parse_time_of_day};
use saferoute_core::{
    find_profile, profile_catalog, rank_with_reasons, DrivingProfile, EnrichedRoute, GeoPoint,
    RankedRoute,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/profiles", get(list_profiles))
        .route("/v1/routes/search", post(search_routes))
        .route("/v1/routes/rank", post(rank_routes))
        .route("/v1/cache/lighting/clear", post(clear_lighting_cache))
}

fn default_profile() -> String {
    saferoute_core::profiles::FAST_PROFILE_ID.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    #[serde(default)]
    pub origin_name: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default = "default_profile")]
    pub profile: String,
    /// `YYYY-MM-DD`; enables hourly forecasts together with `time`.
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM`; defaults to the server's local clock.
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    pub routes: Vec<EnrichedRoute>,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteListResponse {
    pub profile: String,
    /// Time of day the ranking was computed for, `HH:MM`.
    pub time_used: String,
    pub routes: Vec<RankedRoute>,
}

async fn list_profiles() -> Json<Vec<DrivingProfile>> {
    Json(profile_catalog())
}

fn parse_time(time: Option<&str>) -> Result<Option<NaiveTime>, ApiError> {
    Ok(time.map(parse_time_of_day).transpose()?)
}

/// Requested time, or the local clock when none was sent.
fn resolve_time(time: Option<&str>) -> Result<NaiveTime, ApiError> {
    Ok(parse_time(time)?.unwrap_or_else(|| Local::now().time()))
}

/// Scores must sit in the ranges enrichment produces.
fn validate_scores(routes: &[EnrichedRoute]) -> Result<(), ApiError> {
    for route in routes {
        if route.activity_score > 10 {
            return Err(ApiError::BadRequest(format!(
                "route {}: activity_score {} outside 0..=10",
                route.id, route.activity_score
            )));
        }
        if !(MIN_LIGHTING_SCORE..=MAX_LIGHTING_SCORE).contains(&route.lighting_score) {
            return Err(ApiError::BadRequest(format!(
                "route {}: lighting_score {} outside 2..=10",
                route.id, route.lighting_score
            )));
        }
    }
    Ok(())
}

fn validate_point(label: &str, point: GeoPoint) -> Result<(), ApiError> {
    let in_range = point.is_finite()
        && (-90.0..=90.0).contains(&point.lat)
        && (-180.0..=180.0).contains(&point.lng);
    if in_range {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{label} coordinates out of range"
        )))
    }
}

async fn search_routes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<RouteListResponse>, ApiError> {
    validate_point("origin", req.origin)?;
    validate_point("destination", req.destination)?;
    let profile = find_profile(&req.profile)?;
    let date = req.date.as_deref().map(parse_date).transpose()?;
    let requested_time = parse_time(req.time.as_deref())?;
    let time = requested_time.unwrap_or_else(|| Local::now().time());

    let raw_routes = state
        .directions
        .alternatives(
            req.origin,
            req.destination,
            req.origin_name.as_deref(),
            req.destination_name.as_deref(),
        )
        .await?;
    tracing::info!(
        "directions returned {} alternative(s) for profile {}",
        raw_routes.len(),
        profile.id
    );

    let enriched = state
        .pipeline
        .enrich_all(&raw_routes, req.origin, req.destination, date, requested_time)
        .await;

    Ok(Json(RouteListResponse {
        profile: profile.id.clone(),
        time_used: time.format("%H:%M").to_string(),
        routes: rank_with_reasons(&enriched, &profile, Some(time)),
    }))
}

async fn rank_routes(Json(req): Json<RankRequest>) -> Result<Json<RouteListResponse>, ApiError> {
    let profile = find_profile(&req.profile)?;
    validate_scores(&req.routes)?;
    let time = resolve_time(req.time.as_deref())?;

    Ok(Json(RouteListResponse {
        profile: profile.id.clone(),
        time_used: time.format("%H:%M").to_string(),
        routes: rank_with_reasons(&req.routes, &profile, Some(time)),
    }))
}

async fn clear_lighting_cache(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let cleared = state.pipeline.lighting_cache().clear();
    tracing::info!("cleared {} lighting cache entries", cleared);
    Json(json!({ "cleared": cleared }))
}
