//! Profile-weighted ranking of enriched routes.
//!
//! `fast` and `scenic` order purely by ETA. `safe` combines activity and
//! lighting, but ignores lighting during the day. Any other profile id is
//! ranked by a weighted composite score.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::EnrichedRoute;
use crate::profiles::{
    is_daytime, DrivingProfile, ProfileWeights, FAST_PROFILE_ID, SAFE_PROFILE_ID,
    SCENIC_PROFILE_ID,
};

/// ETA ceiling, in minutes, of the weighted composite score.
const WEIGHTED_ETA_CEILING_MIN: f64 = 200.0;
const WEIGHTED_SCORE_SCALE: f64 = 10.0;
const DAY_LIGHTING_FACTOR: f64 = 0.5;
const NIGHT_LIGHTING_FACTOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    ShortestEta,
    LongestEta,
    Safety { daytime: bool },
    Weighted { daytime: bool },
}

impl Strategy {
    fn for_profile(profile: &DrivingProfile, time: Option<NaiveTime>) -> Self {
        let daytime = is_daytime(time);
        match profile.id.as_str() {
            FAST_PROFILE_ID => Self::ShortestEta,
            SCENIC_PROFILE_ID => Self::LongestEta,
            SAFE_PROFILE_ID => Self::Safety { daytime },
            _ => Self::Weighted { daytime },
        }
    }
}

/// A route with its position and the reason it landed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRoute {
    /// 1-based.
    pub rank: usize,
    pub reason: String,
    pub route: EnrichedRoute,
}

/// Activity plus (night-only) lighting, each multiplied by its weight.
pub fn safety_score(route: &EnrichedRoute, weights: &ProfileWeights, daytime: bool) -> u32 {
    let lighting_weight = if daytime { 0 } else { weights.lighting };
    u32::from(route.activity_score) * weights.activity
        + u32::from(route.lighting_score) * lighting_weight
}

/// Composite score for profiles outside the built-in catalog.
pub fn weighted_score(route: &EnrichedRoute, weights: &ProfileWeights, daytime: bool) -> f64 {
    let day_night_factor = if daytime {
        DAY_LIGHTING_FACTOR
    } else {
        NIGHT_LIGHTING_FACTOR
    };
    (WEIGHTED_ETA_CEILING_MIN - route.eta_minutes) * f64::from(weights.eta)
        + f64::from(route.activity_score) * WEIGHTED_SCORE_SCALE * f64::from(weights.activity)
        + f64::from(route.lighting_score)
            * WEIGHTED_SCORE_SCALE
            * f64::from(weights.lighting)
            * day_night_factor
}

/// NaN scores sort below every real score.
fn sortable(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Order routes for `profile`. The sort is stable, so exact ties keep
/// their input order.
pub fn rank_routes(
    routes: &[EnrichedRoute],
    profile: &DrivingProfile,
    time: Option<NaiveTime>,
) -> Vec<EnrichedRoute> {
    let mut ranked = routes.to_vec();
    match Strategy::for_profile(profile, time) {
        Strategy::ShortestEta => {
            ranked.sort_by(|a, b| a.eta_minutes.total_cmp(&b.eta_minutes));
        }
        Strategy::LongestEta => {
            ranked.sort_by(|a, b| b.eta_minutes.total_cmp(&a.eta_minutes));
        }
        Strategy::Safety { daytime } => {
            ranked.sort_by(|a, b| {
                let score_a = safety_score(a, &profile.weights, daytime);
                let score_b = safety_score(b, &profile.weights, daytime);
                score_b
                    .cmp(&score_a)
                    .then_with(|| a.eta_minutes.total_cmp(&b.eta_minutes))
            });
        }
        Strategy::Weighted { daytime } => {
            ranked.sort_by(|a, b| {
                let score_a = sortable(weighted_score(a, &profile.weights, daytime));
                let score_b = sortable(weighted_score(b, &profile.weights, daytime));
                score_b.total_cmp(&score_a)
            });
        }
    }
    ranked
}

/// One-line justification consistent with the ranking branch used.
pub fn explain_route(
    route: &EnrichedRoute,
    profile: &DrivingProfile,
    time: Option<NaiveTime>,
) -> String {
    match Strategy::for_profile(profile, time) {
        Strategy::ShortestEta => format!(
            "Quickest option: about {:.0} min for {:.1} km.",
            route.eta_minutes, route.distance_km
        ),
        Strategy::LongestEta => format!(
            "Unhurried {} drive: {:.0} min over {:.1} km.",
            route.road_type.label().to_lowercase(),
            route.eta_minutes,
            route.distance_km
        ),
        Strategy::Safety { daytime: true } => format!(
            "Daytime, so ranked on road activity alone: activity {}/10, {:.0} min.",
            route.activity_score, route.eta_minutes
        ),
        Strategy::Safety { daytime: false } => format!(
            "Night-time safety total {}: activity {}/10 and lighting {}/10.",
            safety_score(route, &profile.weights, false),
            route.activity_score,
            route.lighting_score
        ),
        Strategy::Weighted { daytime } => format!(
            "{} score {:.0}: {:.0} min, activity {}/10, lighting {}/10{}.",
            profile.name,
            weighted_score(route, &profile.weights, daytime),
            route.eta_minutes,
            route.activity_score,
            route.lighting_score,
            if daytime { " (daylight halves lighting)" } else { "" }
        ),
    }
}

/// Rank and explain in one pass.
pub fn rank_with_reasons(
    routes: &[EnrichedRoute],
    profile: &DrivingProfile,
    time: Option<NaiveTime>,
) -> Vec<RankedRoute> {
    rank_routes(routes, profile, time)
        .into_iter()
        .enumerate()
        .map(|(idx, route)| RankedRoute {
            rank: idx + 1,
            reason: explain_route(&route, profile, time),
            route,
        })
        .collect()
}
