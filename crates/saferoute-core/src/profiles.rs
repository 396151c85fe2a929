//! Driving profiles and day/night thresholds.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// First hour (inclusive) counted as daytime.
pub const DAY_START_HOUR: u32 = 6;
/// First hour (inclusive) counted as night again.
pub const DAY_END_HOUR: u32 = 19;

pub const FAST_PROFILE_ID: &str = "fast";
pub const SAFE_PROFILE_ID: &str = "safe";
pub const SCENIC_PROFILE_ID: &str = "scenic";

/// Per-criterion multipliers used by the ranking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileWeights {
    pub eta: u32,
    pub activity: u32,
    pub lighting: u32,
}

/// A named weighting scheme over ETA, activity and lighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub weights: ProfileWeights,
}

impl DrivingProfile {
    pub fn fast() -> Self {
        Self {
            id: FAST_PROFILE_ID.to_string(),
            name: "Fastest".to_string(),
            description: "Shortest travel time first".to_string(),
            weights: ProfileWeights {
                eta: 3,
                activity: 1,
                lighting: 1,
            },
        }
    }

    pub fn safe() -> Self {
        Self {
            id: SAFE_PROFILE_ID.to_string(),
            name: "Safest".to_string(),
            description: "Busy, well-lit roads; lighting only counts after dark".to_string(),
            weights: ProfileWeights {
                eta: 1,
                activity: 2,
                lighting: 3,
            },
        }
    }

    pub fn scenic() -> Self {
        Self {
            id: SCENIC_PROFILE_ID.to_string(),
            name: "Scenic".to_string(),
            description: "Longer, more relaxed drives first".to_string(),
            weights: ProfileWeights {
                eta: 0,
                activity: 3,
                lighting: 1,
            },
        }
    }
}

/// The fixed, read-only profile catalog.
pub fn profile_catalog() -> Vec<DrivingProfile> {
    vec![
        DrivingProfile::fast(),
        DrivingProfile::safe(),
        DrivingProfile::scenic(),
    ]
}

pub fn find_profile(id: &str) -> Result<DrivingProfile, CoreError> {
    let id = id.trim();
    profile_catalog()
        .into_iter()
        .find(|profile| profile.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| CoreError::UnknownProfile(id.to_string()))
}

/// Whether `time` falls in `[DAY_START_HOUR, DAY_END_HOUR)`.
///
/// An unknown time counts as night so lighting is never ignored by default.
pub fn is_daytime(time: Option<NaiveTime>) -> bool {
    time.is_some_and(|t| (DAY_START_HOUR..DAY_END_HOUR).contains(&t.hour()))
}

/// Parse `HH:MM` (seconds optional).
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| CoreError::InvalidTime(value.to_string()))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}
