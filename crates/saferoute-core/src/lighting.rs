//! Lighting heuristics for road segments.
//!
//! An explicit `lit` attribute on a segment always wins. Segments without
//! one fall back to a road-class table.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_LIGHTING_SCORE: u8 = 2;
pub const MAX_LIGHTING_SCORE: u8 = 10;
/// Returned when the road-attribute lookup failed. Never cached.
pub const DEFAULT_LIGHTING_SCORE: u8 = 5;
/// Returned (and cached) when the lookup succeeded but found no roads.
pub const NO_DATA_LIGHTING_SCORE: u8 = 3;

/// Value of a segment's lighting attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitAttribute {
    /// Lit all night.
    Continuous,
    /// Lit part of the night, on a timer or sensor.
    Scheduled,
    /// Lit from dusk to dawn.
    DuskToDawn,
    Unlit,
    /// Attribute missing or unrecognised.
    Unknown,
}

impl LitAttribute {
    pub fn from_tag(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Unknown;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "24/7" => Self::Continuous,
            "limited" | "interval" | "automatic" => Self::Scheduled,
            "sunset-sunrise" | "dusk-dawn" => Self::DuskToDawn,
            "no" | "disused" => Self::Unlit,
            _ => Self::Unknown,
        }
    }

    /// Score implied by the attribute, or `None` when the road class decides.
    pub fn score(self) -> Option<u8> {
        match self {
            Self::Continuous => Some(10),
            Self::DuskToDawn => Some(7),
            Self::Scheduled => Some(6),
            Self::Unlit => Some(2),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Pedestrian,
    Service,
    Track,
    Other,
}

impl RoadClass {
    pub fn from_tag(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Other;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "motorway" | "motorway_link" => Self::Motorway,
            "trunk" | "trunk_link" => Self::Trunk,
            "primary" | "primary_link" => Self::Primary,
            "secondary" | "secondary_link" => Self::Secondary,
            "tertiary" | "tertiary_link" => Self::Tertiary,
            "residential" | "living_street" => Self::Residential,
            "pedestrian" => Self::Pedestrian,
            "service" => Self::Service,
            "track" => Self::Track,
            _ => Self::Other,
        }
    }

    pub fn score(self) -> u8 {
        match self {
            Self::Motorway | Self::Trunk | Self::Primary => 9,
            Self::Secondary => 8,
            Self::Tertiary => 7,
            Self::Residential | Self::Pedestrian => 6,
            Self::Service | Self::Track => 3,
            Self::Other => 5,
        }
    }
}

/// A road returned by the road-attribute service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// External identifier; one road can match several sample queries.
    pub id: i64,
    pub lit: LitAttribute,
    pub class: RoadClass,
}

impl RoadSegment {
    pub fn from_tags(id: i64, lit: Option<&str>, highway: Option<&str>) -> Self {
        Self {
            id,
            lit: LitAttribute::from_tag(lit),
            class: RoadClass::from_tag(highway),
        }
    }

    pub fn score(&self) -> u8 {
        self.lit.score().unwrap_or_else(|| self.class.score())
    }
}

pub fn clamp_lighting_score(score: f64) -> u8 {
    if !score.is_finite() {
        return DEFAULT_LIGHTING_SCORE;
    }
    score
        .round()
        .clamp(f64::from(MIN_LIGHTING_SCORE), f64::from(MAX_LIGHTING_SCORE)) as u8
}

/// Mean score over unique segments, or `None` when there are no segments.
pub fn score_segments(segments: &[RoadSegment]) -> Option<u8> {
    let mut seen = HashSet::new();
    let scores: Vec<f64> = segments
        .iter()
        .filter(|segment| seen.insert(segment.id))
        .map(|segment| f64::from(segment.score()))
        .collect();

    if scores.is_empty() {
        return None;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(clamp_lighting_score(mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_attribute_beats_road_class() {
        let unlit_motorway = RoadSegment::from_tags(1, Some("no"), Some("motorway"));
        assert_eq!(unlit_motorway.score(), 2);

        let lit_track = RoadSegment::from_tags(2, Some("yes"), Some("track"));
        assert_eq!(lit_track.score(), 10);

        let timed = RoadSegment::from_tags(3, Some("interval"), Some("residential"));
        assert_eq!(timed.score(), 6);

        let dusk = RoadSegment::from_tags(4, Some("sunset-sunrise"), None);
        assert_eq!(dusk.score(), 7);
    }

    #[test]
    fn road_class_table_is_total() {
        let cases = [
            ("motorway", 9),
            ("trunk_link", 9),
            ("primary", 9),
            ("secondary", 8),
            ("tertiary", 7),
            ("residential", 6),
            ("pedestrian", 6),
            ("service", 3),
            ("track", 3),
            ("cycleway", 5),
        ];
        for (highway, expected) in cases {
            let segment = RoadSegment::from_tags(1, None, Some(highway));
            assert_eq!(segment.score(), expected, "highway={highway}");
        }
        assert_eq!(RoadSegment::from_tags(1, None, None).score(), 5);
    }

    #[test]
    fn unrecognised_lit_value_falls_back_to_class() {
        let segment = RoadSegment::from_tags(1, Some("maybe"), Some("secondary"));
        assert_eq!(segment.lit, LitAttribute::Unknown);
        assert_eq!(segment.score(), 8);
    }

    #[test]
    fn duplicate_segments_count_once() {
        let segments = vec![
            RoadSegment::from_tags(7, Some("yes"), None),
            RoadSegment::from_tags(7, Some("yes"), None),
            RoadSegment::from_tags(7, Some("yes"), None),
            RoadSegment::from_tags(8, Some("no"), None),
        ];
        // (10 + 2) / 2 = 6, not (10 * 3 + 2) / 4 = 8
        assert_eq!(score_segments(&segments), Some(6));
    }

    #[test]
    fn empty_segments_have_no_score() {
        assert_eq!(score_segments(&[]), None);
    }

    #[test]
    fn score_is_rounded_and_clamped() {
        assert_eq!(clamp_lighting_score(6.5), 7);
        assert_eq!(clamp_lighting_score(0.4), MIN_LIGHTING_SCORE);
        assert_eq!(clamp_lighting_score(42.0), MAX_LIGHTING_SCORE);
        assert_eq!(clamp_lighting_score(f64::NAN), DEFAULT_LIGHTING_SCORE);
    }
}
