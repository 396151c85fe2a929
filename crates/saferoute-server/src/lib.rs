//! Route enrichment and ranking service: lighting, weather and profile-based
//! ordering layered over directions alternatives.

pub mod api;
pub mod backoff;
pub mod cache;
pub mod config;
pub mod directions;
pub mod error;
pub mod lighting;
pub mod overpass;
pub mod pipeline;
pub mod places;
pub mod state;
pub mod weather;
