//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::directions::{DirectionsProvider, OsrmDirections};
use crate::pipeline::EnrichmentPipeline;

/// Handles shared by every request. The lighting cache lives inside the
/// pipeline and is dropped with it.
pub struct AppState {
    pub config: Config,
    pub directions: Arc<dyn DirectionsProvider>,
    pub pipeline: EnrichmentPipeline,
}

impl AppState {
    pub fn new(
        config: Config,
        directions: Arc<dyn DirectionsProvider>,
        pipeline: EnrichmentPipeline,
    ) -> Self {
        Self {
            config,
            directions,
            pipeline,
        }
    }

    /// Production wiring: OSRM directions plus live enrichment services.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        let directions = OsrmDirections::new(
            client.clone(),
            config.directions_url.clone(),
            config.request_timeout(),
            config.directions_alternatives,
        );
        let pipeline = EnrichmentPipeline::with_client(client, &config);
        Ok(Self::new(config, Arc::new(directions), pipeline))
    }
}
