//! Series builder
//!
//! One entry point for both modes. Synthetic mode needs only a clock; live
//! mode additionally reads the two feeds through a [`FeedClient`].

use tracing::info;

use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::feeds::{FeedClient, SeismicFeed, SolarWindFeed};
use crate::synthetic::SyntheticBuilder;
use crate::types::{DashboardData, DashboardMode};

/// Builds the drift series (and event markers in live mode) for one run
pub struct SeriesBuilder<'a> {
    config: &'a DashboardConfig,
    clock: &'a dyn Clock,
    client: &'a dyn FeedClient,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(
        config: &'a DashboardConfig,
        clock: &'a dyn Clock,
        client: &'a dyn FeedClient,
    ) -> Self {
        Self {
            config,
            clock,
            client,
        }
    }

    pub fn build(&self, mode: DashboardMode) -> DashboardData {
        let data = match mode {
            DashboardMode::Synthetic => self.build_synthetic(),
            DashboardMode::Live => self.build_live(),
        };

        info!(
            mode = mode.as_str(),
            samples = data.series.len(),
            events = data.events.len(),
            used_stub = data.used_stub,
            "Series built"
        );

        data
    }

    fn build_synthetic(&self) -> DashboardData {
        let series = SyntheticBuilder::new(self.config.synthetic_samples).build(self.clock);
        DashboardData {
            mode: DashboardMode::Synthetic,
            series,
            events: Vec::new(),
            used_stub: false,
        }
    }

    fn build_live(&self) -> DashboardData {
        let (series, used_stub) =
            SolarWindFeed::new(self.client, self.config.solar_wind_url.as_str()).fetch();

        let events = SeismicFeed::new(
            self.client,
            self.config.seismic_base_url.as_str(),
            self.config.seismic_query.clone(),
        )
        .fetch(self.clock.now());

        DashboardData {
            mode: DashboardMode::Live,
            series,
            events,
            used_stub,
        }
    }
}
