//! Pipeline orchestration
//!
//! This module provides the public API for psifold.
//! It runs one dashboard build from series construction to the HTML file.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::chart::ChartRenderer;
use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::feeds::{FeedClient, HttpFeedClient, OfflineClient};
use crate::series::SeriesBuilder;
use crate::types::{DashboardMode, RunReport};

/// Build the dashboard for `mode` with the wall clock and live HTTP feeds.
///
/// # Returns
/// Report describing the run, including the path written
///
/// # Example
/// ```ignore
/// let report = build_dashboard(DashboardMode::Synthetic)?;
/// println!("Dashboard built: {}", report.output_path.display());
/// ```
pub fn build_dashboard(mode: DashboardMode) -> Result<RunReport, DashboardError> {
    let config = DashboardConfig::default();
    let client: Box<dyn FeedClient> = match HttpFeedClient::new(config.request_timeout) {
        Ok(client) => Box::new(client),
        Err(e) => {
            warn!("HTTP client unavailable, live feeds will fall back: {}", e);
            Box::new(OfflineClient)
        }
    };
    DashboardRunner::new(config).run(mode, &SystemClock, client.as_ref())
}

/// Runs the full pipeline.
///
/// Pipeline stages:
/// 1. SeriesBuilder - Synthetic ramp or live feeds (with fallbacks)
/// 2. Stress transform - Applied per sample as the series is built
/// 3. ChartRenderer - Compose figure and write HTML
pub struct DashboardRunner {
    config: DashboardConfig,
    renderer: ChartRenderer,
}

impl Default for DashboardRunner {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl DashboardRunner {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            renderer: ChartRenderer::new(),
        }
    }

    /// Fixed output location for `mode`
    pub fn output_path(&self, mode: DashboardMode) -> &Path {
        match mode {
            DashboardMode::Synthetic => &self.config.synthetic_output,
            DashboardMode::Live => &self.config.live_output,
        }
    }

    pub fn run(
        &self,
        mode: DashboardMode,
        clock: &dyn Clock,
        client: &dyn FeedClient,
    ) -> Result<RunReport, DashboardError> {
        // Stage 1-2: Build series (stress derived per sample)
        let data = SeriesBuilder::new(&self.config, clock, client).build(mode);

        let alert = data.alert();
        if alert && mode == DashboardMode::Live {
            warn!(
                min_stress = data.series.min_stress(),
                "ZFCM threshold breached"
            );
        }

        // Stage 3: Render and write
        let figure = self.renderer.compose(&data, clock.now());
        let output_path: PathBuf = self.output_path(mode).to_path_buf();
        self.renderer.write_html(&figure, &output_path)?;

        let report = RunReport {
            mode,
            samples: data.series.len(),
            events: data.events.len(),
            min_stress: data.series.min_stress(),
            alert,
            used_stub: data.used_stub,
            output_path,
        };

        info!(mode = mode.as_str(), alert = report.alert, "Dashboard complete");
        Ok(report)
    }
}
