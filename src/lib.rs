//! psifold - ψ-Fold drift/stress dashboard
//!
//! psifold turns a drift series into a stress series through a fixed
//! exponential-well transform, checks the ZFCM threshold, and renders an
//! interactive HTML chart: series construction → stress transform → alert
//! decision → chart rendering.
//!
//! ## Modes
//!
//! - **Synthetic**: deterministic sine-modulated ramp, no network
//! - **Live**: solar-wind speed as drift plus seismic event markers, with
//!   fallbacks when the feeds are unavailable

pub mod chart;
pub mod clock;
pub mod config;
pub mod error;
pub mod feeds;
pub mod pipeline;
pub mod series;
pub mod stress;
pub mod synthetic;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DashboardError;
pub use pipeline::{build_dashboard, DashboardRunner};
pub use stress::{alert_condition, stress, StressParams, ZFCM_THRESHOLD};
pub use types::{DashboardData, DashboardMode, EventMarker, RunReport, Sample, Series};

/// psifold version
pub const PSIFOLD_VERSION: &str = env!("CARGO_PKG_VERSION");
