//! Fixed run configuration
//!
//! The dashboard has no user-facing knobs beyond the mode. All constants live
//! here so the builder, feeds and renderer read them from one place.

use std::path::PathBuf;
use std::time::Duration;

/// Output path for synthetic mode
pub const SYNTHETIC_OUTPUT_PATH: &str = "index.html";

/// Output path for live mode
pub const LIVE_OUTPUT_PATH: &str = "data/psifold_live.html";

/// Number of synthetic samples
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 50;

/// Per-request timeout for feed fetches
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Solar-wind speed feed
pub const SOLAR_WIND_URL: &str =
    "https://services.swpc.noaa.gov/products/summary/solar-wind-speed.json";

/// USGS FDSN event service (GeoJSON)
pub const SEISMIC_BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Geographic filter for the seismic catalog query
#[derive(Debug, Clone, PartialEq)]
pub struct SeismicQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max_radius_km: f64,
    pub min_magnitude: f64,
    /// Trailing window ending at "now"
    pub lookback_days: i64,
}

impl Default for SeismicQuery {
    fn default() -> Self {
        Self {
            latitude: 40.82,
            longitude: 14.13,
            max_radius_km: 50.0,
            min_magnitude: 1.0,
            lookback_days: 7,
        }
    }
}

/// All fixed settings for one dashboard run
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub synthetic_output: PathBuf,
    pub live_output: PathBuf,
    pub synthetic_samples: usize,
    pub request_timeout: Duration,
    pub solar_wind_url: String,
    pub seismic_base_url: String,
    pub seismic_query: SeismicQuery,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            synthetic_output: PathBuf::from(SYNTHETIC_OUTPUT_PATH),
            live_output: PathBuf::from(LIVE_OUTPUT_PATH),
            synthetic_samples: DEFAULT_SYNTHETIC_SAMPLES,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            solar_wind_url: SOLAR_WIND_URL.to_string(),
            seismic_base_url: SEISMIC_BASE_URL.to_string(),
            seismic_query: SeismicQuery::default(),
        }
    }
}
