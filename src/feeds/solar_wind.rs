//! Solar-wind speed feed
//!
//! Parses a JSON array of `{ "time_tag": ..., "speed": ... }` records and maps
//! each speed `s` (km/s) to drift `0.5 - s / 2000`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::FeedClient;
use crate::error::DashboardError;
use crate::types::Series;

/// Speed assumed when a record omits it
const DEFAULT_SPEED: f64 = 400.0;

/// Speeds of the embedded fallback series
pub const STUB_SPEEDS: [f64; 3] = [400.0, 520.0, 700.0];

/// Hours between consecutive stub points
const STUB_SPACING_HOURS: i64 = 6;

#[derive(Debug, Deserialize)]
struct SolarWindRecord {
    time_tag: String,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    proton_speed: Option<f64>,
}

impl SolarWindRecord {
    /// `speed` wins over `proton_speed` when a record carries both
    fn speed(&self) -> f64 {
        self.speed.or(self.proton_speed).unwrap_or(DEFAULT_SPEED)
    }
}

/// Map solar-wind speed to drift
pub fn speed_to_drift(speed: f64) -> f64 {
    0.5 - speed / 2000.0
}

/// Parse a feed body into a drift series.
///
/// Records whose `time_tag` cannot be read are skipped. A body that is not a
/// JSON array of records is an error.
pub fn parse_solar_wind(body: &str) -> Result<Series, DashboardError> {
    let records: Vec<SolarWindRecord> = serde_json::from_str(body)?;

    let points = records.into_iter().filter_map(|record| {
        match parse_time_tag(&record.time_tag) {
            Some(timestamp) => {
                Some((timestamp, speed_to_drift(record.speed())))
            }
            None => {
                debug!("Skipping solar-wind record with bad time_tag: {}", record.time_tag);
                None
            }
        }
    });

    Ok(Series::from_drift(points))
}

/// Fallback series used when the feed is unavailable
pub fn stub_series() -> Series {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single();
    let Some(start) = start else {
        return Series::default();
    };

    Series::from_drift(STUB_SPEEDS.iter().enumerate().map(|(i, &speed)| {
        let timestamp = start + chrono::Duration::hours(i as i64 * STUB_SPACING_HOURS);
        (timestamp, speed_to_drift(speed))
    }))
}

/// ISO-8601 with an offset, or a naive timestamp taken as UTC
fn parse_time_tag(tag: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(tag) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(tag, format).ok())
        .map(|naive| naive.and_utc())
}

/// Drift feed backed by solar-wind speed
pub struct SolarWindFeed<'a> {
    client: &'a dyn FeedClient,
    url: String,
}

impl<'a> SolarWindFeed<'a> {
    pub fn new(client: &'a dyn FeedClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch and parse without fallback
    pub fn try_fetch(&self) -> Result<Series, DashboardError> {
        let body = self.client.get_text(&self.url)?;
        let series = parse_solar_wind(&body)?;
        if series.is_empty() {
            return Err(DashboardError::Parse("solar-wind feed had no usable records".to_string()));
        }
        Ok(series)
    }

    /// Fetch the drift series, substituting the stub on any failure.
    ///
    /// The flag is true when the stub was used.
    pub fn fetch(&self) -> (Series, bool) {
        match self.try_fetch() {
            Ok(series) => (series, false),
            Err(e) => {
                warn!("Solar-wind feed unavailable, using stub series: {}", e);
                (stub_series(), true)
            }
        }
    }
}
