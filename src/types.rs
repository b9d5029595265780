//! Core types for the psifold dashboard
//!
//! This module defines the data that flows from the series builder to the
//! chart renderer: drift samples with their derived stress, seismic event
//! markers, and the per-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::stress;

/// Where the drift series comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardMode {
    /// Deterministic sine-modulated ramp, no network
    #[default]
    Synthetic,
    /// Solar-wind and seismic feeds with fallbacks
    Live,
}

impl DashboardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardMode::Synthetic => "synthetic",
            DashboardMode::Live => "live",
        }
    }
}

/// One point of the drift series.
///
/// Stress is derived from drift at construction and cannot be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    timestamp: DateTime<Utc>,
    drift: f64,
    stress: f64,
}

impl Sample {
    /// Build a sample, deriving stress with the default transform constants
    pub fn new(timestamp: DateTime<Utc>, drift: f64) -> Self {
        Self {
            timestamp,
            drift,
            stress: stress::stress(drift),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn stress(&self) -> f64 {
        self.stress
    }
}

/// Drift samples in timestamp order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Wrap samples, sorting them by timestamp (stable, duplicates kept)
    pub fn new(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    /// Build from (timestamp, drift) pairs, deriving stress per element
    pub fn from_drift<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(
            points
                .into_iter()
                .map(|(timestamp, drift)| Sample::new(timestamp, drift))
                .collect(),
        )
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn drifts(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.drift).collect()
    }

    pub fn stresses(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.stress).collect()
    }

    /// Lowest stress in the series, `None` when empty
    pub fn min_stress(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.stress).reduce(f64::min)
    }
}

/// A seismic event plotted alongside the drift series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    pub timestamp: DateTime<Utc>,
    /// Event magnitude (always positive)
    pub magnitude: f64,
}

impl EventMarker {
    /// Marker size on the chart
    pub fn marker_size(&self) -> f64 {
        (self.magnitude * 4.0).max(5.0)
    }

    /// "M" followed by the magnitude, keeping a trailing ".0" on whole values
    pub fn label(&self) -> String {
        format!("M{:?}", self.magnitude)
    }
}

/// Everything the renderer needs for one figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub mode: DashboardMode,
    pub series: Series,
    /// Empty in synthetic mode
    pub events: Vec<EventMarker>,
    /// Set when the drift feed fell back to the embedded stub
    pub used_stub: bool,
}

impl DashboardData {
    pub fn alert(&self) -> bool {
        stress::alert_condition(&self.series)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: DashboardMode,
    pub samples: usize,
    pub events: usize,
    pub min_stress: Option<f64>,
    pub alert: bool,
    pub used_stub: bool,
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn test_sample_derives_stress() {
        let sample = Sample::new(t(0), 0.3);
        assert_eq!(sample.stress(), stress::stress(0.3));
        assert_eq!(sample.drift(), 0.3);
    }

    #[test]
    fn test_series_sorted_by_timestamp() {
        let series = Series::from_drift(vec![(t(2), 0.4), (t(0), 0.3), (t(1), 0.35)]);
        assert_eq!(series.timestamps(), vec![t(0), t(1), t(2)]);
        assert_eq!(series.drifts(), vec![0.3, 0.35, 0.4]);
    }

    #[test]
    fn test_series_min_stress() {
        let series = Series::from_drift(vec![(t(0), 0.5), (t(1), 0.3), (t(2), 0.45)]);
        assert_eq!(series.min_stress(), Some(stress::stress(0.3)));
        assert_eq!(Series::default().min_stress(), None);
    }

    #[test]
    fn test_event_marker_size_and_label() {
        let small = EventMarker { timestamp: t(0), magnitude: 1.0 };
        let large = EventMarker { timestamp: t(0), magnitude: 2.5 };
        assert_eq!(small.marker_size(), 5.0);
        assert_eq!(large.marker_size(), 10.0);
        assert_eq!(large.label(), "M2.5");
        assert_eq!(EventMarker { timestamp: t(0), magnitude: 3.0 }.label(), "M3.0");
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&DashboardMode::Live).unwrap(), "\"live\"");
        assert_eq!(DashboardMode::default(), DashboardMode::Synthetic);
        assert_eq!(DashboardMode::Synthetic.as_str(), "synthetic");
    }
}
