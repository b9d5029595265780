//! Synthetic drift series
//!
//! A linear ramp from 0.30 to 0.35 with a 0.02-amplitude sine perturbation
//! whose argument runs over [0, 6] radians, sampled once per minute from the
//! start instant.

use chrono::{DateTime, Duration, Utc};

use crate::clock::{truncate_to_seconds, Clock};
use crate::types::Series;

const RAMP_START: f64 = 0.30;
const RAMP_END: f64 = 0.35;
const PERTURBATION_AMPLITUDE: f64 = 0.02;
const SINE_ARGUMENT_END: f64 = 6.0;
const SAMPLE_SPACING_MINUTES: i64 = 1;

/// Builder for the deterministic demo series
#[derive(Debug, Clone, Copy)]
pub struct SyntheticBuilder {
    samples: usize,
}

impl SyntheticBuilder {
    pub fn new(samples: usize) -> Self {
        Self { samples }
    }

    /// Series starting at `clock.now()`, truncated to whole seconds
    pub fn build(&self, clock: &dyn Clock) -> Series {
        self.build_from(truncate_to_seconds(clock.now()))
    }

    pub fn build_from(&self, start: DateTime<Utc>) -> Series {
        let ramp = linspace(RAMP_START, RAMP_END, self.samples);
        let phase = linspace(0.0, SINE_ARGUMENT_END, self.samples);

        Series::from_drift(ramp.into_iter().zip(phase).enumerate().map(
            |(i, (base, angle))| {
                let timestamp = start + Duration::minutes(i as i64 * SAMPLE_SPACING_MINUTES);
                (timestamp, base + PERTURBATION_AMPLITUDE * angle.sin())
            },
        ))
    }
}

/// `n` evenly spaced values from `start` to `end`, both endpoints included.
/// A single point yields `start`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::stress;
    use chrono::{TimeZone, Timelike};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 15).unwrap() + Duration::milliseconds(640)
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 0.35, 1), vec![0.3]);
        assert_eq!(linspace(0.0, 6.0, 4), vec![0.0, 2.0, 4.0, 6.0]);

        let values = linspace(0.3, 0.35, 50);
        assert_eq!(values.len(), 50);
        assert_eq!(values[0], 0.3);
        assert_eq!(values[49], 0.35);
    }

    #[test]
    fn test_fifty_samples_one_minute_apart() {
        let series = SyntheticBuilder::new(50).build(&FixedClock(start()));
        assert_eq!(series.len(), 50);

        let timestamps = series.timestamps();
        assert_eq!(timestamps[0].nanosecond(), 0);
        assert_eq!(timestamps[0], Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 15).unwrap());
        for pair in timestamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::minutes(1));
        }
    }

    #[test]
    fn test_drift_bounds() {
        let series = SyntheticBuilder::new(50).build(&FixedClock(start()));
        for drift in series.drifts() {
            assert!((0.28..=0.37).contains(&drift), "drift {drift} out of range");
        }
    }

    #[test]
    fn test_drift_shape() {
        let series = SyntheticBuilder::new(50).build_from(start());
        let drifts = series.drifts();

        // sin(0) = 0 at the first point; sin(6) at the last
        assert!((drifts[0] - 0.30).abs() < 1e-12);
        assert!((drifts[49] - (0.35 + 0.02 * 6.0_f64.sin())).abs() < 1e-12);
    }

    #[test]
    fn test_stress_derived_per_point() {
        let series = SyntheticBuilder::new(50).build_from(start());
        for sample in series.samples() {
            assert_eq!(sample.stress(), stress::stress(sample.drift()));
        }
        // Drift stays well inside the well, so no breach
        assert!(!stress::alert_condition(&series));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(SyntheticBuilder::new(0).build_from(start()).is_empty());

        let single = SyntheticBuilder::new(1).build_from(start());
        assert_eq!(single.len(), 1);
        assert_eq!(single.drifts(), vec![0.3]);
    }
}
