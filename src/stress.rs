//! Stress transform and ZFCM alert
//!
//! Drift φ maps to stress through an exponential well centred on 0.5:
//!
//! ```text
//! stress(φ) = -C * (1 - exp(-D * (φ - 0.5)^2))
//! ```
//!
//! Stress is 0 at the centre and approaches -C as φ moves away from it.

use serde::{Deserialize, Serialize};

use crate::types::Series;

/// Stress value at or below which the alert fires
pub const ZFCM_THRESHOLD: f64 = -1.0;

/// Centre of the well
const DRIFT_CENTER: f64 = 0.5;

/// Transform constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressParams {
    /// Well depth (asymptote is -c)
    pub c: f64,
    /// Well sharpness
    pub d: f64,
}

impl Default for StressParams {
    fn default() -> Self {
        Self { c: 1.0, d: 100.0 }
    }
}

impl StressParams {
    pub fn stress(&self, drift: f64) -> f64 {
        let offset = drift - DRIFT_CENTER;
        -self.c * (1.0 - (-self.d * offset * offset).exp())
    }
}

/// Stress with the default constants (C = 1, D = 100)
pub fn stress(drift: f64) -> f64 {
    StressParams::default().stress(drift)
}

/// True when `min_stress` is at or below the ZFCM threshold
pub fn is_breach(min_stress: f64) -> bool {
    min_stress <= ZFCM_THRESHOLD
}

/// Alert decision for a whole series. Empty series never alert.
pub fn alert_condition(series: &Series) -> bool {
    series.min_stress().is_some_and(is_breach)
}
