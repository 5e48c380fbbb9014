//! Pipeline configuration: a JSON document read once at startup.
//!
//! The document carries every tunable the pipeline consumes — plausible
//! ranges, window size, detection thresholds, trend settings, debounce
//! interval, and the severity policy. Malformed or missing configuration
//! is startup-fatal; the pipeline itself assumes a validated config.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alert::SeverityLevel;
use crate::error::VitaledgeError;
use crate::measurement::MeasurementType;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Physiologically plausible [min, max] per measurement type.
    /// Types absent here are rejected by the validator.
    pub plausible_ranges: HashMap<MeasurementType, ValueRange>,
    /// Sliding window capacity per (patient, type) stream.
    pub window_size: usize,
    /// Alerting bounds per measurement type.
    #[serde(default)]
    pub thresholds: HashMap<MeasurementType, ThresholdBounds>,
    pub trend: TrendConfig,
    /// Minimum interval between repeated alerts for the same
    /// (patient, type, anomaly kind).
    pub debounce_ms: u64,
    /// Severity per measurement type; absent types default to MEDIUM.
    #[serde(default)]
    pub severity_policy: HashMap<MeasurementType, SeverityLevel>,
}

/// Closed plausibility interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Alerting bounds; either side may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThresholdBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Minimum window length before a slope is computed.
    pub min_points: usize,
    /// Per-type slope limit; types absent here never raise trend anomalies.
    #[serde(default)]
    pub slope_thresholds: HashMap<MeasurementType, f64>,
}

impl PipelineConfig {
    /// Read and validate a configuration document from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VitaledgeError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, VitaledgeError> {
        let config: PipelineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject documents the pipeline cannot safely run with.
    pub fn validate(&self) -> Result<(), VitaledgeError> {
        if self.plausible_ranges.is_empty() {
            return Err(VitaledgeError::Config(
                "plausible_ranges must not be empty".to_string(),
            ));
        }
        for (ty, range) in &self.plausible_ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(VitaledgeError::Config(format!(
                    "plausible range for {} is invalid: [{}, {}]",
                    ty, range.min, range.max
                )));
            }
        }
        if self.window_size == 0 {
            return Err(VitaledgeError::Config(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.trend.min_points < 2 {
            return Err(VitaledgeError::Config(
                "trend.min_points must be at least 2".to_string(),
            ));
        }
        for (ty, bounds) in &self.thresholds {
            let min_ok = bounds.min.map_or(true, f64::is_finite);
            let max_ok = bounds.max.map_or(true, f64::is_finite);
            if !min_ok || !max_ok {
                return Err(VitaledgeError::Config(format!(
                    "threshold bounds for {} must be finite",
                    ty
                )));
            }
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Pipeline config loaded:");
        tracing::info!("  window_size:  {}", self.window_size);
        tracing::info!("  debounce_ms:  {}", self.debounce_ms);
        tracing::info!("  ranges:       {} types", self.plausible_ranges.len());
        tracing::info!("  thresholds:   {} types", self.thresholds.len());
        tracing::info!(
            "  trend:        min_points={}, {} slope limits",
            self.trend.min_points,
            self.trend.slope_thresholds.len()
        );
        tracing::info!("  severity:     {} types mapped", self.severity_policy.len());
    }
}
