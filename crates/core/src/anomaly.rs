//! Anomaly types: a detected deviation from expected physiology.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::measurement::MeasurementType;

/// How the deviation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    ThresholdLow,
    ThresholdHigh,
    Trend,
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnomalyType::ThresholdLow => "THRESHOLD_LOW",
            AnomalyType::ThresholdHigh => "THRESHOLD_HIGH",
            AnomalyType::Trend => "TREND",
        };
        f.write_str(s)
    }
}

/// Value interval a threshold finding was judged against.
///
/// Either side may be absent when the configured threshold is one-sided.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpectedRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A detected deviation, created fresh per detection call.
///
/// Never persisted directly — if emitted, it is embedded in an
/// [`AlertEvent`](crate::alert::AlertEvent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub anomaly_type: AnomalyType,
    pub measurement_type: MeasurementType,
    pub observed_value: f64,
    /// None for trend findings.
    pub expected_range: Option<ExpectedRange>,
    pub detection_timestamp: DateTime<Utc>,
    pub message: String,
    /// Diagnostic payload: last sample for thresholds, computed slope for trends.
    pub context: serde_json::Value,
}
