//! Measurement types: the physiological sample that enters the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of physiological measurement.
///
/// The three built-in kinds carry configured ranges and detection rules.
/// Unrecognized wire values land in `Other` so an edge device can send
/// new kinds without a deserialization failure — they are then rejected
/// by the validator for lacking a plausible range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MeasurementType {
    HeartRate,
    Spo2,
    Temperature,
    Other(String),
}

impl MeasurementType {
    pub fn as_str(&self) -> &str {
        match self {
            MeasurementType::HeartRate => "HEART_RATE",
            MeasurementType::Spo2 => "SPO2",
            MeasurementType::Temperature => "TEMPERATURE",
            MeasurementType::Other(s) => s,
        }
    }
}

impl From<String> for MeasurementType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HEART_RATE" => MeasurementType::HeartRate,
            "SPO2" => MeasurementType::Spo2,
            "TEMPERATURE" => MeasurementType::Temperature,
            _ => MeasurementType::Other(s),
        }
    }
}

impl From<MeasurementType> for String {
    fn from(t: MeasurementType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physiological sample for a patient.
///
/// Immutable once created. Pipeline stages clone it rather than alias it;
/// in particular, smoothing never rewrites stored raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Opaque unique identifier assigned by the sending device.
    pub measurement_id: String,
    pub patient_id: String,
    pub measurement_type: MeasurementType,
    pub value: f64,
    /// Event time (RFC-3339 on the wire).
    pub timestamp: DateTime<Utc>,
    /// Signal quality in [0, 1]; missing on the wire means perfect.
    #[serde(default = "default_signal_quality")]
    pub signal_quality: f64,
}

fn default_signal_quality() -> f64 {
    1.0
}

/// Composite key identifying one measurement stream.
pub type StreamKey = (String, MeasurementType);

impl Measurement {
    /// The (patient, type) stream this measurement belongs to.
    pub fn stream_key(&self) -> StreamKey {
        (self.patient_id.clone(), self.measurement_type.clone())
    }
}
