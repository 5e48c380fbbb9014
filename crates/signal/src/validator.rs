//! Measurement gatekeeper: structural, quality, plausibility, and
//! temporal-order checks, applied in order with short-circuiting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use vitaledge_core::config::ValueRange;
use vitaledge_core::{Measurement, MeasurementType, StreamKey};

/// Minimum acceptable signal quality; samples below it are discarded.
pub const MIN_SIGNAL_QUALITY: f64 = 0.3;

/// Why a measurement was rejected.
///
/// The display strings are the wire-level discard reasons and must stay
/// stable — callers and dashboards match on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(into = "String")]
pub enum ValidationFailure {
    #[error("missing fields")]
    MissingFields,

    #[error("low signal quality")]
    LowSignalQuality,

    #[error("implausible value")]
    ImplausibleValue,

    #[error("invalid timestamp")]
    InvalidTimestamp,

    #[error("out-of-order timestamp")]
    OutOfOrderTimestamp,
}

impl From<ValidationFailure> for String {
    fn from(f: ValidationFailure) -> Self {
        f.to_string()
    }
}

/// Capability seam for the orchestrator; substituted in tests.
pub trait MeasurementValidator: Send {
    fn validate(&mut self, measurement: &Measurement) -> Result<(), ValidationFailure>;
}

/// Validates incoming measurements against configured plausible ranges
/// and enforces per-stream monotonic timestamps.
///
/// The temporal check is deliberately not idempotent: an accepted
/// measurement advances the stream's high-water mark, so re-validating
/// an earlier sample for the same (patient, type) stream fails.
pub struct SignalValidator {
    plausible_ranges: HashMap<MeasurementType, ValueRange>,
    last_accepted: HashMap<StreamKey, DateTime<Utc>>,
}

impl SignalValidator {
    pub fn new(plausible_ranges: HashMap<MeasurementType, ValueRange>) -> Self {
        Self {
            plausible_ranges,
            last_accepted: HashMap::new(),
        }
    }

    /// Number of streams with an accepted measurement on record.
    pub fn stream_count(&self) -> usize {
        self.last_accepted.len()
    }
}

impl MeasurementValidator for SignalValidator {
    fn validate(&mut self, measurement: &Measurement) -> Result<(), ValidationFailure> {
        // 1. Structural
        if measurement.patient_id.trim().is_empty()
            || measurement.measurement_type.as_str().trim().is_empty()
        {
            return Err(ValidationFailure::MissingFields);
        }

        // 2. Signal quality (NaN fails the comparison and is rejected too)
        if !(measurement.signal_quality >= MIN_SIGNAL_QUALITY) {
            return Err(ValidationFailure::LowSignalQuality);
        }

        // 3. Plausibility; unknown types have no range and fail here
        let range = self
            .plausible_ranges
            .get(&measurement.measurement_type)
            .ok_or(ValidationFailure::ImplausibleValue)?;
        if !measurement.value.is_finite()
            || measurement.value < range.min
            || measurement.value > range.max
        {
            return Err(ValidationFailure::ImplausibleValue);
        }

        // 4. Temporal order per (patient, type) stream; equal timestamps pass
        let key = measurement.stream_key();
        if let Some(last) = self.last_accepted.get(&key) {
            if measurement.timestamp < *last {
                return Err(ValidationFailure::OutOfOrderTimestamp);
            }
        }
        self.last_accepted.insert(key, measurement.timestamp);

        Ok(())
    }
}
