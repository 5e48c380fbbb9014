//! Repeat-alert suppression keyed by (patient, measurement type, anomaly kind).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use vitaledge_core::{AnomalyType, MeasurementType};

type DebounceKey = (String, MeasurementType, AnomalyType);

/// Gate that denies a repeat emission for the same key within the
/// configured interval.
///
/// The gate is reserved at decision time: an allowed check records the
/// instant immediately, before the caller builds or delivers anything,
/// and there is no rollback. Keys are never evicted; growth across
/// (patient, type, kind) combinations is a known limitation.
pub struct DebounceGate {
    interval: Duration,
    last_emission: HashMap<DebounceKey, DateTime<Utc>>,
}

impl DebounceGate {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            interval: Duration::milliseconds(debounce_ms as i64),
            last_emission: HashMap::new(),
        }
    }

    /// Whether an alert for this key may be emitted at `now`.
    ///
    /// Denies when the previous emission is strictly less than the
    /// interval old, without touching state. Otherwise records `now` as
    /// the key's emission instant and allows.
    pub fn allow(
        &mut self,
        patient_id: &str,
        measurement_type: &MeasurementType,
        anomaly_type: AnomalyType,
        now: DateTime<Utc>,
    ) -> bool {
        let key = (
            patient_id.to_string(),
            measurement_type.clone(),
            anomaly_type,
        );

        if let Some(last) = self.last_emission.get(&key) {
            if now.signed_duration_since(*last) < self.interval {
                return false;
            }
        }

        self.last_emission.insert(key, now);
        true
    }

    /// Number of keys with a recorded emission.
    pub fn key_count(&self) -> usize {
        self.last_emission.len()
    }
}
