//! Per-stream sliding windows and the derived smoothed view.

use std::collections::HashMap;

use vitaledge_core::{Measurement, MeasurementType, StreamKey};

use crate::stats;

/// Capability seam for the orchestrator; substituted in tests.
pub trait WindowStore: Send {
    /// Append to the stream's window, evicting the oldest entry beyond
    /// capacity, and return the current raw window.
    fn update_window(&mut self, measurement: Measurement) -> &[Measurement];

    /// Current raw window for a stream (possibly empty).
    fn window(&self, patient_id: &str, measurement_type: &MeasurementType) -> &[Measurement];

    /// Derived view for analysis: every position carries the whole-window
    /// arithmetic mean. Raw storage is never touched.
    fn smoothed_window(
        &self,
        patient_id: &str,
        measurement_type: &MeasurementType,
    ) -> Vec<Measurement>;

    /// Number of streams currently tracked.
    fn stream_count(&self) -> usize;
}

/// Bounded FIFO windows of raw measurements keyed by (patient, type).
pub struct SignalProcessor {
    capacity: usize,
    windows: HashMap<StreamKey, Vec<Measurement>>,
}

impl SignalProcessor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            windows: HashMap::new(),
        }
    }
}

impl WindowStore for SignalProcessor {
    fn update_window(&mut self, measurement: Measurement) -> &[Measurement] {
        let key = measurement.stream_key();
        let window = self.windows.entry(key).or_default();
        window.push(measurement);
        if window.len() > self.capacity {
            window.remove(0);
        }
        window
    }

    fn window(&self, patient_id: &str, measurement_type: &MeasurementType) -> &[Measurement] {
        let key = (patient_id.to_string(), measurement_type.clone());
        self.windows.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn smoothed_window(
        &self,
        patient_id: &str,
        measurement_type: &MeasurementType,
    ) -> Vec<Measurement> {
        let raw = self.window(patient_id, measurement_type);
        if raw.is_empty() {
            return Vec::new();
        }

        let values: Vec<f64> = raw.iter().map(|m| m.value).collect();
        let window_mean = stats::mean(&values);

        raw.iter()
            .map(|m| {
                let mut smoothed = m.clone();
                smoothed.value = window_mean;
                smoothed
            })
            .collect()
    }

    fn stream_count(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn hr(patient: &str, value: f64, secs: u32) -> Measurement {
        Measurement {
            measurement_id: format!("m-{secs}"),
            patient_id: patient.to_string(),
            measurement_type: MeasurementType::HeartRate,
            value,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, secs).unwrap(),
            signal_quality: 1.0,
        }
    }

    #[test]
    fn window_grows_until_capacity() {
        let mut processor = SignalProcessor::new(3);
        for i in 0..3 {
            processor.update_window(hr("p-1", 70.0 + i as f64, i));
        }
        assert_eq!(processor.window("p-1", &MeasurementType::HeartRate).len(), 3);
    }

    #[test]
    fn window_never_exceeds_capacity_and_keeps_newest() {
        let mut processor = SignalProcessor::new(3);
        for i in 0..7 {
            processor.update_window(hr("p-1", 70.0 + i as f64, i));
        }
        let window = processor.window("p-1", &MeasurementType::HeartRate);
        assert_eq!(window.len(), 3);
        let values: Vec<f64> = window.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![74.0, 75.0, 76.0]);
    }

    #[test]
    fn streams_do_not_share_windows() {
        let mut processor = SignalProcessor::new(5);
        processor.update_window(hr("p-1", 70.0, 0));
        processor.update_window(hr("p-2", 80.0, 0));

        assert_eq!(processor.window("p-1", &MeasurementType::HeartRate).len(), 1);
        assert_eq!(processor.window("p-2", &MeasurementType::HeartRate).len(), 1);
        assert_eq!(processor.stream_count(), 2);
    }

    #[test]
    fn missing_stream_yields_empty_window() {
        let processor = SignalProcessor::new(5);
        assert!(processor.window("nobody", &MeasurementType::Spo2).is_empty());
        assert!(processor
            .smoothed_window("nobody", &MeasurementType::Spo2)
            .is_empty());
    }

    #[test]
    fn smoothing_collapses_every_position_to_the_window_mean() {
        let mut processor = SignalProcessor::new(5);
        for (i, v) in [60.0, 70.0, 80.0].iter().enumerate() {
            processor.update_window(hr("p-1", *v, i as u32));
        }

        let smoothed = processor.smoothed_window("p-1", &MeasurementType::HeartRate);
        assert_eq!(smoothed.len(), 3);
        for m in &smoothed {
            assert!((m.value - 70.0).abs() < 1e-12);
        }
    }

    #[test]
    fn smoothing_leaves_raw_storage_intact() {
        let mut processor = SignalProcessor::new(5);
        processor.update_window(hr("p-1", 60.0, 0));
        processor.update_window(hr("p-1", 80.0, 1));

        let _ = processor.smoothed_window("p-1", &MeasurementType::HeartRate);

        let raw: Vec<f64> = processor
            .window("p-1", &MeasurementType::HeartRate)
            .iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(raw, vec![60.0, 80.0]);
    }

    #[test]
    fn smoothed_samples_keep_their_timestamps() {
        let mut processor = SignalProcessor::new(5);
        processor.update_window(hr("p-1", 60.0, 0));
        processor.update_window(hr("p-1", 80.0, 9));

        let smoothed = processor.smoothed_window("p-1", &MeasurementType::HeartRate);
        assert_eq!(
            smoothed[1].timestamp,
            Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 9).unwrap()
        );
    }
}
