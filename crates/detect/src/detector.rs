//! Threshold and trend rules.
//!
//! Both rules operate on whatever window they are handed — in the live
//! pipeline that is the smoothed view, so the "most recent sample" a
//! threshold sees is the window mean.

use chrono::Utc;
use serde_json::json;

use vitaledge_core::config::{ThresholdBounds, TrendConfig};
use vitaledge_core::{Anomaly, AnomalyType, ExpectedRange, Measurement, MeasurementType};
use vitaledge_signal::stats;

use std::collections::HashMap;

/// Capability seam for the orchestrator; substituted in tests.
pub trait AnomalyDetection: Send {
    /// Threshold finding if any, else trend finding, else None.
    fn evaluate(
        &self,
        window: &[Measurement],
        measurement_type: &MeasurementType,
    ) -> Option<Anomaly>;
}

/// Stateless detector parameterized by threshold and trend configuration.
pub struct AnomalyDetector {
    thresholds: HashMap<MeasurementType, ThresholdBounds>,
    trend: TrendConfig,
}

impl AnomalyDetector {
    pub fn new(thresholds: HashMap<MeasurementType, ThresholdBounds>, trend: TrendConfig) -> Self {
        Self { thresholds, trend }
    }

    /// Threshold rule: inspects only the most recent sample in the window.
    ///
    /// SPO2 alerts below its configured minimum; HEART_RATE above its
    /// configured maximum (exclusive); TEMPERATURE at or above its
    /// configured maximum. The TEMPERATURE bound is inclusive on
    /// purpose: a reading equal to the limit already counts as febrile.
    pub fn detect_threshold(
        &self,
        window: &[Measurement],
        measurement_type: &MeasurementType,
    ) -> Option<Anomaly> {
        let last = window.last()?;
        let bounds = self.thresholds.get(measurement_type)?;

        let (anomaly_type, limit) = match measurement_type {
            MeasurementType::Spo2 => {
                let min = bounds.min?;
                if last.value < min {
                    (AnomalyType::ThresholdLow, min)
                } else {
                    return None;
                }
            }
            MeasurementType::HeartRate => {
                let max = bounds.max?;
                if last.value > max {
                    (AnomalyType::ThresholdHigh, max)
                } else {
                    return None;
                }
            }
            MeasurementType::Temperature => {
                let max = bounds.max?;
                if last.value >= max {
                    (AnomalyType::ThresholdHigh, max)
                } else {
                    return None;
                }
            }
            MeasurementType::Other(_) => return None,
        };

        let direction = match anomaly_type {
            AnomalyType::ThresholdLow => "below configured minimum",
            _ => "at or above configured maximum",
        };

        Some(Anomaly {
            anomaly_type,
            measurement_type: measurement_type.clone(),
            observed_value: last.value,
            expected_range: Some(ExpectedRange {
                min: bounds.min,
                max: bounds.max,
            }),
            detection_timestamp: Utc::now(),
            message: format!(
                "{} {:.1} {} {:.1}",
                measurement_type, last.value, direction, limit
            ),
            context: json!({ "last_sample": last }),
        })
    }

    /// Trend rule: least-squares slope over the window.
    ///
    /// SPO2 triggers on a slope at or below its (negative) limit — a
    /// falling trend is the dangerous one. Every other type triggers on
    /// a slope at or above its limit.
    pub fn detect_trend(
        &self,
        window: &[Measurement],
        measurement_type: &MeasurementType,
    ) -> Option<Anomaly> {
        if window.len() < self.trend.min_points {
            return None;
        }

        let limit = *self.trend.slope_thresholds.get(measurement_type)?;
        let values: Vec<f64> = window.iter().map(|m| m.value).collect();
        let slope = stats::slope(&values);

        let triggered = match measurement_type {
            MeasurementType::Spo2 => slope <= limit,
            _ => slope >= limit,
        };
        if !triggered {
            return None;
        }

        let last = window.last()?;
        let direction = if slope < 0.0 { "falling" } else { "rising" };

        Some(Anomaly {
            anomaly_type: AnomalyType::Trend,
            measurement_type: measurement_type.clone(),
            observed_value: last.value,
            expected_range: None,
            detection_timestamp: Utc::now(),
            message: format!(
                "{} {} at {:.2} per sample over {} points",
                measurement_type,
                direction,
                slope,
                window.len()
            ),
            context: json!({ "slope": slope, "points": window.len(), "last_value": last.value }),
        })
    }
}

impl AnomalyDetection for AnomalyDetector {
    fn evaluate(
        &self,
        window: &[Measurement],
        measurement_type: &MeasurementType,
    ) -> Option<Anomaly> {
        self.detect_threshold(window, measurement_type)
            .or_else(|| self.detect_trend(window, measurement_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(
            HashMap::from([
                (
                    MeasurementType::HeartRate,
                    ThresholdBounds { min: None, max: Some(120.0) },
                ),
                (
                    MeasurementType::Spo2,
                    ThresholdBounds { min: Some(90.0), max: None },
                ),
                (
                    MeasurementType::Temperature,
                    ThresholdBounds { min: None, max: Some(39.0) },
                ),
            ]),
            TrendConfig {
                min_points: 4,
                slope_thresholds: HashMap::from([
                    (MeasurementType::Spo2, -0.5),
                    (MeasurementType::HeartRate, 5.0),
                ]),
            },
        )
    }

    fn window(ty: MeasurementType, values: &[f64]) -> Vec<Measurement> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Measurement {
                measurement_id: format!("m-{i}"),
                patient_id: "p-1".to_string(),
                measurement_type: ty.clone(),
                value,
                timestamp: Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, i as u32).unwrap(),
                signal_quality: 1.0,
            })
            .collect()
    }

    #[test]
    fn heart_rate_above_max_is_threshold_high() {
        let w = window(MeasurementType::HeartRate, &[140.0]);
        let anomaly = detector()
            .detect_threshold(&w, &MeasurementType::HeartRate)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::ThresholdHigh);
        assert_eq!(anomaly.observed_value, 140.0);
        assert_eq!(anomaly.expected_range.unwrap().max, Some(120.0));
    }

    #[test]
    fn heart_rate_at_max_passes() {
        // Exclusive bound: 120 with max=120 is not an anomaly.
        let w = window(MeasurementType::HeartRate, &[120.0]);
        assert!(detector()
            .detect_threshold(&w, &MeasurementType::HeartRate)
            .is_none());
    }

    #[test]
    fn spo2_below_min_is_threshold_low() {
        let w = window(MeasurementType::Spo2, &[89.0]);
        let anomaly = detector()
            .detect_threshold(&w, &MeasurementType::Spo2)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::ThresholdLow);
    }

    #[test]
    fn spo2_at_min_passes() {
        let w = window(MeasurementType::Spo2, &[90.0]);
        assert!(detector()
            .detect_threshold(&w, &MeasurementType::Spo2)
            .is_none());
    }

    #[test]
    fn temperature_at_max_is_inclusive() {
        let w = window(MeasurementType::Temperature, &[39.0]);
        let anomaly = detector()
            .detect_threshold(&w, &MeasurementType::Temperature)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::ThresholdHigh);

        let w = window(MeasurementType::Temperature, &[38.9]);
        assert!(detector()
            .detect_threshold(&w, &MeasurementType::Temperature)
            .is_none());
    }

    #[test]
    fn empty_window_yields_nothing() {
        assert!(detector()
            .detect_threshold(&[], &MeasurementType::HeartRate)
            .is_none());
        assert!(detector().evaluate(&[], &MeasurementType::HeartRate).is_none());
    }

    #[test]
    fn unconfigured_type_yields_no_threshold() {
        let ty = MeasurementType::Other("RESPIRATORY_RATE".to_string());
        let w = window(ty.clone(), &[99.0]);
        assert!(detector().detect_threshold(&w, &ty).is_none());
    }

    #[test]
    fn threshold_only_inspects_the_most_recent_sample() {
        // Older out-of-range samples don't matter once the last is fine.
        let w = window(MeasurementType::HeartRate, &[180.0, 170.0, 95.0]);
        assert!(detector()
            .detect_threshold(&w, &MeasurementType::HeartRate)
            .is_none());
    }

    #[test]
    fn trend_requires_minimum_points() {
        let w = window(MeasurementType::Spo2, &[98.0, 96.0, 94.0]);
        assert!(detector().detect_trend(&w, &MeasurementType::Spo2).is_none());
    }

    #[test]
    fn falling_spo2_trend_triggers() {
        let w = window(MeasurementType::Spo2, &[99.0, 98.0, 97.0, 96.0]);
        let anomaly = detector()
            .detect_trend(&w, &MeasurementType::Spo2)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::Trend);
        assert!(anomaly.expected_range.is_none());
        assert_eq!(anomaly.observed_value, 96.0);
        let slope = anomaly.context["slope"].as_f64().unwrap();
        assert!((slope - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn stable_spo2_does_not_trigger_trend() {
        let w = window(MeasurementType::Spo2, &[97.0, 97.0, 97.0, 97.0]);
        assert!(detector().detect_trend(&w, &MeasurementType::Spo2).is_none());
    }

    #[test]
    fn rising_heart_rate_trend_triggers() {
        let w = window(MeasurementType::HeartRate, &[70.0, 76.0, 82.0, 88.0]);
        let anomaly = detector()
            .detect_trend(&w, &MeasurementType::HeartRate)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::Trend);
    }

    #[test]
    fn type_without_slope_limit_never_trends() {
        // TEMPERATURE has no slope limit configured in this fixture.
        let w = window(MeasurementType::Temperature, &[36.0, 37.0, 38.0, 38.5]);
        assert!(detector()
            .detect_trend(&w, &MeasurementType::Temperature)
            .is_none());
    }

    #[test]
    fn threshold_takes_priority_over_trend() {
        // Rising and already above max: evaluate reports the threshold.
        let w = window(MeasurementType::HeartRate, &[110.0, 120.0, 130.0, 140.0]);
        let anomaly = detector()
            .evaluate(&w, &MeasurementType::HeartRate)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::ThresholdHigh);
    }

    #[test]
    fn evaluate_falls_back_to_trend() {
        // In range at every point, but rising fast.
        let w = window(MeasurementType::HeartRate, &[80.0, 90.0, 100.0, 110.0]);
        let anomaly = detector()
            .evaluate(&w, &MeasurementType::HeartRate)
            .unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::Trend);
    }

    #[test]
    fn trend_message_rounds_slope_to_two_decimals() {
        let w = window(MeasurementType::Spo2, &[99.0, 98.3, 97.1, 96.2]);
        let anomaly = detector()
            .detect_trend(&w, &MeasurementType::Spo2)
            .unwrap();
        // Full precision lives in the context, two decimals in the message.
        let slope = anomaly.context["slope"].as_f64().unwrap();
        assert!(anomaly.message.contains(&format!("{slope:.2}")));
    }
}
