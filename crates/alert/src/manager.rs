//! Severity classification and alert construction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vitaledge_core::{AlertEvent, Anomaly, MeasurementType, SeverityLevel};

use crate::debounce::DebounceGate;

/// Capability seam for the orchestrator; substituted in tests.
pub trait AlertGate: Send {
    fn classify_severity(&self, anomaly: &Anomaly) -> SeverityLevel;

    /// May-emit check; an allowed call consumes the debounce window.
    fn allow_emission(&mut self, patient_id: &str, anomaly: &Anomaly, now: DateTime<Utc>) -> bool;

    fn create_alert(
        &self,
        patient_id: &str,
        severity: SeverityLevel,
        anomaly: Anomaly,
        metadata: HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> AlertEvent;

    /// Identity seam where a real notification channel would be invoked.
    fn publish(&self, alert: AlertEvent) -> AlertEvent;
}

/// Table-driven severity policy plus the debounce gate.
pub struct AlertManager {
    severity_policy: HashMap<MeasurementType, SeverityLevel>,
    debounce: DebounceGate,
}

impl AlertManager {
    pub fn new(
        severity_policy: HashMap<MeasurementType, SeverityLevel>,
        debounce_ms: u64,
    ) -> Self {
        Self {
            severity_policy,
            debounce: DebounceGate::new(debounce_ms),
        }
    }
}

impl AlertGate for AlertManager {
    fn classify_severity(&self, anomaly: &Anomaly) -> SeverityLevel {
        self.severity_policy
            .get(&anomaly.measurement_type)
            .copied()
            .unwrap_or(SeverityLevel::Medium)
    }

    fn allow_emission(&mut self, patient_id: &str, anomaly: &Anomaly, now: DateTime<Utc>) -> bool {
        self.debounce.allow(
            patient_id,
            &anomaly.measurement_type,
            anomaly.anomaly_type,
            now,
        )
    }

    fn create_alert(
        &self,
        patient_id: &str,
        severity: SeverityLevel,
        anomaly: Anomaly,
        metadata: HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> AlertEvent {
        AlertEvent {
            alert_id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            alert_type: anomaly.anomaly_type,
            severity,
            timestamp: now,
            anomaly,
            metadata,
        }
    }

    fn publish(&self, alert: AlertEvent) -> AlertEvent {
        tracing::info!(
            patient_id = %alert.patient_id,
            alert_type = %alert.alert_type,
            severity = ?alert.severity,
            "alert published"
        );
        alert
    }
}
