//! Append-only per-patient history, used for display only.
//!
//! The pipeline writes measurements and alerts here and never depends
//! on read results for its own logic.

use std::collections::HashMap;

use serde::Serialize;

use vitaledge_core::{AlertEvent, Measurement};

/// One persisted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryRecord {
    Measurement { measurement: Measurement },
    Alert { alert: AlertEvent },
}

/// Collaborator seam for long-term persistence.
pub trait HistoryStore: Send {
    fn save_measurement(&mut self, measurement: &Measurement);
    fn save_alert(&mut self, alert: &AlertEvent);

    /// Most-recent-first records for one patient.
    fn recent(&self, patient_id: &str, limit: usize) -> Vec<HistoryRecord>;

    /// Number of patients with any record.
    fn patient_count(&self) -> usize;
}

/// In-memory history; the default store for a single edge process.
#[derive(Default)]
pub struct MemoryHistory {
    records: HashMap<String, Vec<HistoryRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn save_measurement(&mut self, measurement: &Measurement) {
        self.records
            .entry(measurement.patient_id.clone())
            .or_default()
            .push(HistoryRecord::Measurement {
                measurement: measurement.clone(),
            });
    }

    fn save_alert(&mut self, alert: &AlertEvent) {
        self.records
            .entry(alert.patient_id.clone())
            .or_default()
            .push(HistoryRecord::Alert {
                alert: alert.clone(),
            });
    }

    fn recent(&self, patient_id: &str, limit: usize) -> Vec<HistoryRecord> {
        match self.records.get(patient_id) {
            Some(records) => records.iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    fn patient_count(&self) -> usize {
        self.records.len()
    }
}
