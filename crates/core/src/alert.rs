//! Alert types: a severity-classified notification built from an anomaly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anomaly::{Anomaly, AnomalyType};

/// Clinical urgency assigned by the severity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

/// An alert built from an accepted anomaly.
///
/// Delivered exactly once — published immediately while online, cached
/// for later flush while offline. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_id: Uuid,
    pub patient_id: String,
    /// Mirrors the embedded anomaly's type.
    pub alert_type: AnomalyType,
    pub severity: SeverityLevel,
    pub timestamp: DateTime<Utc>,
    pub anomaly: Anomaly,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
