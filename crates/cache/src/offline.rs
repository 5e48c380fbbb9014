//! The offline cache: a unified queue of wrapped events drained in
//! chronological order once connectivity returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitaledge_core::{AlertEvent, Measurement};

/// What a cached entry wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CachedKind {
    Measurement,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedPayload {
    Measurement(Measurement),
    Alert(AlertEvent),
}

/// A buffered event awaiting delivery.
///
/// `timestamp` is the payload's own event time, never the insertion
/// time — flush ordering must reflect when events occurred even when
/// store calls happen out of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEvent {
    pub kind: CachedKind,
    pub payload: CachedPayload,
    pub timestamp: DateTime<Utc>,
    /// Reserved for a future sync protocol; not consulted on emission.
    #[serde(default)]
    pub synced: bool,
}

/// Capability seam for the orchestrator; substituted in tests.
pub trait EventCache: Send {
    fn set_online(&mut self, online: bool);
    fn is_online(&self) -> bool;
    fn store_measurement(&mut self, measurement: Measurement);
    fn store_alert(&mut self, alert: AlertEvent);

    /// Drain everything buffered, sorted ascending by event time.
    fn flush(&mut self) -> Vec<CachedEvent>;

    /// Number of events currently buffered.
    fn cached_count(&self) -> usize;
}

/// In-memory store-and-forward buffer; starts online.
pub struct OfflineCache {
    online: bool,
    queue: Vec<CachedEvent>,
}

impl OfflineCache {
    pub fn new() -> Self {
        Self {
            online: true,
            queue: Vec::new(),
        }
    }
}

impl Default for OfflineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCache for OfflineCache {
    fn set_online(&mut self, online: bool) {
        if self.online != online {
            tracing::info!(online, buffered = self.queue.len(), "connectivity changed");
        }
        self.online = online;
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn store_measurement(&mut self, measurement: Measurement) {
        self.queue.push(CachedEvent {
            kind: CachedKind::Measurement,
            timestamp: measurement.timestamp,
            payload: CachedPayload::Measurement(measurement),
            synced: false,
        });
    }

    fn store_alert(&mut self, alert: AlertEvent) {
        self.queue.push(CachedEvent {
            kind: CachedKind::Alert,
            timestamp: alert.timestamp,
            payload: CachedPayload::Alert(alert),
            synced: false,
        });
    }

    fn flush(&mut self) -> Vec<CachedEvent> {
        let mut drained = std::mem::take(&mut self.queue);
        drained.sort_by_key(|event| event.timestamp);
        drained
    }

    fn cached_count(&self) -> usize {
        self.queue.len()
    }
}
