//! [`EdgeProcessor`] — the pipeline state machine.
//!
//! One synchronous pass per measurement: validate → deliver-or-cache →
//! window → smooth → detect → debounce → alert. The only state beyond
//! the owned components is the connectivity flag the cache carries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use vitaledge_alert::{AlertGate, AlertManager};
use vitaledge_cache::{CachedPayload, EventCache, OfflineCache};
use vitaledge_core::PipelineConfig;
use vitaledge_core::Measurement;
use vitaledge_detect::{AnomalyDetection, AnomalyDetector};
use vitaledge_signal::{MeasurementValidator, SignalProcessor, SignalValidator, WindowStore};

use crate::history::{HistoryRecord, HistoryStore, MemoryHistory};
use crate::outcome::{FlushOutcome, FlushedEvents, IngestNote, IngestOutcome};
use crate::transport::{BackendTransport, NoopTransport};

/// Snapshot for the status surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStatus {
    pub online: bool,
    pub tracked_streams: usize,
    pub cached_events: usize,
    pub patients_seen: usize,
}

/// Owns one instance of every pipeline component for its lifetime.
///
/// Components sit behind per-capability traits so tests can substitute
/// any stage; [`EdgeProcessor::from_config`] wires the defaults.
pub struct EdgeProcessor {
    validator: Box<dyn MeasurementValidator>,
    windows: Box<dyn WindowStore>,
    detector: Box<dyn AnomalyDetection>,
    alerts: Box<dyn AlertGate>,
    cache: Box<dyn EventCache>,
    history: Box<dyn HistoryStore>,
    transport: Box<dyn BackendTransport>,
}

impl EdgeProcessor {
    /// Wire the default components from a validated configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            validator: Box::new(SignalValidator::new(config.plausible_ranges.clone())),
            windows: Box::new(SignalProcessor::new(config.window_size)),
            detector: Box::new(AnomalyDetector::new(
                config.thresholds.clone(),
                config.trend.clone(),
            )),
            alerts: Box::new(AlertManager::new(
                config.severity_policy.clone(),
                config.debounce_ms,
            )),
            cache: Box::new(OfflineCache::new()),
            history: Box::new(MemoryHistory::new()),
            transport: Box::new(NoopTransport),
        }
    }

    /// Full dependency injection, for tests and embedding.
    pub fn new(
        validator: Box<dyn MeasurementValidator>,
        windows: Box<dyn WindowStore>,
        detector: Box<dyn AnomalyDetection>,
        alerts: Box<dyn AlertGate>,
        cache: Box<dyn EventCache>,
        history: Box<dyn HistoryStore>,
        transport: Box<dyn BackendTransport>,
    ) -> Self {
        Self {
            validator,
            windows,
            detector,
            alerts,
            cache,
            history,
            transport,
        }
    }

    pub fn with_history(mut self, history: Box<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_transport(mut self, transport: Box<dyn BackendTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Run one measurement through the pipeline at the current instant.
    pub fn ingest(&mut self, measurement: Measurement) -> IngestOutcome {
        self.ingest_at(measurement, Utc::now())
    }

    /// Run one measurement through the pipeline at an explicit instant.
    ///
    /// The instant drives debounce decisions and alert timestamps; tests
    /// pass it for deterministic replay.
    pub fn ingest_at(&mut self, measurement: Measurement, now: DateTime<Utc>) -> IngestOutcome {
        if let Err(reason) = self.validator.validate(&measurement) {
            tracing::warn!(
                patient_id = %measurement.patient_id,
                measurement_type = %measurement.measurement_type,
                reason = %reason,
                "measurement discarded"
            );
            return IngestOutcome::Discarded { reason };
        }

        // Store-and-forward while offline; hand to the backend otherwise.
        if self.cache.is_online() {
            self.transport.send_measurement(&measurement);
        } else {
            self.cache.store_measurement(measurement.clone());
        }

        self.windows.update_window(measurement.clone());
        self.history.save_measurement(&measurement);

        let patient_id = measurement.patient_id.clone();
        let measurement_type = measurement.measurement_type.clone();

        let smoothed = self.windows.smoothed_window(&patient_id, &measurement_type);
        let Some(anomaly) = self.detector.evaluate(&smoothed, &measurement_type) else {
            return IngestOutcome::Ok {
                measurement,
                note: None,
            };
        };

        if !self.alerts.allow_emission(&patient_id, &anomaly, now) {
            return IngestOutcome::Ok {
                measurement,
                note: Some(IngestNote::Debounced),
            };
        }

        let severity = self.alerts.classify_severity(&anomaly);
        let metadata = HashMap::from([(
            "measurement_id".to_string(),
            measurement.measurement_id.clone(),
        )]);
        let alert = self
            .alerts
            .create_alert(&patient_id, severity, anomaly, metadata, now);

        let alert = if self.cache.is_online() {
            self.alerts.publish(alert)
        } else {
            self.cache.store_alert(alert.clone());
            alert
        };
        self.history.save_alert(&alert);

        IngestOutcome::Alert { alert }
    }

    /// Drain the offline cache, chronologically, once connectivity is back.
    pub fn flush_cached(&mut self) -> FlushOutcome {
        if !self.cache.is_online() {
            return FlushOutcome::Offline { flushed: None };
        }

        let mut flushed = FlushedEvents::default();
        for event in self.cache.flush() {
            match event.payload {
                CachedPayload::Measurement(m) => flushed.measurements.push(m),
                CachedPayload::Alert(a) => flushed.alerts.push(a),
            }
        }

        tracing::info!(
            measurements = flushed.measurements.len(),
            alerts = flushed.alerts.len(),
            "offline cache flushed"
        );
        FlushOutcome::Flushed { flushed }
    }

    /// Toggle connectivity. Buffered data only moves on an explicit flush.
    pub fn set_online(&mut self, online: bool) {
        self.cache.set_online(online);
    }

    pub fn is_online(&self) -> bool {
        self.cache.is_online()
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            online: self.cache.is_online(),
            tracked_streams: self.windows.stream_count(),
            cached_events: self.cache.cached_count(),
            patients_seen: self.history.patient_count(),
        }
    }

    /// Display-only read-through to the history collaborator.
    pub fn patient_history(&self, patient_id: &str, limit: usize) -> Vec<HistoryRecord> {
        self.history.recent(patient_id, limit)
    }
}
