//! HTTP handlers: ingest, flush, connectivity, status, and history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitaledge_core::Measurement;
use vitaledge_pipeline::{FlushOutcome, HistoryRecord, IngestOutcome, PipelineStatus};
use vitaledge_signal::ValidationFailure;

use crate::state::AppState;

// ── Health ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Ingest ────────────────────────────────────────────────────────

/// Wire shape of one measurement. The timestamp arrives as a string so
/// an unparseable instant becomes a structured discard rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct WireMeasurement {
    pub measurement_id: String,
    pub patient_id: String,
    pub measurement_type: String,
    pub value: f64,
    pub timestamp: String,
    #[serde(default)]
    pub signal_quality: Option<f64>,
}

impl WireMeasurement {
    fn into_measurement(self) -> Result<Measurement, ValidationFailure> {
        let timestamp: DateTime<Utc> = self
            .timestamp
            .parse()
            .map_err(|_| ValidationFailure::InvalidTimestamp)?;
        Ok(Measurement {
            measurement_id: self.measurement_id,
            patient_id: self.patient_id,
            measurement_type: self.measurement_type.into(),
            value: self.value,
            timestamp,
            signal_quality: self.signal_quality.unwrap_or(1.0),
        })
    }
}

pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(wire): Json<WireMeasurement>,
) -> Json<IngestOutcome> {
    let measurement = match wire.into_measurement() {
        Ok(m) => m,
        Err(reason) => {
            tracing::warn!(reason = %reason, "measurement discarded at the wire");
            return Json(IngestOutcome::Discarded { reason });
        }
    };

    let mut processor = state.processor.lock().await;
    Json(processor.ingest(measurement))
}

// ── Flush & connectivity ──────────────────────────────────────────

pub async fn flush(State(state): State<Arc<AppState>>) -> Json<FlushOutcome> {
    let mut processor = state.processor.lock().await;
    Json(processor.flush_cached())
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityRequest {
    pub online: bool,
}

#[derive(Serialize)]
pub struct ConnectivityResponse {
    pub online: bool,
}

pub async fn connectivity(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectivityRequest>,
) -> Json<ConnectivityResponse> {
    let mut processor = state.processor.lock().await;
    processor.set_online(request.online);
    Json(ConnectivityResponse {
        online: processor.is_online(),
    })
}

// ── Status & history ──────────────────────────────────────────────

pub async fn status(State(state): State<Arc<AppState>>) -> Json<PipelineStatus> {
    let processor = state.processor.lock().await;
    Json(processor.status())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    50
}

pub async fn patient_history(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<HistoryRecord>> {
    let processor = state.processor.lock().await;
    Json(processor.patient_history(&patient_id, query.limit))
}
