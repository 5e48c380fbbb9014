//! Structured results returned to the pipeline's caller.

use serde::Serialize;

use vitaledge_core::{AlertEvent, Measurement};
use vitaledge_signal::ValidationFailure;

/// Informational note attached to an `ok` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestNote {
    Debounced,
}

/// Terminal result of one `ingest` call.
///
/// Rejection of expected bad input is an outcome, not an error — no
/// failure propagates out of the pipeline for it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Validation rejected the measurement; nothing was stored.
    Discarded { reason: ValidationFailure },
    /// Processed without an emitted alert.
    Ok {
        measurement: Measurement,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<IngestNote>,
    },
    /// An anomaly passed the debounce gate and produced an alert.
    Alert { alert: AlertEvent },
}

impl IngestOutcome {
    pub fn is_alert(&self) -> bool {
        matches!(self, IngestOutcome::Alert { .. })
    }

    pub fn is_debounced(&self) -> bool {
        matches!(
            self,
            IngestOutcome::Ok {
                note: Some(IngestNote::Debounced),
                ..
            }
        )
    }
}

/// Drained cache contents, partitioned by kind. Each list preserves the
/// chronological order of the merged drain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlushedEvents {
    pub measurements: Vec<Measurement>,
    pub alerts: Vec<AlertEvent>,
}

/// Terminal result of one `flush_cached` call.
///
/// `Offline` is distinct from flushing zero events: it means the cache
/// was not drained at all because connectivity is still down.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlushOutcome {
    Offline { flushed: Option<FlushedEvents> },
    Flushed { flushed: FlushedEvents },
}
