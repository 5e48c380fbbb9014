//! Shared server state.

use tokio::sync::Mutex;

use vitaledge_pipeline::EdgeProcessor;

/// One pipeline behind a single mutual-exclusion boundary.
///
/// Every ingest/flush/connectivity call serializes on this mutex; the
/// pipeline itself is synchronous and bounded per call, so the critical
/// section is O(window size).
pub struct AppState {
    pub processor: Mutex<EdgeProcessor>,
}

impl AppState {
    pub fn new(processor: EdgeProcessor) -> Self {
        Self {
            processor: Mutex::new(processor),
        }
    }
}
