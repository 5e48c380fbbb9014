//! Backend delivery seam.
//!
//! The pipeline's only contract with the transport is deliver-or-cache:
//! while online every accepted measurement is handed here immediately.
//! A real implementation would call a network client; retry and backoff
//! belong on that side of the seam.

use vitaledge_core::Measurement;

pub trait BackendTransport: Send {
    fn send_measurement(&self, measurement: &Measurement);
}

/// Placeholder transport for deployments without a backend.
pub struct NoopTransport;

impl BackendTransport for NoopTransport {
    fn send_measurement(&self, measurement: &Measurement) {
        tracing::debug!(
            patient_id = %measurement.patient_id,
            measurement_type = %measurement.measurement_type,
            "measurement handed to backend transport"
        );
    }
}
