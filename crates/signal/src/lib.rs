//! Signal-side pipeline stages: numeric helpers, measurement validation,
//! and per-stream sliding windows with a derived smoothed view.

pub mod stats;
pub mod validator;
pub mod window;

pub use validator::{MeasurementValidator, SignalValidator, ValidationFailure};
pub use window::{SignalProcessor, WindowStore};
