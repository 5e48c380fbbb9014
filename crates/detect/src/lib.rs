//! Stateless anomaly analysis over a measurement window: a threshold
//! rule on the most recent sample, then a least-squares trend rule.

pub mod detector;

pub use detector::{AnomalyDetection, AnomalyDetector};
