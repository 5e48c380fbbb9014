//! Alert policy: severity classification, debounce suppression, and
//! alert construction with a publish seam for a real notification channel.

pub mod debounce;
pub mod manager;

pub use debounce::DebounceGate;
pub use manager::{AlertGate, AlertManager};
