//! Connectivity-aware store-and-forward buffer for measurements and
//! alerts, replayed in event-time order on reconnect.

pub mod offline;

pub use offline::{CachedEvent, CachedKind, CachedPayload, EventCache, OfflineCache};
