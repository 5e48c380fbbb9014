//! The ingest pipeline orchestrator and its collaborator seams.
//!
//! [`EdgeProcessor`] wires validation, windowing, detection, alerting,
//! and the offline cache into one synchronous pipeline. External I/O
//! (history persistence, backend delivery) sits behind the traits in
//! [`history`] and [`transport`] so tests can substitute them.

pub mod history;
pub mod outcome;
pub mod processor;
pub mod transport;

pub use history::{HistoryRecord, HistoryStore, MemoryHistory};
pub use outcome::{FlushOutcome, FlushedEvents, IngestNote, IngestOutcome};
pub use processor::{EdgeProcessor, PipelineStatus};
pub use transport::{BackendTransport, NoopTransport};
