//! HTTP surface for the edge pipeline: a thin Axum layer over one
//! [`EdgeProcessor`](vitaledge_pipeline::EdgeProcessor).

pub mod api;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
