//! # vecserve-service
//!
//! The query pipeline and service boundary for vecserve.
//!
//! [`QueryPipeline`] turns query text into ranked metadata records:
//! validate k, embed, search. [`ServiceState`] implements the
//! health/reload/search contract on top of it, and [`http`] exposes that
//! contract as JSON over HTTP.

pub mod handlers;
pub mod http;
pub mod pipeline;

pub use handlers::{HealthResponse, ReloadResponse, SearchResponse, SearchResults, ServiceState};
pub use http::{router, run_server_with_shutdown};
pub use pipeline::{PipelineError, QueryPipeline};
