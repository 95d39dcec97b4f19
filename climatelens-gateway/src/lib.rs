//! HTTP gateway for ClimateLens.
//!
//! Exposes the aggregation gateway from `climatelens-core` as
//! `/weather`, `/airquality` and `/summary` (also under `/api`).

pub mod http_server;

pub use http_server::{AppState, create_router, run_http_server};
