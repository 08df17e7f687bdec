#![forbid(unsafe_code)]
//! connectome-core library.
//!
//! The in-memory graph engine shared by the connectome tools: a weighted
//! adjacency store with edge events, per-edge value arrays kept aligned
//! through those events, and the derived statistics cache.
//!
//! # Conventions
//!
//! - **Errors**: [`GraphError`] for graph operations, `anyhow::Result` for
//!   configuration I/O.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;

pub use cache::{DerivedStatsCache, Granularity, MetricKind};
pub use error::{ErrorCode, GraphError};
pub use graph::{EdgeArray, EdgeValues, Graph, NodeLabel};
