#![forbid(unsafe_code)]
//! connectome-analysis library.
//!
//! Algorithms over [`connectome_core::Graph`]:
//!
//! - [`traversal`]: the level-by-level BFS engine and its visitor trait.
//! - [`paths`]: path lengths, shortest paths, path counts, BFS layers.
//! - [`centrality`]: edge betweenness and path sharing.
//! - [`stats`]: components, clustering, efficiency, community scores.
//! - [`threshold`]: iterative edge removal and divisive clustering.
//!
//! # Conventions
//!
//! - **Errors**: every fallible operation returns
//!   `Result<_, connectome_core::GraphError>`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod centrality;
pub mod paths;
pub mod stats;
pub mod threshold;
pub mod traversal;

pub use threshold::{DivisiveResult, DivisiveStep, ThresholdOptimizer};
pub use traversal::{BfsOutcome, BfsVisitor, bfs, expand};
