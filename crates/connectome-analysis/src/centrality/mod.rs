//! Edge centrality metrics.
//!
//! # Overview
//!
//! Both metrics assign one value per adjacency slot, returned as
//! [`EdgeValues<f64>`](connectome_core::EdgeValues) aligned with the graph
//! they were computed on:
//!
//! - **Edge betweenness** (`betweenness`): how many shortest paths run
//!   through each edge. Bridges between communities score high.
//! - **Path sharing** (`sharing`): how much the endpoints' neighbourhoods
//!   overlap. Bridges between communities score low.
//!
//! On undirected graphs both slots of an edge always hold the same value.
//!
//! ```rust,ignore
//! use connectome_analysis::centrality::{edge_betweenness, path_sharing_all};
//!
//! let eb = edge_betweenness(&graph)?;
//! let ps = path_sharing_all(&graph);
//! ```

pub mod betweenness;
pub mod sharing;

pub use betweenness::{edge_betweenness, edge_betweenness_cached, edge_betweenness_from};
pub use sharing::{common_neighbours, path_sharing, path_sharing_all, path_sharing_cached};
