//! Whole-graph and per-node statistics.
//!
//! - `basic`: degree, density, clustering, path length, efficiency.
//! - `components`: connected components via union-find.
//! - `community`: partition quality scores (modularity, Chira fitness).
//!
//! The `*_cached` variants memoize into the graph's
//! [`DerivedStatsCache`](connectome_core::DerivedStatsCache): a stored value
//! is returned as is, otherwise it is computed and written back.

pub mod basic;
pub mod community;
pub mod components;

pub use basic::{
    characteristic_path_length, characteristic_path_length_cached, clustering_coefficient,
    clustering_cached, degree, degrees_cached, density, density_cached, global_efficiency,
    global_efficiency_cached, mean_clustering, mean_clustering_cached, node_mean_path_length,
    node_mean_path_length_cached,
};
pub use community::{chira_fitness, modularity, score_partition};
pub use components::{Components, components_cached, connected_components, num_components_cached};

use connectome_core::{Graph, GraphError, MetricKind};

pub(crate) fn memo_graph(
    graph: &mut Graph,
    kind: MetricKind,
    compute: impl FnOnce(&Graph) -> Result<f64, GraphError>,
) -> Result<f64, GraphError> {
    if let Some(value) = graph.stats().and_then(|cache| cache.graph_value(kind)) {
        return Ok(value);
    }
    let value = compute(graph)?;
    graph.with_stats(|cache, g| cache.update_graph(g, kind, value));
    Ok(value)
}

pub(crate) fn memo_node(
    graph: &mut Graph,
    kind: MetricKind,
    node: u32,
    compute: impl FnOnce(&Graph) -> Result<f64, GraphError>,
) -> Result<f64, GraphError> {
    if let Some(value) = graph.stats().and_then(|cache| cache.node(kind, node)) {
        return Ok(value);
    }
    let value = compute(graph)?;
    graph.with_stats(|cache, g| cache.update_node(g, kind, node, value))?;
    Ok(value)
}

pub(crate) fn memo_nodes(
    graph: &mut Graph,
    kind: MetricKind,
    compute: impl FnOnce(&Graph) -> Result<Vec<f64>, GraphError>,
) -> Result<Vec<f64>, GraphError> {
    if let Some(values) = graph
        .stats()
        .and_then(|cache| cache.nodes(kind))
        .filter(|values| values.len() == graph.num_nodes())
    {
        return Ok(values);
    }
    let values = compute(graph)?;
    graph.with_stats(|cache, g| cache.update_nodes(g, kind, &values))?;
    Ok(values)
}
