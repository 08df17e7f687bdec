//! Static graph metrics: degree, density, clustering, path length and
//! efficiency.
//!
//! Path-based metrics run one BFS per node and count unreachable pairs as
//! contributing nothing.

use connectome_core::{Graph, GraphError, MetricKind};

use crate::paths::distances;

use super::{memo_graph, memo_node, memo_nodes};

// ---------------------------------------------------------------------------
// Degree and density
// ---------------------------------------------------------------------------

/// Number of neighbours (out-neighbours on directed graphs).
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
pub fn degree(graph: &Graph, node: u32) -> Result<usize, GraphError> {
    graph.check_node(node)?;
    Ok(graph.degree(node))
}

/// Every node's degree, memoized as node values.
///
/// # Errors
///
/// Only when the cache rejects the write.
#[allow(clippy::cast_precision_loss)]
pub fn degrees_cached(graph: &mut Graph) -> Result<Vec<f64>, GraphError> {
    memo_nodes(graph, MetricKind::Degree, |g| {
        Ok(g.nodes().map(|u| g.degree(u) as f64).collect())
    })
}

/// Fraction of possible edges present.
///
/// `m / (n(n-1)/2)` undirected, `m / (n(n-1))` directed; 0 below two nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn density(graph: &Graph) -> f64 {
    let n = graph.num_nodes();
    if n < 2 {
        return 0.0;
    }
    let mut possible = (n * (n - 1)) as f64;
    if !graph.is_directed() {
        possible /= 2.0;
    }
    graph.num_edges() as f64 / possible
}

/// [`density`], memoized as a whole-graph value.
///
/// # Errors
///
/// Does not fail for values computed against the same graph.
pub fn density_cached(graph: &mut Graph) -> Result<f64, GraphError> {
    memo_graph(graph, MetricKind::Density, |g| Ok(density(g)))
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Local clustering coefficient: links among `node`'s neighbours over the
/// `k(k-1)` ordered neighbour pairs. 0 below two neighbours.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
#[allow(clippy::cast_precision_loss)]
pub fn clustering_coefficient(graph: &Graph, node: u32) -> Result<f64, GraphError> {
    graph.check_node(node)?;
    let nbrs = graph.neighbours(node);
    let k = nbrs.len();
    if k < 2 {
        return Ok(0.0);
    }
    let links: usize = nbrs
        .iter()
        .map(|&a| nbrs.iter().filter(|&&b| graph.are_neighbours(a, b)).count())
        .sum();
    Ok(links as f64 / (k * (k - 1)) as f64)
}

/// [`clustering_coefficient`], memoized as a node value.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
pub fn clustering_cached(graph: &mut Graph, node: u32) -> Result<f64, GraphError> {
    memo_node(graph, MetricKind::Clustering, node, |g| {
        clustering_coefficient(g, node)
    })
}

/// Mean local clustering over every node; 0 for an empty graph.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_clustering(graph: &Graph) -> f64 {
    let n = graph.num_nodes();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = graph
        .nodes()
        .filter_map(|u| clustering_coefficient(graph, u).ok())
        .sum();
    total / n as f64
}

/// [`mean_clustering`], memoized as a whole-graph value.
///
/// # Errors
///
/// Does not fail for values computed against the same graph.
pub fn mean_clustering_cached(graph: &mut Graph) -> Result<f64, GraphError> {
    memo_graph(graph, MetricKind::Clustering, |g| Ok(mean_clustering(g)))
}

// ---------------------------------------------------------------------------
// Path length and efficiency
// ---------------------------------------------------------------------------

/// Sum of hop distances and number of reachable nodes, excluding `node`.
fn reach(graph: &Graph, node: u32) -> Result<(u64, usize), GraphError> {
    let dist = distances(graph, node)?;
    Ok(dist
        .iter()
        .flatten()
        .filter(|&&d| d > 0)
        .fold((0, 0), |(sum, count), &d| (sum + u64::from(d), count + 1)))
}

/// Mean hop distance from `node` to every node it reaches; 0 when it
/// reaches nothing.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
#[allow(clippy::cast_precision_loss)]
pub fn node_mean_path_length(graph: &Graph, node: u32) -> Result<f64, GraphError> {
    let (sum, count) = reach(graph, node)?;
    Ok(if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    })
}

/// [`node_mean_path_length`], memoized as a node value.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
pub fn node_mean_path_length_cached(graph: &mut Graph, node: u32) -> Result<f64, GraphError> {
    memo_node(graph, MetricKind::PathLength, node, |g| {
        node_mean_path_length(g, node)
    })
}

/// Mean hop distance over every ordered pair `(u, v)`, `u != v`, with `v`
/// reachable from `u`; 0 when there is no such pair.
///
/// # Errors
///
/// Only allocation-related failures from the traversal.
#[allow(clippy::cast_precision_loss)]
pub fn characteristic_path_length(graph: &Graph) -> Result<f64, GraphError> {
    let (mut sum, mut count) = (0_u64, 0_usize);
    for u in graph.nodes() {
        let (s, c) = reach(graph, u)?;
        sum += s;
        count += c;
    }
    Ok(if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    })
}

/// [`characteristic_path_length`], memoized as a whole-graph value.
///
/// # Errors
///
/// See [`characteristic_path_length`].
pub fn characteristic_path_length_cached(graph: &mut Graph) -> Result<f64, GraphError> {
    memo_graph(graph, MetricKind::PathLength, characteristic_path_length)
}

/// Global efficiency: mean of `1 / d(u, v)` over all ordered pairs
/// `u != v`, with unreachable pairs contributing 0.
///
/// # Errors
///
/// Only allocation-related failures from the traversal.
#[allow(clippy::cast_precision_loss)]
pub fn global_efficiency(graph: &Graph) -> Result<f64, GraphError> {
    let n = graph.num_nodes();
    if n < 2 {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for u in graph.nodes() {
        total += distances(graph, u)?
            .iter()
            .flatten()
            .filter(|&&d| d > 0)
            .map(|&d| 1.0 / f64::from(d))
            .sum::<f64>();
    }
    Ok(total / (n * (n - 1)) as f64)
}

/// [`global_efficiency`], memoized as a whole-graph value.
///
/// # Errors
///
/// See [`global_efficiency`].
pub fn global_efficiency_cached(graph: &mut Graph) -> Result<f64, GraphError> {
    memo_graph(graph, MetricKind::Efficiency, global_efficiency)
}
