//! Path sharing: how much two adjacent nodes' neighbourhoods overlap.
//!
//! For an edge `u - v` with `c` common neighbours the ratio is
//! `(1 + c) / (deg(u) * deg(v) - c)`. Edges bridging otherwise unrelated
//! neighbourhoods score low; edges inside dense clusters score high.

use connectome_core::{EdgeValues, Graph, GraphError, MetricKind};

/// Number of nodes adjacent to both `u` and `v`.
///
/// Both lists are sorted, so this is a single merge pass.
#[must_use]
pub fn common_neighbours(graph: &Graph, u: u32, v: u32) -> usize {
    let (a, b) = (graph.neighbours(u), graph.neighbours(v));
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}

#[allow(clippy::cast_precision_loss)]
fn ratio(graph: &Graph, u: u32, v: u32) -> f64 {
    let c = common_neighbours(graph, u, v) as f64;
    let product = (graph.degree(u) * graph.degree(v)) as f64;
    (1.0 + c) / (product - c)
}

/// Path-sharing ratio of the edge `u - v`. Symmetric in `u` and `v`.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for unknown nodes,
/// [`GraphError::EdgeNotFound`] when `u` and `v` are not neighbours.
pub fn path_sharing(graph: &Graph, u: u32, v: u32) -> Result<f64, GraphError> {
    for node in [u, v] {
        graph.check_node(node)?;
    }
    if !graph.are_neighbours(u, v) {
        return Err(GraphError::EdgeNotFound { u, v });
    }
    Ok(ratio(graph, u, v))
}

/// Path-sharing ratio of every edge, slot-aligned with the adjacency.
#[must_use]
pub fn path_sharing_all(graph: &Graph) -> EdgeValues<f64> {
    let mut values = EdgeValues::for_graph(graph, 0.0_f64);
    for u in graph.nodes() {
        for (slot, &v) in values.node_mut(u).iter_mut().zip(graph.neighbours(u)) {
            *slot = ratio(graph, u, v);
        }
    }
    values
}

/// [`path_sharing_all`], served from and written to the graph's cache.
///
/// # Errors
///
/// Only when the cache rejects the write, which cannot happen for values
/// computed against the same graph.
pub fn path_sharing_cached(graph: &mut Graph) -> Result<EdgeValues<f64>, GraphError> {
    if let Some(values) = graph
        .stats()
        .and_then(|cache| cache.edges(MetricKind::PathSharing))
        .filter(|values| values.matches(graph))
    {
        return Ok(values);
    }
    let values = path_sharing_all(graph);
    graph.with_stats(|cache, g| cache.update_edges(g, MetricKind::PathSharing, &values))?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(n: usize, edges: &[(u32, u32)]) -> Graph {
        let mut g = Graph::new(n, false);
        for &(u, v) in edges {
            g.add_edge(u, v, 1.0).expect("edge");
        }
        g
    }

    #[test]
    fn triangle_with_tail() {
        // 0-1-2 triangle, 2-3 tail
        let g = build(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
        // deg 0 = 2, deg 1 = 2, common {2}: (1 + 1) / (4 - 1)
        let inside = path_sharing(&g, 0, 1).expect("0-1");
        assert!((inside - 2.0 / 3.0).abs() < 1e-12);
        // deg 2 = 3, deg 3 = 1, no common: 1 / 3
        let tail = path_sharing(&g, 2, 3).expect("2-3");
        assert!((tail - 1.0 / 3.0).abs() < 1e-12);
        assert!(tail < inside);
    }

    #[test]
    fn symmetric_in_endpoints() {
        let g = build(5, &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 4), (3, 4)]);
        for (u, v, _) in g.edges() {
            let a = path_sharing(&g, u, v).expect("forward");
            let b = path_sharing(&g, v, u).expect("backward");
            assert!((a - b).abs() < 1e-12, "{u}-{v}");
        }
    }

    #[test]
    fn non_neighbours_are_rejected() {
        let g = build(3, &[(0, 1)]);
        assert_eq!(
            path_sharing(&g, 0, 2),
            Err(GraphError::EdgeNotFound { u: 0, v: 2 })
        );
        assert!(matches!(
            path_sharing(&g, 0, 7),
            Err(GraphError::NodeOutOfRange { node: 7, .. })
        ));
    }

    #[test]
    fn all_values_line_up_with_slots() {
        let g = build(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
        let all = path_sharing_all(&g);
        assert!(all.matches(&g));
        for (u, v, _) in g.edges() {
            let expected = path_sharing(&g, u, v).expect("edge");
            assert_eq!(all.edge(&g, u, v), Some(&expected));
            assert_eq!(all.edge(&g, v, u), Some(&expected));
        }
    }

    #[test]
    fn cached_variant_stores_values() {
        let mut g = build(3, &[(0, 1), (1, 2)]);
        let values = path_sharing_cached(&mut g).expect("compute");
        assert_eq!(
            g.stats().and_then(|c| c.edges(MetricKind::PathSharing)),
            Some(values)
        );
    }
}
