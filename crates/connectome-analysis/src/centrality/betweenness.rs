//! Edge betweenness via a layered Brandes pass.
//!
//! # Algorithm
//!
//! For every source `s`:
//!
//! 1. Count shortest paths from `s` and split the reachable nodes into BFS
//!    layers ([`path_counts`]).
//! 2. Walk the layers from the farthest back toward `s`. For a node `n`,
//!    `flow[n]` is the sum of this source's values on the edges from `n` to
//!    the next layer out. Each out-edge from `p` to a child `n` one layer
//!    farther from `s` receives `(1 + flow[n]) * counts[p] / counts[n]`.
//!    Edges inside a layer receive nothing. Only out-edges are scanned, so
//!    directed graphs need no reverse adjacency.
//! 3. Add the per-source values into the accumulator.
//!
//! Summed over every source, each unordered pair is counted from both ends
//! on undirected graphs, so [`edge_betweenness`] halves the total once.
//!
//! Complexity: O(V * E).

use tracing::{debug, instrument};

use connectome_core::{EdgeValues, Graph, GraphError, MetricKind};

use crate::paths::path_counts;

/// Add the contribution of shortest paths starting at `source` to `acc`.
///
/// Undirected edges get the same value on both of their slots. The
/// accumulator must be shaped like `graph`'s adjacency.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown source,
/// [`GraphError::InvalidArgument`] when `acc` does not match the graph.
pub fn edge_betweenness_from(
    graph: &Graph,
    source: u32,
    acc: &mut EdgeValues<f64>,
) -> Result<(), GraphError> {
    if !acc.matches(graph) {
        return Err(GraphError::InvalidArgument(
            "betweenness accumulator does not match the graph's adjacency".into(),
        ));
    }
    let pc = path_counts(graph, source)?;
    let mut local = EdgeValues::for_graph(graph, 0.0_f64);
    let mut flow = vec![0.0_f64; graph.num_nodes()];
    let layers = pc.levels.layers();

    for depth in (0..layers.len().saturating_sub(1)).rev() {
        let next = Some(depth as u32 + 1);
        for &p in &layers[depth] {
            let count_p = pc.counts[p as usize];
            for (idx, &child) in graph.neighbours(p).iter().enumerate() {
                if pc.depth[child as usize] != next {
                    continue;
                }
                let c = child as usize;
                let value = (1.0 + flow[c]) * count_p / pc.counts[c];
                flow[p as usize] += value;
                local.set(p, idx, value);
                if graph.is_directed() {
                    continue;
                }
                if let Some(back) = graph.neighbour_index(child, p) {
                    local.set(child, back, value);
                }
            }
        }
    }

    for layer in layers {
        for &u in layer {
            for (slot, value) in acc.node_mut(u).iter_mut().zip(local.node(u)) {
                *slot += value;
            }
        }
    }
    Ok(())
}

/// Edge betweenness of every edge, summed over all sources.
///
/// # Errors
///
/// Only allocation-related failures from the path counts.
#[instrument(skip(graph), fields(nodes = graph.num_nodes(), edges = graph.num_edges()))]
pub fn edge_betweenness(graph: &Graph) -> Result<EdgeValues<f64>, GraphError> {
    let mut acc = EdgeValues::for_graph(graph, 0.0_f64);
    for source in graph.nodes() {
        edge_betweenness_from(graph, source, &mut acc)?;
    }
    if !graph.is_directed() {
        for u in graph.nodes() {
            for value in acc.node_mut(u) {
                *value *= 0.5;
            }
        }
    }
    debug!("edge betweenness computed");
    Ok(acc)
}

/// [`edge_betweenness`], served from the graph's cache when every edge
/// already has a value and stored there otherwise.
///
/// # Errors
///
/// See [`edge_betweenness`].
pub fn edge_betweenness_cached(graph: &mut Graph) -> Result<EdgeValues<f64>, GraphError> {
    if let Some(values) = graph
        .stats()
        .and_then(|cache| cache.edges(MetricKind::EdgeBetweenness))
        .filter(|values| values.matches(graph))
    {
        return Ok(values);
    }
    let values = edge_betweenness(graph)?;
    graph.with_stats(|cache, g| cache.update_edges(g, MetricKind::EdgeBetweenness, &values))?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(n: usize, directed: bool, edges: &[(u32, u32)]) -> Graph {
        let mut g = Graph::new(n, directed);
        for &(u, v) in edges {
            g.add_edge(u, v, 1.0).expect("edge");
        }
        g
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn path_graph_counts_pairs_across_each_edge() {
        // 0 - 1 - 2 - 3
        let g = build(4, false, &[(0, 1), (1, 2), (2, 3)]);
        let eb = edge_betweenness(&g).expect("betweenness");
        assert!(approx(*eb.edge(&g, 0, 1).expect("0-1"), 3.0));
        assert!(approx(*eb.edge(&g, 1, 2).expect("1-2"), 4.0));
        assert!(approx(*eb.edge(&g, 2, 3).expect("2-3"), 3.0));
        assert!(approx(*eb.edge(&g, 2, 1).expect("2-1"), 4.0), "mirrored slot");
    }

    #[test]
    fn diamond_splits_paths_evenly() {
        let g = build(4, false, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let eb = edge_betweenness(&g).expect("betweenness");
        for (u, v) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            assert!(approx(*eb.edge(&g, u, v).expect("edge"), 2.0), "{u}-{v}");
        }
    }

    #[test]
    fn triangle_edges_carry_only_their_pair() {
        let g = build(3, false, &[(0, 1), (1, 2), (0, 2)]);
        let eb = edge_betweenness(&g).expect("betweenness");
        for u in g.nodes() {
            assert!(eb.node(u).iter().all(|&v| approx(v, 1.0)));
        }
    }

    #[test]
    fn single_source_contribution() {
        let g = build(4, false, &[(0, 1), (1, 2), (2, 3)]);
        let mut acc = EdgeValues::for_graph(&g, 0.0);
        edge_betweenness_from(&g, 0, &mut acc).expect("from 0");
        assert!(approx(*acc.edge(&g, 0, 1).expect("0-1"), 3.0));
        assert!(approx(*acc.edge(&g, 1, 2).expect("1-2"), 2.0));
        assert!(approx(*acc.edge(&g, 2, 3).expect("2-3"), 1.0));
    }

    #[test]
    fn directed_chain_is_not_halved() {
        let g = build(3, true, &[(0, 1), (1, 2)]);
        let eb = edge_betweenness(&g).expect("betweenness");
        assert!(approx(*eb.edge(&g, 0, 1).expect("0->1"), 2.0));
        assert!(approx(*eb.edge(&g, 1, 2).expect("1->2"), 2.0));
    }

    #[test]
    fn directed_diamond_splits_by_out_edges() {
        // 0 -> {1, 2} -> 3, plus a back arc 3 -> 0 that no path from 0 uses
        let g = build(4, true, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 0)]);
        let mut acc = EdgeValues::for_graph(&g, 0.0);
        edge_betweenness_from(&g, 0, &mut acc).expect("from 0");
        for (u, v) in [(0, 1), (0, 2)] {
            assert!(approx(*acc.edge(&g, u, v).expect("arc"), 1.5), "{u}->{v}");
        }
        for (u, v) in [(1, 3), (2, 3)] {
            assert!(approx(*acc.edge(&g, u, v).expect("arc"), 0.5), "{u}->{v}");
        }
        assert!(approx(*acc.edge(&g, 3, 0).expect("back arc"), 0.0));
    }

    #[test]
    fn mismatched_accumulator_is_rejected() {
        let g = build(3, false, &[(0, 1)]);
        let mut acc = EdgeValues::for_graph(&build(3, false, &[]), 0.0);
        assert!(matches!(
            edge_betweenness_from(&g, 0, &mut acc),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn cached_values_are_reused() {
        let mut g = build(4, false, &[(0, 1), (1, 2), (2, 3)]);
        let first = edge_betweenness_cached(&mut g).expect("compute");
        assert_eq!(
            g.stats().and_then(|c| c.edge(MetricKind::EdgeBetweenness, 1, 1)),
            Some(4.0)
        );
        let second = edge_betweenness_cached(&mut g).expect("cached");
        assert_eq!(first, second);
    }
}
