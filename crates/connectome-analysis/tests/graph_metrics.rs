//! Known-topology regression tests for traversal, path and centrality
//! metrics.
//!
//! Each test uses a hand-built graph whose expected values are worked out
//! by hand and hardcoded.

use connectome_analysis::centrality::{edge_betweenness, path_sharing, path_sharing_all};
use connectome_analysis::paths::{level_stack, num_paths, path_counts, path_length, shortest_path};
use connectome_analysis::stats::{
    Components, characteristic_path_length, connected_components, global_efficiency,
    mean_clustering,
};
use connectome_analysis::traversal::reachable_from;
use connectome_core::{Graph, MetricKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(n: usize, directed: bool, edges: &[(u32, u32)]) -> Graph {
    let mut g = Graph::new(n, directed);
    for &(u, v) in edges {
        g.add_edge(u, v, 1.0).expect("edge");
    }
    g
}

fn ring(n: u32) -> Graph {
    let edges: Vec<(u32, u32)> = (0..n).map(|u| (u, (u + 1) % n)).collect();
    build(n as usize, false, &edges)
}

fn star(leaves: u32) -> Graph {
    let edges: Vec<(u32, u32)> = (1..=leaves).map(|leaf| (0, leaf)).collect();
    build(leaves as usize + 1, false, &edges)
}

// ===========================================================================
// Topology 1: Ring of five
//
//   0 - 1 - 2 - 3 - 4 - 0
//
// Properties:
//   - Layers from 0: [0], [1, 4], [2, 3]
//   - Every pair is at distance 1 or 2.
//   - Every edge carries the same betweenness.
// ===========================================================================

#[test]
fn ring_path_length_and_depth() {
    let g = ring(5);
    assert_eq!(path_length(&g, 0, 2).expect("0 -> 2"), 2);
    assert_eq!(path_length(&g, 0, 3).expect("0 -> 3"), 2);
    assert_eq!(level_stack(&g, 0).expect("stack").depth(), 2);
}

#[test]
fn ring_betweenness_is_uniform() {
    // 10 unordered pairs: 5 at distance 1, 5 at distance 2, each with a
    // unique shortest path. Total path length 15 spread over 5 edges.
    let g = ring(5);
    let eb = edge_betweenness(&g).expect("betweenness");
    for (u, v, _) in g.edges() {
        let value = *eb.edge(&g, u, v).expect("edge");
        assert!((value - 3.0).abs() < 1e-10, "{u}-{v}: {value}");
    }
}

#[test]
fn ring_efficiency_and_path_length() {
    let g = ring(5);
    // Each node: two neighbours at 1, two at 2.
    assert!((characteristic_path_length(&g).expect("cpl") - 1.5).abs() < 1e-12);
    assert!((global_efficiency(&g).expect("eff") - 0.75).abs() < 1e-12);
    assert!(mean_clustering(&g).abs() < 1e-12, "no triangles");
}

// ===========================================================================
// Topology 2: Diamond
//
//     1
//    / \
//   0   3
//    \ /
//     2
//
// Properties:
//   - Two shortest paths 0 -> 3.
//   - Shortest path reconstruction follows the first-discovered parent (1).
// ===========================================================================

#[test]
fn diamond_counts_two_paths() {
    let g = build(4, false, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let pc = path_counts(&g, 0).expect("counts");
    assert!((pc.counts[3] - 2.0).abs() < 1e-12);
    assert_eq!(pc.depth[3], Some(2));
    assert_eq!(shortest_path(&g, 0, 3).expect("path"), Some(vec![0, 1, 3]));
}

#[test]
fn diamond_num_paths_is_cached() {
    let mut g = build(4, false, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let total = num_paths(&mut g, 0).expect("num paths");
    assert!((total - 5.0).abs() < 1e-12);
    let cache = g.stats().expect("cache");
    assert_eq!(cache.pair(MetricKind::NumPaths, 0, 3), Some(2.0));
}

// ===========================================================================
// Topology 3: Star with four leaves
//
//       1
//       |
//   4 - 0 - 2
//       |
//       3
//
// Properties:
//   - Every spoke carries 4 pairs: its leaf with the centre and the other
//     three leaves.
//   - Relabelling the nodes does not change any edge's value.
// ===========================================================================

#[test]
fn star_spokes_share_betweenness() {
    let g = star(4);
    let eb = edge_betweenness(&g).expect("betweenness");
    for leaf in 1..=4 {
        let value = *eb.edge(&g, 0, leaf).expect("spoke");
        assert!((value - 4.0).abs() < 1e-10, "spoke {leaf}: {value}");
    }
}

#[test]
fn star_betweenness_survives_relabelling() {
    let g = star(4);
    // centre 0 -> 3, leaves rotated
    let map = [Some(3), Some(0), Some(4), Some(1), Some(2)];
    let relabelled = g.remap(&map).expect("remap");

    let before = edge_betweenness(&g).expect("before");
    let after = edge_betweenness(&relabelled).expect("after");
    for (u, v, _) in g.edges() {
        let (nu, nv) = (map[u as usize].expect("kept"), map[v as usize].expect("kept"));
        let a = before.edge(&g, u, v).expect("old edge");
        let b = after.edge(&relabelled, nu, nv).expect("new edge");
        assert!((a - b).abs() < 1e-10, "{u}-{v} -> {nu}-{nv}");
    }
}

#[test]
fn star_path_sharing() {
    let g = star(4);
    // deg(centre) = 4, deg(leaf) = 1, no common neighbours: 1 / 4
    for leaf in 1..=4 {
        let ratio = path_sharing(&g, 0, leaf).expect("spoke");
        assert!((ratio - 0.25).abs() < 1e-12);
        assert!((path_sharing(&g, leaf, 0).expect("reverse") - ratio).abs() < 1e-12);
    }
    assert!(path_sharing(&g, 1, 2).is_err(), "leaves are not adjacent");
    assert_eq!(path_sharing_all(&g).num_slots(), 8);
}

// ===========================================================================
// Topology 4: Two components and an isolated node
//
//   0 - 1 - 2    3 - 4    5
// ===========================================================================

#[test]
fn components_and_reachability() {
    let g = build(6, false, &[(0, 1), (1, 2), (3, 4)]);
    let comps: Components = connected_components(&g);
    assert_eq!(comps.count(), 3);
    assert_eq!(comps.count_above(1), 2);
    assert_eq!(comps.sizes(), &[3, 2, 1]);

    assert_eq!(reachable_from(&g, 2).expect("reach"), vec![0, 1, 2]);
    assert_eq!(path_length(&g, 0, 4).expect("unreachable"), 0);
    assert_eq!(shortest_path(&g, 0, 5).expect("unreachable"), None);
}

// ===========================================================================
// Topology 5: Directed cycle
//
//   0 -> 1 -> 2 -> 0
// ===========================================================================

#[test]
fn directed_cycle_follows_arcs() {
    let g = build(3, true, &[(0, 1), (1, 2), (2, 0)]);
    assert_eq!(path_length(&g, 0, 2).expect("0 -> 2"), 2);
    assert_eq!(path_length(&g, 2, 0).expect("2 -> 0"), 1);
    assert_eq!(shortest_path(&g, 1, 0).expect("1 -> 0"), Some(vec![1, 2, 0]));

    // Arc 0 -> 1 lies on 0->1, 0->2 and 2->1: 3 ordered pairs.
    let eb = edge_betweenness(&g).expect("betweenness");
    assert!((eb.edge(&g, 0, 1).expect("arc") - 3.0).abs() < 1e-10);
}
