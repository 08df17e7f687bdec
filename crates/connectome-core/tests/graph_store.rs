//! Property tests for the adjacency store invariants.

use connectome_core::graph::{EdgeArray, Graph, NodeLabel};
use proptest::prelude::*;

const NODES: u32 = 12;

#[derive(Debug, Clone)]
enum Op {
    Add(u32, u32, f32),
    Remove(u32, u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NODES, 0..NODES, 0.0_f32..10.0).prop_map(|(u, v, w)| Op::Add(u, v, w)),
        (0..NODES, 0..NODES).prop_map(|(u, v)| Op::Remove(u, v)),
    ]
}

fn apply(g: &mut Graph, op: &Op) {
    // Self-loops and missing edges are expected failures here.
    let _ = match *op {
        Op::Add(u, v, w) => g.add_edge(u, v, w),
        Op::Remove(u, v) => g.remove_edge(u, v),
    };
}

fn assert_sorted_unique(g: &Graph) -> Result<(), TestCaseError> {
    for u in g.nodes() {
        let nbrs = g.neighbours(u);
        prop_assert!(nbrs.windows(2).all(|w| w[0] < w[1]), "node {u}: {nbrs:?}");
        prop_assert!(!nbrs.contains(&u), "self-loop on {u}");
        prop_assert_eq!(nbrs.len(), g.weights(u).len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn adjacency_stays_sorted_and_unique(ops in proptest::collection::vec(arb_op(), 0..80), directed in any::<bool>()) {
        let mut g = Graph::new(NODES as usize, directed);
        for op in &ops {
            apply(&mut g, op);
            assert_sorted_unique(&g)?;
        }
        let listed: usize = g.nodes().map(|u| g.degree(u)).sum();
        let expected = if directed { g.num_edges() } else { 2 * g.num_edges() };
        prop_assert_eq!(listed, expected);
        prop_assert_eq!(g.edges().count(), g.num_edges());
    }

    #[test]
    fn undirected_adjacency_is_symmetric(ops in proptest::collection::vec(arb_op(), 0..80)) {
        let mut g = Graph::new(NODES as usize, false);
        for op in &ops {
            apply(&mut g, op);
        }
        for u in 0..NODES {
            for v in 0..NODES {
                if u != v {
                    prop_assert_eq!(g.are_neighbours(u, v), g.are_neighbours(v, u));
                    prop_assert_eq!(g.weight(u, v), g.weight(v, u));
                }
            }
        }
    }

    #[test]
    fn add_then_remove_restores_graph(
        ops in proptest::collection::vec(arb_op(), 0..60),
        u in 0..NODES,
        v in 0..NODES,
        w in 0.0_f32..10.0,
    ) {
        prop_assume!(u != v);
        let mut g = Graph::new(NODES as usize, false);
        for op in &ops {
            apply(&mut g, op);
        }
        prop_assume!(!g.are_neighbours(u, v));

        let before = g.copy().expect("copy");
        g.add_edge(u, v, w).expect("add");
        prop_assert_eq!(g.num_edges(), before.num_edges() + 1);
        g.remove_edge(u, v).expect("remove");

        prop_assert_eq!(g.num_edges(), before.num_edges());
        prop_assert!(g.same_structure(&before));
    }

    #[test]
    fn edge_array_follows_every_mutation(ops in proptest::collection::vec(arb_op(), 0..80)) {
        let mut g = Graph::new(NODES as usize, false);
        let arr = EdgeArray::attach(&mut g, 0_u32);
        for op in &ops {
            apply(&mut g, op);
            prop_assert!(arr.values().matches(&g));
        }
        arr.detach(&mut g);
        prop_assert_eq!(g.num_listeners(), 0);
    }

    #[test]
    fn copy_round_trips(ops in proptest::collection::vec(arb_op(), 0..60), labels in proptest::collection::vec(0_u32..5, NODES as usize)) {
        let mut g = Graph::new(NODES as usize, false);
        for (node, value) in labels.iter().enumerate() {
            g.set_label(node as u32, NodeLabel::new(*value, node as f32, 0.0, 1.0)).expect("label");
        }
        for op in &ops {
            apply(&mut g, op);
        }

        let c = g.copy().expect("copy");
        for u in g.nodes() {
            prop_assert_eq!(c.neighbours(u), g.neighbours(u));
            prop_assert_eq!(c.weights(u), g.weights(u));
            prop_assert_eq!(c.label(u), g.label(u));
        }
        prop_assert_eq!(c.label_values(), g.label_values());
        prop_assert_eq!(c.content_hash(), g.content_hash());
    }
}
