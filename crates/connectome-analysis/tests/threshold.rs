//! Threshold optimizer behaviour on hand-built and generated graphs.

use connectome_analysis::ThresholdOptimizer;
use connectome_analysis::stats::{connected_components, modularity};
use connectome_analysis::threshold::{EdgeBetweennessStrategy, PathSharingStrategy, WeightStrategy};
use connectome_core::config::{OptimizerConfig, ScoreKind, StrategyKind};
use connectome_core::{Graph, GraphError};
use proptest::prelude::*;

fn build(n: usize, edges: &[(u32, u32)]) -> Graph {
    let mut g = Graph::new(n, false);
    for &(u, v) in edges {
        g.add_edge(u, v, 1.0).expect("edge");
    }
    g
}

/// Three 4-cliques chained by single bridges: 3 - 4 and 7 - 8.
fn three_cliques() -> Graph {
    let mut edges = Vec::new();
    for base in [0, 4, 8] {
        for a in 0..4 {
            for b in (a + 1)..4 {
                edges.push((base + a, base + b));
            }
        }
    }
    edges.push((3, 4));
    edges.push((7, 8));
    build(12, &edges)
}

fn config(strategy: StrategyKind, seed: u64) -> OptimizerConfig {
    OptimizerConfig {
        strategy,
        seed,
        record_trace: true,
        ..OptimizerConfig::default()
    }
}

#[test]
fn component_target_is_met_and_input_untouched() {
    let g = three_cliques();
    let hash = g.content_hash();
    for kind in [StrategyKind::EdgeBetweenness, StrategyKind::PathSharing] {
        let out = ThresholdOptimizer::from_config(&config(kind, 1))
            .remove_until_components(&g, 3)
            .expect("split");
        assert!(connected_components(&out).count() >= 3, "{kind:?}");
        assert_eq!(out.num_edges(), g.num_edges() - 2, "{kind:?}: only the bridges go");
    }
    assert_eq!(g.content_hash(), hash);
}

#[test]
fn oversized_target_fails_up_front() {
    let g = three_cliques();
    let err = ThresholdOptimizer::from_config(&OptimizerConfig::default())
        .remove_until_components(&g, 13)
        .expect_err("more components than nodes");
    assert!(matches!(err, GraphError::InvalidArgument(_)));
    assert_eq!(err.code().code(), "E1003");
}

#[test]
fn divisive_best_never_drops_below_any_step() {
    let g = three_cliques();
    let result = ThresholdOptimizer::from_config(&config(StrategyKind::EdgeBetweenness, 3))
        .maximise_score(&g, None, ScoreKind::Modularity)
        .expect("divisive");

    let trace = result.trace.as_ref().expect("trace");
    assert_eq!(trace.len(), g.num_edges());
    for step in trace {
        assert!(result.score >= step.score, "step {}", step.removed);
    }

    let labels = connected_components(&result.graph);
    assert_eq!(labels.count(), 3, "the three cliques");
    let rescored = modularity(&g, labels.labels()).expect("rescore");
    assert!((rescored - result.score).abs() < 1e-12);
}

#[test]
fn edge_limit_caps_removals() {
    let g = three_cliques();
    let result = ThresholdOptimizer::from_config(&config(StrategyKind::PathSharing, 5))
        .maximise_score(&g, Some(4), ScoreKind::Chira)
        .expect("divisive");
    assert_eq!(result.trace.as_ref().map(Vec::len), Some(4));
    assert!(result.removed_at_best <= 4);
}

#[test]
fn same_seed_same_removals() {
    let g = three_cliques();
    let run = |seed| {
        ThresholdOptimizer::from_config(&config(StrategyKind::EdgeBetweenness, seed))
            .maximise_score(&g, Some(10), ScoreKind::Modularity)
            .expect("divisive")
            .trace
            .expect("trace")
            .iter()
            .map(|step| (step.edge.u, step.edge.v))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn concrete_strategies_plug_in_directly() {
    let g = three_cliques();
    let a = ThresholdOptimizer::new(EdgeBetweennessStrategy::default(), 9)
        .remove_edges(&g, 2)
        .expect("betweenness");
    let b = ThresholdOptimizer::new(PathSharingStrategy::default(), 9)
        .remove_edges(&g, 2)
        .expect("sharing");
    assert!(a.same_structure(&b), "both take the two bridges");

    let mut weighted = g.copy().expect("copy");
    weighted.set_weight(0, 1, 0.1).expect("weight");
    let c = ThresholdOptimizer::new(WeightStrategy, 9)
        .remove_edges(&weighted, 1)
        .expect("weight");
    assert!(!c.are_neighbours(0, 1));
}

#[test]
fn nan_weight_edges_are_still_removed() {
    let mut g = Graph::new(3, false);
    g.add_edge(0, 1, f32::NAN).expect("0-1");
    g.add_edge(1, 2, 1.0).expect("1-2");

    let out = ThresholdOptimizer::new(WeightStrategy, 1)
        .remove_edges(&g, 2)
        .expect("both edges");
    assert_eq!(out.num_edges(), 0);

    let split = ThresholdOptimizer::new(WeightStrategy, 1)
        .remove_until_components(&g, 3)
        .expect("every node isolated");
    assert_eq!(connected_components(&split).count(), 3);
}

fn arb_graph() -> impl Strategy<Value = Graph> {
    (3_u32..10).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..30).prop_map(move |pairs| {
            let mut g = Graph::new(n as usize, false);
            for (u, v) in pairs {
                if u != v {
                    g.add_edge(u, v, 1.0).expect("edge");
                }
            }
            g
        })
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn component_mode_reaches_target_or_reports(g in arb_graph(), target in 1_usize..10) {
        let before = g.content_hash();
        let result = ThresholdOptimizer::from_config(&OptimizerConfig::default())
            .remove_until_components(&g, target);

        match result {
            Ok(out) => {
                prop_assert!(connected_components(&out).count() >= target);
                prop_assert_eq!(out.num_listeners(), 0);
            }
            Err(GraphError::InvalidArgument(_)) => {
                prop_assert!(target > g.num_nodes());
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
        prop_assert_eq!(g.content_hash(), before);
    }

    #[test]
    fn fixed_count_removes_exactly(g in arb_graph(), frac in 0.0_f64..=1.0) {
        let count = (g.num_edges() as f64 * frac).floor() as usize;
        let out = ThresholdOptimizer::from_config(&OptimizerConfig::default())
            .remove_edges(&g, count)
            .expect("count within range");
        prop_assert_eq!(out.num_edges(), g.num_edges() - count);
    }
}
