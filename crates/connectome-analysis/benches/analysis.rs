use connectome_analysis::ThresholdOptimizer;
use connectome_analysis::centrality::edge_betweenness;
use connectome_core::Graph;
use connectome_core::config::{OptimizerConfig, ScoreKind, StrategyKind};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Tier {
    name: &'static str,
    modules: u32,
    module_size: u32,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        modules: 4,
        module_size: 8,
    },
    Tier {
        name: "medium",
        modules: 8,
        module_size: 16,
    },
    Tier {
        name: "large",
        modules: 16,
        module_size: 24,
    },
];

/// Dense modules with sparse links between neighbouring modules.
fn modular_graph(tier: &Tier, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = tier.modules * tier.module_size;
    let mut g = Graph::new(n as usize, false);
    for module in 0..tier.modules {
        let base = module * tier.module_size;
        for a in 0..tier.module_size {
            for b in (a + 1)..tier.module_size {
                if rng.gen_bool(0.5) {
                    let _ = g.add_edge(base + a, base + b, rng.gen_range(0.1..1.0));
                }
            }
        }
        let next = ((module + 1) % tier.modules) * tier.module_size;
        let _ = g.add_edge(base, next + rng.gen_range(0..tier.module_size), 0.05);
    }
    g
}

fn bench_betweenness(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis.betweenness");
    for tier in &TIERS {
        let g = modular_graph(tier, 0xC0DE + u64::from(tier.modules));
        group.throughput(Throughput::Elements(g.num_edges() as u64));
        group.bench_with_input(BenchmarkId::new("edge", tier.name), &g, |b, g| {
            b.iter(|| black_box(edge_betweenness(g)));
        });
    }
    group.finish();
}

fn bench_divisive(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis.divisive");
    group.sample_size(10);
    for tier in &TIERS[..2] {
        let g = modular_graph(tier, 0xBEEF + u64::from(tier.modules));
        let limit = Some(tier.modules as usize * 2);
        for strategy in [StrategyKind::EdgeBetweenness, StrategyKind::PathSharing] {
            let config = OptimizerConfig {
                strategy,
                ..OptimizerConfig::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), tier.name),
                &g,
                |b, g| {
                    b.iter(|| {
                        black_box(
                            ThresholdOptimizer::from_config(&config).maximise_score(
                                g,
                                limit,
                                ScoreKind::Modularity,
                            ),
                        )
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_betweenness, bench_divisive);
criterion_main!(benches);
