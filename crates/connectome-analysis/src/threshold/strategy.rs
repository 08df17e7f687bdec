//! Edge-removal strategies for the threshold optimizer.
//!
//! A strategy scores every edge once in [`EdgeRemovalStrategy::init`],
//! removes the globally extremal edge on each [`EdgeRemovalStrategy::remove`]
//! and refreshes only the scores the removal can have changed in
//! [`EdgeRemovalStrategy::recalc`]. Ties are broken uniformly at random
//! with the optimizer's seeded generator.

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::trace;

use connectome_core::config::StrategyKind;
use connectome_core::{EdgeArray, EdgeValues, Graph, GraphError};

use crate::centrality::{edge_betweenness, edge_betweenness_cached, edge_betweenness_from};
use crate::centrality::{path_sharing, path_sharing_all, path_sharing_cached};
use crate::traversal::reachable_from;

/// An edge taken out of the working graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemovedEdge {
    pub u: u32,
    pub v: u32,
    pub weight: f32,
    /// Strategy score of the edge when it was picked.
    pub score: f64,
}

/// Chooses and removes one edge per optimizer step.
pub trait EdgeRemovalStrategy {
    fn name(&self) -> &'static str;

    /// Score every edge of `graph`. Called once before the first removal.
    ///
    /// # Errors
    ///
    /// Propagates failures from the underlying metric.
    fn init(&mut self, graph: &mut Graph) -> Result<(), GraphError>;

    /// Remove the extremal edge, or return `None` when no edge is left.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when called before `init`.
    fn remove(
        &mut self,
        graph: &mut Graph,
        rng: &mut StdRng,
    ) -> Result<Option<RemovedEdge>, GraphError>;

    /// Refresh the scores affected by `removed`.
    ///
    /// # Errors
    ///
    /// Propagates failures from the underlying metric.
    fn recalc(&mut self, graph: &mut Graph, removed: &RemovedEdge) -> Result<(), GraphError>;

    /// Release anything registered on `graph`.
    fn finish(&mut self, _graph: &mut Graph) {}
}

impl<S: EdgeRemovalStrategy + ?Sized> EdgeRemovalStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        (**self).init(graph)
    }

    fn remove(
        &mut self,
        graph: &mut Graph,
        rng: &mut StdRng,
    ) -> Result<Option<RemovedEdge>, GraphError> {
        (**self).remove(graph, rng)
    }

    fn recalc(&mut self, graph: &mut Graph, removed: &RemovedEdge) -> Result<(), GraphError> {
        (**self).recalc(graph, removed)
    }

    fn finish(&mut self, graph: &mut Graph) {
        (**self).finish(graph);
    }
}

/// The strategy selected by `kind`.
#[must_use]
pub fn strategy_for(kind: StrategyKind) -> Box<dyn EdgeRemovalStrategy> {
    match kind {
        StrategyKind::EdgeBetweenness => Box::new(EdgeBetweennessStrategy::default()),
        StrategyKind::PathSharing => Box::new(PathSharingStrategy::default()),
        StrategyKind::Weight => Box::new(WeightStrategy),
    }
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

const TIE_TOLERANCE: f64 = 1e-9;

/// Pick one of the edges whose score is extremal, ties uniformly at random.
/// Undirected edges are considered once, from their smaller endpoint.
///
/// NaN scores lose to every comparable score; once only NaN scores remain
/// they all tie.
fn pick_extremal(
    graph: &Graph,
    score: impl Fn(u32, usize) -> f64,
    extreme: Extreme,
    rng: &mut StdRng,
) -> Option<(u32, u32, f64)> {
    let directed = graph.is_directed();
    let score = &score;
    let slots = move || {
        graph.nodes().flat_map(move |u| {
            graph
                .neighbours(u)
                .iter()
                .enumerate()
                .filter(move |&(_, &v)| directed || u < v)
                .map(move |(idx, &v)| (u, v, score(u, idx)))
        })
    };

    let best = slots()
        .map(|(_, _, s)| s)
        .filter(|s| !s.is_nan())
        .reduce(|a, b| match extreme {
            Extreme::Max => a.max(b),
            Extreme::Min => a.min(b),
        });

    let candidates: Vec<(u32, u32, f64)> = match best {
        Some(best) => {
            let tolerance = TIE_TOLERANCE * best.abs().max(1.0);
            slots()
                .filter(|&(_, _, s)| s.total_cmp(&best).is_eq() || (s - best).abs() <= tolerance)
                .collect()
        }
        None => slots().collect(),
    };
    if candidates.is_empty() {
        return None;
    }
    let chosen = candidates[rng.gen_range(0..candidates.len())];
    trace!(ties = candidates.len(), u = chosen.0, v = chosen.1, "picked edge");
    Some(chosen)
}

fn not_initialised(name: &str) -> GraphError {
    GraphError::InvalidArgument(format!("{name} strategy used before init"))
}

fn take_edge(graph: &mut Graph, (u, v, score): (u32, u32, f64)) -> Result<RemovedEdge, GraphError> {
    let weight = graph
        .weight(u, v)
        .ok_or(GraphError::EdgeNotFound { u, v })?;
    graph.remove_edge(u, v)?;
    Ok(RemovedEdge {
        u,
        v,
        weight,
        score,
    })
}

// ---------------------------------------------------------------------------
// Edge betweenness
// ---------------------------------------------------------------------------

/// Removes the edge with the highest edge betweenness.
///
/// On undirected graphs a removal only changes betweenness inside the
/// component(s) holding its endpoints, so only those are recomputed.
#[derive(Debug, Default)]
pub struct EdgeBetweennessStrategy {
    values: Option<EdgeArray<f64>>,
}

impl EdgeBetweennessStrategy {
    fn recompute_components(
        graph: &Graph,
        values: &EdgeArray<f64>,
        removed: &RemovedEdge,
    ) -> Result<(), GraphError> {
        let mut affected = reachable_from(graph, removed.u)?;
        if affected.binary_search(&removed.v).is_err() {
            affected.extend(reachable_from(graph, removed.v)?);
        }

        let mut scratch = EdgeValues::for_graph(graph, 0.0_f64);
        for &source in &affected {
            edge_betweenness_from(graph, source, &mut scratch)?;
        }

        let mut stored = values.values_mut();
        for &node in &affected {
            for (slot, value) in stored.node_mut(node).iter_mut().zip(scratch.node(node)) {
                *slot = value * 0.5;
            }
        }
        trace!(nodes = affected.len(), "betweenness refreshed");
        Ok(())
    }
}

impl EdgeRemovalStrategy for EdgeBetweennessStrategy {
    fn name(&self) -> &'static str {
        "edge-betweenness"
    }

    fn init(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        let initial = edge_betweenness_cached(graph)?;
        let array = EdgeArray::attach(graph, 0.0);
        array.replace(initial);
        self.values = Some(array);
        Ok(())
    }

    fn remove(
        &mut self,
        graph: &mut Graph,
        rng: &mut StdRng,
    ) -> Result<Option<RemovedEdge>, GraphError> {
        let values = self.values.as_ref().ok_or_else(|| not_initialised(self.name()))?;
        let picked = {
            let stored = values.values();
            pick_extremal(graph, |u, idx| stored.node(u)[idx], Extreme::Max, rng)
        };
        picked.map(|edge| take_edge(graph, edge)).transpose()
    }

    fn recalc(&mut self, graph: &mut Graph, removed: &RemovedEdge) -> Result<(), GraphError> {
        let values = self.values.as_ref().ok_or_else(|| not_initialised(self.name()))?;
        if graph.is_directed() {
            values.replace(edge_betweenness(graph)?);
            return Ok(());
        }
        Self::recompute_components(graph, values, removed)
    }

    fn finish(&mut self, graph: &mut Graph) {
        if let Some(values) = self.values.take() {
            values.detach(graph);
        }
    }
}

// ---------------------------------------------------------------------------
// Path sharing
// ---------------------------------------------------------------------------

/// Removes the edge with the lowest path-sharing ratio.
///
/// On undirected graphs a removal only changes the ratio of edges incident
/// to its endpoints.
#[derive(Debug, Default)]
pub struct PathSharingStrategy {
    values: Option<EdgeArray<f64>>,
}

impl EdgeRemovalStrategy for PathSharingStrategy {
    fn name(&self) -> &'static str {
        "path-sharing"
    }

    fn init(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        let initial = path_sharing_cached(graph)?;
        let array = EdgeArray::attach(graph, 0.0);
        array.replace(initial);
        self.values = Some(array);
        Ok(())
    }

    fn remove(
        &mut self,
        graph: &mut Graph,
        rng: &mut StdRng,
    ) -> Result<Option<RemovedEdge>, GraphError> {
        let values = self.values.as_ref().ok_or_else(|| not_initialised(self.name()))?;
        let picked = {
            let stored = values.values();
            pick_extremal(graph, |u, idx| stored.node(u)[idx], Extreme::Min, rng)
        };
        picked.map(|edge| take_edge(graph, edge)).transpose()
    }

    fn recalc(&mut self, graph: &mut Graph, removed: &RemovedEdge) -> Result<(), GraphError> {
        let values = self.values.as_ref().ok_or_else(|| not_initialised(self.name()))?;
        if graph.is_directed() {
            values.replace(path_sharing_all(graph));
            return Ok(());
        }

        let mut stored = values.values_mut();
        for endpoint in [removed.u, removed.v] {
            for (idx, &other) in graph.neighbours(endpoint).iter().enumerate() {
                let ratio = path_sharing(graph, endpoint, other)?;
                stored.set(endpoint, idx, ratio);
                if let Some(back) = graph.neighbour_index(other, endpoint) {
                    stored.set(other, back, ratio);
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, graph: &mut Graph) {
        if let Some(values) = self.values.take() {
            values.detach(graph);
        }
    }
}

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

/// Removes the lightest edge. Weights never change, so there is nothing to
/// recalculate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightStrategy;

impl EdgeRemovalStrategy for WeightStrategy {
    fn name(&self) -> &'static str {
        "weight"
    }

    fn init(&mut self, _graph: &mut Graph) -> Result<(), GraphError> {
        Ok(())
    }

    fn remove(
        &mut self,
        graph: &mut Graph,
        rng: &mut StdRng,
    ) -> Result<Option<RemovedEdge>, GraphError> {
        let picked = pick_extremal(
            graph,
            |u, idx| f64::from(graph.weights(u)[idx]),
            Extreme::Min,
            rng,
        );
        picked.map(|edge| take_edge(graph, edge)).transpose()
    }

    fn recalc(&mut self, _graph: &mut Graph, _removed: &RemovedEdge) -> Result<(), GraphError> {
        Ok(())
    }
}
