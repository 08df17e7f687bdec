//! Iterative edge removal ("thresholding") and divisive community
//! detection.
//!
//! # Overview
//!
//! [`ThresholdOptimizer`] repeatedly asks an [`EdgeRemovalStrategy`] to
//! remove one edge and refresh its scores:
//!
//! ```text
//! strategy.init(work)
//! loop {
//!     edge = strategy.remove(work, rng)   // None: no edges left
//!     if done(edge) { break }
//!     strategy.recalc(work, edge)
//! }
//! strategy.finish(work)
//! ```
//!
//! Three modes decide when to stop:
//!
//! - [`ThresholdOptimizer::remove_edges`]: exactly `count` removals.
//! - [`ThresholdOptimizer::remove_until_components`]: until the graph splits
//!   into at least `target` components.
//! - [`ThresholdOptimizer::maximise_score`]: up to `edge_limit` removals,
//!   keeping the component partition that scored best against the input.
//!
//! Every mode works on a private copy; the input is only borrowed.

pub mod strategy;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use connectome_core::config::{OptimizerConfig, ScoreKind};
use connectome_core::{Graph, GraphError};

use crate::stats::{connected_components, score_partition};

pub use strategy::{
    EdgeBetweennessStrategy, EdgeRemovalStrategy, PathSharingStrategy, RemovedEdge,
    WeightStrategy, strategy_for,
};

/// One removal step of [`ThresholdOptimizer::maximise_score`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DivisiveStep {
    /// Number of edges removed so far, this one included.
    pub removed: usize,
    pub edge: RemovedEdge,
    /// Score of the component partition after the removal.
    pub score: f64,
    /// Components counted after the removal (above `ignore_size`).
    pub components: usize,
}

/// Result of [`ThresholdOptimizer::maximise_score`].
#[derive(Debug)]
pub struct DivisiveResult {
    /// The graph at the best-scoring step.
    pub graph: Graph,
    pub score: f64,
    /// Removals made to reach `graph`.
    pub removed_at_best: usize,
    /// Per-step series, when recording was enabled.
    pub trace: Option<Vec<DivisiveStep>>,
}

/// What the inner loop does after each removal.
enum Step {
    Continue,
    /// Stop without recalculating.
    Done,
}

/// Runs an [`EdgeRemovalStrategy`] against copies of a graph.
pub struct ThresholdOptimizer<S = Box<dyn EdgeRemovalStrategy>> {
    strategy: S,
    rng: StdRng,
    ignore_size: usize,
    record_trace: bool,
}

impl ThresholdOptimizer {
    /// Optimizer with the strategy, seed and counting options of `config`.
    #[must_use]
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(strategy_for(config.strategy), config.seed)
            .ignore_size(config.ignore_size)
            .record_trace(config.record_trace)
    }
}

impl<S: EdgeRemovalStrategy> ThresholdOptimizer<S> {
    pub fn new(strategy: S, seed: u64) -> Self {
        Self {
            strategy,
            rng: StdRng::seed_from_u64(seed),
            ignore_size: 0,
            record_trace: false,
        }
    }

    /// Components with at most `size` nodes are not counted.
    #[must_use]
    pub const fn ignore_size(mut self, size: usize) -> Self {
        self.ignore_size = size;
        self
    }

    #[must_use]
    pub const fn record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }

    /// Drive the remove/recalc loop on `work` until `after` says stop or the
    /// strategy runs out of edges. The strategy is always finished, so no
    /// listener outlives the call.
    fn drive(
        &mut self,
        work: &mut Graph,
        mut after: impl FnMut(&Graph, &RemovedEdge) -> Result<Step, GraphError>,
    ) -> Result<(), GraphError> {
        let result = self.drive_inner(work, &mut after);
        self.strategy.finish(work);
        work.clear_stats();
        result
    }

    fn drive_inner(
        &mut self,
        work: &mut Graph,
        after: &mut impl FnMut(&Graph, &RemovedEdge) -> Result<Step, GraphError>,
    ) -> Result<(), GraphError> {
        self.strategy.init(work)?;
        while let Some(edge) = self.strategy.remove(work, &mut self.rng)? {
            match after(work, &edge)? {
                Step::Done => break,
                Step::Continue => self.strategy.recalc(work, &edge)?,
            }
        }
        Ok(())
    }

    /// Remove exactly `count` edges from a copy of `input`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when `count` exceeds the edge count;
    /// [`GraphError::RemovalShortfall`] when the strategy stops offering
    /// edges first.
    #[instrument(skip(self, input), fields(strategy = self.strategy.name()))]
    pub fn remove_edges(&mut self, input: &Graph, count: usize) -> Result<Graph, GraphError> {
        if count > input.num_edges() {
            return Err(GraphError::InvalidArgument(format!(
                "cannot remove {count} of {} edges",
                input.num_edges()
            )));
        }
        let mut work = input.copy()?;
        if count == 0 {
            return Ok(work);
        }

        let mut removed = 0;
        self.drive(&mut work, |_, edge| {
            removed += 1;
            debug!(step = removed, u = edge.u, v = edge.v, score = edge.score, "edge removed");
            Ok(if removed == count {
                Step::Done
            } else {
                Step::Continue
            })
        })?;

        if removed != count {
            warn!(requested = count, removed, "strategy stopped before the requested count");
            return Err(GraphError::RemovalShortfall {
                requested: count,
                removed,
            });
        }
        info!(removed, edges = work.num_edges(), "fixed-count removal finished");
        Ok(work)
    }

    /// Remove edges from a copy of `input` until it has at least `target`
    /// components (ignoring those of at most `ignore_size` nodes).
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when `target` is 0 or exceeds the
    /// node count;
    /// [`GraphError::TargetUnreachable`] when the edges run out first.
    #[instrument(skip(self, input, target), fields(strategy = self.strategy.name(), wanted = target))]
    pub fn remove_until_components(
        &mut self,
        input: &Graph,
        target: usize,
    ) -> Result<Graph, GraphError> {
        if target == 0 || target > input.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "component target {target} outside 1..={}",
                input.num_nodes()
            )));
        }
        let ignore = self.ignore_size;
        let initial = connected_components(input).count_above(ignore);
        let mut work = input.copy()?;
        if initial >= target {
            info!(components = initial, "component target already met");
            return Ok(work);
        }

        let mut reached = initial;
        let mut steps = 0_usize;
        self.drive(&mut work, |graph, edge| {
            steps += 1;
            reached = connected_components(graph).count_above(ignore);
            debug!(step = steps, u = edge.u, v = edge.v, components = reached, "edge removed");
            Ok(if reached >= target {
                Step::Done
            } else {
                Step::Continue
            })
        })?;

        if reached < target {
            warn!(wanted = target, reached, "ran out of edges before reaching the component target");
            return Err(GraphError::TargetUnreachable { target, reached });
        }
        info!(removed = steps, components = reached, "component target reached");
        Ok(work)
    }

    /// Divisive community detection: remove up to `edge_limit` edges (all of
    /// them when `None`) from a copy of `input`, scoring the component
    /// partition against `input` after every removal, and return the best.
    ///
    /// The unmodified input is scored first; later steps replace the best
    /// when they score at least as high.
    ///
    /// # Errors
    ///
    /// Propagates strategy and copy failures.
    #[instrument(skip(self, input), fields(strategy = self.strategy.name()))]
    pub fn maximise_score(
        &mut self,
        input: &Graph,
        edge_limit: Option<usize>,
        score: ScoreKind,
    ) -> Result<DivisiveResult, GraphError> {
        let limit = edge_limit.unwrap_or(usize::MAX).min(input.num_edges());
        let ignore = self.ignore_size;

        let mut best_score = score_partition(score, input, connected_components(input).labels())?;
        let mut best = input.copy()?;
        let mut removed_at_best = 0;
        let mut trace = self.record_trace.then(Vec::new);

        let mut work = input.copy()?;
        if limit > 0 {
            let mut removed = 0_usize;
            self.drive(&mut work, |graph, edge| {
                removed += 1;
                let comps = connected_components(graph);
                let current = score_partition(score, input, comps.labels())?;
                let components = comps.count_above(ignore);
                debug!(step = removed, u = edge.u, v = edge.v, score = current, components, "edge removed");

                if let Some(steps) = trace.as_mut() {
                    steps.push(DivisiveStep {
                        removed,
                        edge: *edge,
                        score: current,
                        components,
                    });
                }
                if current >= best_score {
                    best_score = current;
                    best = graph.copy()?;
                    removed_at_best = removed;
                }
                Ok(if removed >= limit {
                    Step::Done
                } else {
                    Step::Continue
                })
            })?;
        }

        info!(score = best_score, removed_at_best, ?score, "divisive clustering finished");
        Ok(DivisiveResult {
            graph: best,
            score: best_score,
            removed_at_best,
            trace,
        })
    }

    /// Run [`Self::maximise_score`] with the limit and score of `config`.
    ///
    /// # Errors
    ///
    /// See [`Self::maximise_score`].
    pub fn maximise_configured(
        &mut self,
        input: &Graph,
        config: &OptimizerConfig,
    ) -> Result<DivisiveResult, GraphError> {
        self.maximise_score(input, config.edge_limit, config.score)
    }
}
