//! Derived statistics cache.
//!
//! # Overview
//!
//! A manual memoization table for expensive graph statistics, keyed by
//! `(MetricKind, Granularity)`. Each entry holds values for one metric at
//! one granularity: per node, per ordered node pair, per adjacency slot, or
//! a single whole-graph scalar. Entries are created on first write and read
//! back by later queries.
//!
//! The cache lives in its graph's extension table (see
//! [`Graph::stats_mut`] and [`Graph::with_stats`]) and is dropped with it.
//! [`Graph::copy`] never carries it across, so each graph instance computes
//! its own statistics.
//!
//! # Staleness contract
//!
//! Mutating the graph does **not** invalidate anything. Callers that mutate
//! a graph after caching must re-register ([`DerivedStatsCache::remove`],
//! [`DerivedStatsCache::clear`] or [`Graph::clear_stats`]) before trusting
//! the cache again. Every entry stamps the graph [`Graph::generation`] it
//! was last written at, so callers can opt in to a check with
//! [`DerivedStatsCache::is_current`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::GraphError;
use crate::graph::{EdgeValues, Graph};

/// Which statistic an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Degree,
    NumPaths,
    PathLength,
    Clustering,
    Efficiency,
    EdgeBetweenness,
    PathSharing,
    Components,
    Density,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Degree => "degree",
            Self::NumPaths => "num-paths",
            Self::PathLength => "path-length",
            Self::Clustering => "clustering",
            Self::Efficiency => "efficiency",
            Self::EdgeBetweenness => "edge-betweenness",
            Self::PathSharing => "path-sharing",
            Self::Components => "components",
            Self::Density => "density",
        };
        f.write_str(name)
    }
}

/// What a single cached value is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    Node,
    Pair,
    Edge,
    Graph,
}

#[derive(Debug, Clone, PartialEq)]
enum Values {
    Node(Vec<Option<f64>>),
    /// One lazily allocated row per source node.
    Pair(Vec<Option<Vec<f64>>>),
    Edge(EdgeValues<Option<f64>>),
    Graph(Option<f64>),
}

impl Values {
    fn empty(granularity: Granularity, graph: &Graph) -> Self {
        match granularity {
            Granularity::Node => Self::Node(vec![None; graph.num_nodes()]),
            Granularity::Pair => Self::Pair(vec![None; graph.num_nodes()]),
            Granularity::Edge => Self::Edge(EdgeValues::for_graph(graph, None)),
            Granularity::Graph => Self::Graph(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    values: Values,
    generation: u64,
}

/// Memoized statistics for a single graph instance.
#[derive(Debug, Clone, Default)]
pub struct DerivedStatsCache {
    entries: BTreeMap<(MetricKind, Granularity), Entry>,
}

impl DerivedStatsCache {
    /// Register an empty slot for `kind` at `granularity`, sized from
    /// `graph`. Returns false when the slot already exists.
    pub fn add(&mut self, graph: &Graph, kind: MetricKind, granularity: Granularity) -> bool {
        if self.entries.contains_key(&(kind, granularity)) {
            return false;
        }
        trace!(%kind, ?granularity, "registering cache slot");
        self.entries.insert(
            (kind, granularity),
            Entry {
                values: Values::empty(granularity, graph),
                generation: graph.generation(),
            },
        );
        true
    }

    #[must_use]
    pub fn contains(&self, kind: MetricKind, granularity: Granularity) -> bool {
        self.entries.contains_key(&(kind, granularity))
    }

    /// Drop one slot. Returns false when it was not registered.
    pub fn remove(&mut self, kind: MetricKind, granularity: Granularity) -> bool {
        self.entries.remove(&(kind, granularity)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the slot exists and was last written at `graph`'s current
    /// generation.
    #[must_use]
    pub fn is_current(&self, kind: MetricKind, granularity: Granularity, graph: &Graph) -> bool {
        self.entries
            .get(&(kind, granularity))
            .is_some_and(|entry| entry.generation == graph.generation())
    }

    fn entry_mut(&mut self, graph: &Graph, kind: MetricKind, granularity: Granularity) -> &mut Entry {
        let entry = self
            .entries
            .entry((kind, granularity))
            .or_insert_with(|| Entry {
                values: Values::empty(granularity, graph),
                generation: graph.generation(),
            });
        entry.generation = graph.generation();
        entry
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store a per-node value.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for unknown nodes.
    pub fn update_node(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        node: u32,
        value: f64,
    ) -> Result<(), GraphError> {
        graph.check_node(node)?;
        if let Values::Node(values) = &mut self.entry_mut(graph, kind, Granularity::Node).values {
            values[node as usize] = Some(value);
        }
        Ok(())
    }

    /// Store every per-node value at once.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when `values` is not one per node.
    pub fn update_nodes(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        values: &[f64],
    ) -> Result<(), GraphError> {
        if values.len() != graph.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "{kind}: {} node values for {} nodes",
                values.len(),
                graph.num_nodes()
            )));
        }
        self.entry_mut(graph, kind, Granularity::Node).values =
            Values::Node(values.iter().copied().map(Some).collect());
        Ok(())
    }

    /// Store the value for the ordered pair `(u, v)`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for unknown nodes.
    pub fn update_pair(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        u: u32,
        v: u32,
        value: f64,
    ) -> Result<(), GraphError> {
        graph.check_node(u)?;
        graph.check_node(v)?;
        let n = graph.num_nodes();
        if let Values::Pair(rows) = &mut self.entry_mut(graph, kind, Granularity::Pair).values {
            let row = rows[u as usize].get_or_insert_with(|| vec![f64::NAN; n]);
            row[v as usize] = value;
        }
        Ok(())
    }

    /// Store the whole row of pair values with `u` as the first element.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for an unknown `u`,
    /// [`GraphError::InvalidArgument`] when the row is not one per node.
    pub fn update_pair_row(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        u: u32,
        row: &[f64],
    ) -> Result<(), GraphError> {
        graph.check_node(u)?;
        if row.len() != graph.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "{kind}: row of {} values for {} nodes",
                row.len(),
                graph.num_nodes()
            )));
        }
        if let Values::Pair(rows) = &mut self.entry_mut(graph, kind, Granularity::Pair).values {
            rows[u as usize] = Some(row.to_vec());
        }
        Ok(())
    }

    /// Store the value of adjacency slot `idx` of node `u`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for an unknown node,
    /// [`GraphError::InvalidArgument`] for a slot past the node's degree.
    pub fn update_edge(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        u: u32,
        idx: usize,
        value: f64,
    ) -> Result<(), GraphError> {
        graph.check_node(u)?;
        if let Values::Edge(values) = &mut self.entry_mut(graph, kind, Granularity::Edge).values {
            if !values.set(u, idx, Some(value)) {
                return Err(GraphError::InvalidArgument(format!(
                    "{kind}: node {u} has no adjacency slot {idx}"
                )));
            }
        }
        Ok(())
    }

    /// Store a full set of edge values computed against `graph`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when `values` is not shaped like the
    /// graph's adjacency.
    pub fn update_edges(
        &mut self,
        graph: &Graph,
        kind: MetricKind,
        values: &EdgeValues<f64>,
    ) -> Result<(), GraphError> {
        if !values.matches(graph) {
            return Err(GraphError::InvalidArgument(format!(
                "{kind}: edge values do not match the graph's adjacency"
            )));
        }
        self.entry_mut(graph, kind, Granularity::Edge).values =
            Values::Edge(values.map(|value| Some(*value)));
        Ok(())
    }

    /// Store a whole-graph scalar.
    pub fn update_graph(&mut self, graph: &Graph, kind: MetricKind, value: f64) {
        self.entry_mut(graph, kind, Granularity::Graph).values = Values::Graph(Some(value));
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn node(&self, kind: MetricKind, node: u32) -> Option<f64> {
        match &self.entries.get(&(kind, Granularity::Node))?.values {
            Values::Node(values) => values.get(node as usize).copied().flatten(),
            _ => None,
        }
    }

    /// All per-node values, or `None` unless every node has one.
    #[must_use]
    pub fn nodes(&self, kind: MetricKind) -> Option<Vec<f64>> {
        match &self.entries.get(&(kind, Granularity::Node))?.values {
            Values::Node(values) => values.iter().copied().collect(),
            _ => None,
        }
    }

    #[must_use]
    pub fn pair(&self, kind: MetricKind, u: u32, v: u32) -> Option<f64> {
        self.pair_row(kind, u)?
            .get(v as usize)
            .copied()
            .filter(|value| !value.is_nan())
    }

    #[must_use]
    pub fn pair_row(&self, kind: MetricKind, u: u32) -> Option<&[f64]> {
        match &self.entries.get(&(kind, Granularity::Pair))?.values {
            Values::Pair(rows) => rows.get(u as usize)?.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn edge(&self, kind: MetricKind, u: u32, idx: usize) -> Option<f64> {
        match &self.entries.get(&(kind, Granularity::Edge))?.values {
            Values::Edge(values) => values.get(u, idx).copied().flatten(),
            _ => None,
        }
    }

    /// Every edge value, or `None` unless each slot has one.
    #[must_use]
    pub fn edges(&self, kind: MetricKind) -> Option<EdgeValues<f64>> {
        match &self.entries.get(&(kind, Granularity::Edge))?.values {
            Values::Edge(values) => values.try_map(|value| *value),
            _ => None,
        }
    }

    #[must_use]
    pub fn graph_value(&self, kind: MetricKind) -> Option<f64> {
        match &self.entries.get(&(kind, Granularity::Graph))?.values {
            Values::Graph(value) => *value,
            _ => None,
        }
    }
}

impl Graph {
    /// Run `f` with the statistics cache and a shared view of the graph.
    ///
    /// The cache is created on first use. This is the entry point for
    /// writes that need the graph's shape (pair rows, edge slots).
    pub fn with_stats<R>(&mut self, f: impl FnOnce(&mut DerivedStatsCache, &Self) -> R) -> R {
        let mut cache = self
            .extensions_mut()
            .remove::<DerivedStatsCache>()
            .unwrap_or_default();
        let result = f(&mut cache, self);
        self.extensions_mut().insert(cache);
        result
    }
}
