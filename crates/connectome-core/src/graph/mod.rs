//! Weighted adjacency store.
//!
//! # Overview
//!
//! A [`Graph`] has a node count fixed at creation and a mutable edge set.
//! Each node keeps a neighbour list sorted ascending and a weight list
//! aligned index-for-index with it, so adjacency tests are a binary search.
//! Nodes may carry a [`NodeLabel`] (a label value plus coordinates); the
//! graph keeps the sorted set of every label value written.
//!
//! ## Invariants
//!
//! - Neighbour lists are sorted and duplicate-free.
//! - Undirected edges appear in both endpoints' lists.
//! - No self-loops.
//! - `weights(u)[i]` is the weight of the edge to `neighbours(u)[i]`.
//!
//! ## Mutation events
//!
//! [`Graph::add_edge`] and [`Graph::remove_edge`] notify registered
//! [`EdgeListener`]s after the change is committed, reporting the slot
//! indices that were touched. [`EdgeArray`] relies on this to keep
//! per-edge values aligned with adjacency.
//!
//! ## Auxiliary state
//!
//! Modules attach per-graph state through [`Graph::extensions_mut`]. The
//! derived statistics cache lives there (see [`Graph::stats_mut`]). A
//! [`Graph::copy`] never carries listeners or extensions across.

pub mod edge_array;
pub mod events;
pub mod extensions;
pub mod mask;

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cache::DerivedStatsCache;
use crate::error::GraphError;

pub use edge_array::{EdgeArray, EdgeValues};
pub use events::{EdgeChange, EdgeEventKind, EdgeListener, EventBus, ListenerId};
pub use extensions::Extensions;

/// Per-node label: an integer label value and a position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLabel {
    pub value: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NodeLabel {
    #[must_use]
    pub const fn new(value: u32, x: f32, y: f32, z: f32) -> Self {
        Self { value, x, y, z }
    }
}

/// A weighted graph with sorted adjacency lists.
#[derive(Debug)]
pub struct Graph {
    directed: bool,
    num_edges: usize,
    generation: u64,
    neighbours: Vec<Vec<u32>>,
    weights: Vec<Vec<f32>>,
    labels: Vec<Option<NodeLabel>>,
    label_values: BTreeSet<u32>,
    events: EventBus,
    extensions: Extensions,
}

impl Graph {
    /// Create an edgeless graph with `num_nodes` nodes.
    ///
    /// # Panics
    ///
    /// Panics if `num_nodes` exceeds `u32::MAX` or storage cannot be
    /// allocated. Use [`Graph::try_new`] to handle both as errors.
    #[must_use]
    pub fn new(num_nodes: usize, directed: bool) -> Self {
        match Self::try_new(num_nodes, directed) {
            Ok(graph) => graph,
            Err(e) => panic!("cannot create graph with {num_nodes} nodes: {e}"),
        }
    }

    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when node ids would not fit in `u32`,
    /// [`GraphError::Allocation`] when storage cannot be reserved.
    pub fn try_new(num_nodes: usize, directed: bool) -> Result<Self, GraphError> {
        if u32::try_from(num_nodes).is_err() {
            return Err(GraphError::InvalidArgument(format!(
                "{num_nodes} nodes exceeds the u32 id space"
            )));
        }

        let mut neighbours = Vec::new();
        let mut weights = Vec::new();
        let mut labels = Vec::new();
        neighbours.try_reserve_exact(num_nodes)?;
        weights.try_reserve_exact(num_nodes)?;
        labels.try_reserve_exact(num_nodes)?;
        neighbours.resize_with(num_nodes, Vec::new);
        weights.resize_with(num_nodes, Vec::new);
        labels.resize(num_nodes, None);

        Ok(Self {
            directed,
            num_edges: 0,
            generation: 0,
            neighbours,
            weights,
            labels,
            label_values: BTreeSet::new(),
            events: EventBus::default(),
            extensions: Extensions::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Shape
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.neighbours.len()
    }

    /// Number of edges. An undirected edge counts once.
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }

    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Mutation counter, bumped by every successful edge insertion, edge
    /// removal and weight write.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterator over node ids.
    pub fn nodes(&self) -> impl Iterator<Item = u32> + use<> {
        0..self.num_nodes() as u32
    }

    /// Out-degree (degree for undirected graphs). Zero for unknown nodes.
    #[must_use]
    pub fn degree(&self, u: u32) -> usize {
        self.neighbours.get(u as usize).map_or(0, Vec::len)
    }

    /// Sorted neighbours of `u`. Empty for unknown nodes.
    #[must_use]
    pub fn neighbours(&self, u: u32) -> &[u32] {
        match self.neighbours.get(u as usize) {
            Some(list) => list,
            None => &[],
        }
    }

    /// Weights aligned with [`Graph::neighbours`].
    #[must_use]
    pub fn weights(&self, u: u32) -> &[f32] {
        match self.weights.get(u as usize) {
            Some(list) => list,
            None => &[],
        }
    }

    /// Every edge as `(u, v, weight)`. Undirected edges are reported once,
    /// with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        let directed = self.directed;
        self.neighbours
            .iter()
            .zip(&self.weights)
            .enumerate()
            .flat_map(move |(u, (nbrs, ws))| {
                let u = u as u32;
                nbrs.iter()
                    .zip(ws)
                    .filter(move |&(&v, _)| directed || u < v)
                    .map(move |(&v, &w)| (u, v, w))
            })
    }

    // -----------------------------------------------------------------------
    // Adjacency queries
    // -----------------------------------------------------------------------

    /// Position of `v` in `u`'s neighbour list.
    #[must_use]
    pub fn neighbour_index(&self, u: u32, v: u32) -> Option<usize> {
        self.neighbours
            .get(u as usize)
            .and_then(|list| list.binary_search(&v).ok())
    }

    #[must_use]
    pub fn are_neighbours(&self, u: u32, v: u32) -> bool {
        self.neighbour_index(u, v).is_some()
    }

    /// Weight of the edge `u -> v`.
    #[must_use]
    pub fn weight(&self, u: u32, v: u32) -> Option<f32> {
        self.neighbour_index(u, v)
            .map(|idx| self.weights[u as usize][idx])
    }

    /// Overwrite the weight of an existing edge (both directions for
    /// undirected graphs).
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for unknown nodes,
    /// [`GraphError::EdgeNotFound`] when the edge does not exist.
    pub fn set_weight(&mut self, u: u32, v: u32, weight: f32) -> Result<(), GraphError> {
        self.check_node(u)?;
        self.check_node(v)?;
        let u_idx = self
            .neighbour_index(u, v)
            .ok_or(GraphError::EdgeNotFound { u, v })?;
        self.weights[u as usize][u_idx] = weight;

        if !self.directed {
            if let Some(v_idx) = self.neighbour_index(v, u) {
                self.weights[v as usize][v_idx] = weight;
            }
        }
        self.generation += 1;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Edge mutation
    // -----------------------------------------------------------------------

    /// Insert the edge `u -> v` (and `v -> u` for undirected graphs).
    ///
    /// Adding an edge that already exists succeeds without changing the
    /// graph or its weight, and fires no event.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] or [`GraphError::SelfLoop`]; the graph
    /// is untouched in both cases.
    pub fn add_edge(&mut self, u: u32, v: u32, weight: f32) -> Result<(), GraphError> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(GraphError::SelfLoop { node: u });
        }

        let u_idx = match self.neighbours[u as usize].binary_search(&v) {
            Ok(_) => return Ok(()),
            Err(idx) => idx,
        };
        let v_idx = (!self.directed).then(|| {
            self.neighbours[v as usize]
                .binary_search(&u)
                .unwrap_or_else(|idx| idx)
        });

        self.neighbours[u as usize].insert(u_idx, v);
        self.weights[u as usize].insert(u_idx, weight);
        if let Some(v_idx) = v_idx {
            self.neighbours[v as usize].insert(v_idx, u);
            self.weights[v as usize].insert(v_idx, weight);
        }
        self.num_edges += 1;
        self.generation += 1;
        trace!(u, v, u_idx, ?v_idx, "edge added");

        self.fire(
            EdgeEventKind::Added,
            &EdgeChange {
                u,
                v,
                u_idx,
                v_idx,
                weight,
            },
        );
        Ok(())
    }

    /// Remove the edge `u -> v` (both directions for undirected graphs).
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for unknown nodes,
    /// [`GraphError::EdgeNotFound`] when the edge does not exist. Neither
    /// has side effects.
    pub fn remove_edge(&mut self, u: u32, v: u32) -> Result<(), GraphError> {
        self.check_node(u)?;
        self.check_node(v)?;
        let u_idx = self
            .neighbour_index(u, v)
            .ok_or(GraphError::EdgeNotFound { u, v })?;
        let v_idx = if self.directed {
            None
        } else {
            self.neighbour_index(v, u)
        };

        self.neighbours[u as usize].remove(u_idx);
        let weight = self.weights[u as usize].remove(u_idx);
        if let Some(v_idx) = v_idx {
            self.neighbours[v as usize].remove(v_idx);
            self.weights[v as usize].remove(v_idx);
        }
        self.num_edges -= 1;
        self.generation += 1;
        trace!(u, v, u_idx, ?v_idx, "edge removed");

        self.fire(
            EdgeEventKind::Removed,
            &EdgeChange {
                u,
                v,
                u_idx,
                v_idx,
                weight,
            },
        );
        Ok(())
    }

    fn fire(&mut self, kind: EdgeEventKind, change: &EdgeChange) {
        if self.events.is_empty() {
            return;
        }
        // Listeners get a shared view of the graph, so the bus is moved out
        // for the duration of the dispatch.
        let mut bus = std::mem::take(&mut self.events);
        bus.fire(kind, self, change);
        self.events = bus;
    }

    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] when `node` is not below the node count.
    pub fn check_node(&self, node: u32) -> Result<(), GraphError> {
        if (node as usize) < self.num_nodes() {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                num_nodes: self.num_nodes(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn register_listener(&mut self, listener: Box<dyn EdgeListener>) -> ListenerId {
        self.events.register(listener)
    }

    pub fn deregister_listener(&mut self, id: ListenerId) -> bool {
        self.events.deregister(id)
    }

    #[must_use]
    pub fn num_listeners(&self) -> usize {
        self.events.len()
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    /// Store `label` on `node` and record its value in the label set.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeOutOfRange`] for unknown nodes.
    pub fn set_label(&mut self, node: u32, label: NodeLabel) -> Result<(), GraphError> {
        self.check_node(node)?;
        self.labels[node as usize] = Some(label);
        self.label_values.insert(label.value);
        Ok(())
    }

    #[must_use]
    pub fn label(&self, node: u32) -> Option<&NodeLabel> {
        self.labels.get(node as usize).and_then(Option::as_ref)
    }

    /// Every label value written so far, ascending and duplicate-free.
    ///
    /// Values are never removed, even when the last node carrying one is
    /// relabelled.
    #[must_use]
    pub const fn label_values(&self) -> &BTreeSet<u32> {
        &self.label_values
    }

    /// Nodes whose label carries `value`.
    ///
    /// # Errors
    ///
    /// [`GraphError::LabelNotFound`] when the value was never written.
    pub fn nodes_with_label(&self, value: u32) -> Result<Vec<u32>, GraphError> {
        if !self.label_values.contains(&value) {
            return Err(GraphError::LabelNotFound(value));
        }
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_some_and(|l| l.value == value))
            .map(|(node, _)| node as u32)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Copying and identity
    // -----------------------------------------------------------------------

    /// Deep copy of labels, adjacency and weights into a fresh graph.
    ///
    /// Listeners and extensions (including cached statistics) are not
    /// copied: the new graph starts with an empty cache.
    ///
    /// # Errors
    ///
    /// [`GraphError::Allocation`] when storage for the copy cannot be
    /// reserved.
    pub fn copy(&self) -> Result<Self, GraphError> {
        let mut copy = Self::try_new(self.num_nodes(), self.directed)?;

        for u in 0..self.num_nodes() {
            copy.neighbours[u].try_reserve_exact(self.neighbours[u].len())?;
            copy.weights[u].try_reserve_exact(self.weights[u].len())?;
            copy.neighbours[u].extend_from_slice(&self.neighbours[u]);
            copy.weights[u].extend_from_slice(&self.weights[u]);
        }
        copy.labels.clone_from(&self.labels);
        copy.label_values.clone_from(&self.label_values);
        copy.num_edges = self.num_edges;

        Ok(copy)
    }

    /// BLAKE3 hash over direction, labels, adjacency and weights, formatted
    /// as `blake3:<hex>`. Listeners, extensions and the generation counter
    /// do not contribute.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.num_nodes() as u64).to_le_bytes());
        hasher.update(&[u8::from(self.directed)]);

        for u in 0..self.num_nodes() {
            match &self.labels[u] {
                Some(label) => {
                    hasher.update(&[1]);
                    hasher.update(&label.value.to_le_bytes());
                    hasher.update(&label.x.to_le_bytes());
                    hasher.update(&label.y.to_le_bytes());
                    hasher.update(&label.z.to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            hasher.update(&(self.neighbours[u].len() as u64).to_le_bytes());
            for (v, w) in self.neighbours[u].iter().zip(&self.weights[u]) {
                hasher.update(&v.to_le_bytes());
                hasher.update(&w.to_le_bytes());
            }
        }

        let mut out = String::from("blake3:");
        for byte in hasher.finalize().as_bytes() {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// True when both graphs have the same direction, labels, adjacency and
    /// weights.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.num_edges == other.num_edges
            && self.neighbours == other.neighbours
            && self.weights == other.weights
            && self.labels == other.labels
            && self.label_values == other.label_values
    }

    // -----------------------------------------------------------------------
    // Extensions and the statistics cache
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The derived statistics cache, if anything has been cached yet.
    #[must_use]
    pub fn stats(&self) -> Option<&DerivedStatsCache> {
        self.extensions.get::<DerivedStatsCache>()
    }

    /// The derived statistics cache, created empty on first use.
    pub fn stats_mut(&mut self) -> &mut DerivedStatsCache {
        self.extensions
            .get_or_insert_with(DerivedStatsCache::default)
    }

    /// Drop every cached statistic for this graph.
    pub fn clear_stats(&mut self) {
        self.extensions.remove::<DerivedStatsCache>();
    }
}
