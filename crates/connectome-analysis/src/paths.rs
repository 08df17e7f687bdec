//! Shortest-path statistics built on the traversal engine.
//!
//! - [`path_length`] / [`shortest_path`]: BFS from the source that stops the
//!   moment the target is discovered.
//! - [`path_counts`] / [`num_paths`]: number of shortest paths from a root
//!   to every node.
//! - [`level_stack`]: the BFS layers around a root, used by edge
//!   betweenness.
//! - [`distances`]: hop distance from a root to every node.
//!
//! Weights are ignored; every edge has length 1.

use std::ops::ControlFlow;

use tracing::trace;

use connectome_core::{Graph, GraphError, MetricKind};

use crate::traversal::{BfsVisitor, bfs};

// ---------------------------------------------------------------------------
// Path length and reconstruction
// ---------------------------------------------------------------------------

/// Records the first parent of every discovered node, one vector per level,
/// and stops as soon as the target turns up.
struct ParentTrail {
    target: u32,
    levels: Vec<Vec<(u32, u32)>>,
    current: Vec<(u32, u32)>,
    found: bool,
}

impl BfsVisitor for ParentTrail {
    fn edge(&mut self, parent: u32, child: u32, already: bool) -> ControlFlow<()> {
        if already {
            return ControlFlow::Continue(());
        }
        self.current.push((child, parent));
        if child == self.target {
            self.found = true;
            self.levels.push(std::mem::take(&mut self.current));
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn level(&mut self, _depth: u32, _frontier: &[u32]) -> ControlFlow<()> {
        self.levels.push(std::mem::take(&mut self.current));
        ControlFlow::Continue(())
    }
}

fn trail(graph: &Graph, u: u32, v: u32) -> Result<Option<ParentTrail>, GraphError> {
    graph.check_node(v)?;
    let mut trail = ParentTrail {
        target: v,
        levels: Vec::new(),
        current: Vec::new(),
        found: false,
    };
    bfs(graph, &[u], None, &mut trail)?;
    Ok(trail.found.then_some(trail))
}

/// Hop distance from `u` to `v`. Returns 0 when `v` is unreachable or
/// `u == v`.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for unknown nodes.
pub fn path_length(graph: &Graph, u: u32, v: u32) -> Result<u32, GraphError> {
    if u == v {
        graph.check_node(u)?;
        return Ok(0);
    }
    Ok(trail(graph, u, v)?.map_or(0, |t| t.levels.len() as u32))
}

/// One shortest path from `u` to `v`, both endpoints included.
///
/// Among equally short paths, each step back from `v` follows the parent
/// that discovered the node first. Returns `None` when `v` is unreachable.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for unknown nodes.
pub fn shortest_path(graph: &Graph, u: u32, v: u32) -> Result<Option<Vec<u32>>, GraphError> {
    if u == v {
        graph.check_node(u)?;
        return Ok(Some(vec![u]));
    }
    let Some(trail) = trail(graph, u, v)? else {
        return Ok(None);
    };

    let mut path = vec![v];
    let mut node = v;
    for level in trail.levels.iter().rev() {
        let Some(&(_, parent)) = level.iter().find(|(child, _)| *child == node) else {
            break;
        };
        path.push(parent);
        node = parent;
    }
    path.reverse();
    trace!(u, v, hops = path.len() - 1, "shortest path reconstructed");
    Ok(Some(path))
}

// ---------------------------------------------------------------------------
// Level stack
// ---------------------------------------------------------------------------

/// BFS layers around a root. Layer 0 is `[root]`; the last layer holds the
/// farthest nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStack {
    layers: Vec<Vec<u32>>,
}

impl LevelStack {
    #[must_use]
    pub fn layers(&self) -> &[Vec<u32>] {
        &self.layers
    }

    /// Layers from the farthest down to the root.
    pub fn top_down(&self) -> impl Iterator<Item = &[u32]> {
        self.layers.iter().rev().map(Vec::as_slice)
    }

    /// Distance of the farthest layer.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.layers.len().saturating_sub(1) as u32
    }

    /// Number of nodes across all layers.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}

struct Layers(Vec<Vec<u32>>);

impl BfsVisitor for Layers {
    fn level(&mut self, _depth: u32, frontier: &[u32]) -> ControlFlow<()> {
        self.0.push(frontier.to_vec());
        ControlFlow::Continue(())
    }
}

/// BFS layers around `root`.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown root.
pub fn level_stack(graph: &Graph, root: u32) -> Result<LevelStack, GraphError> {
    let mut layers = Layers(vec![vec![root]]);
    bfs(graph, &[root], None, &mut layers)?;
    Ok(LevelStack { layers: layers.0 })
}

// ---------------------------------------------------------------------------
// Path counts
// ---------------------------------------------------------------------------

/// Shortest-path counts from a single root.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCounts {
    pub root: u32,
    /// `counts[n]`: number of shortest paths from the root to `n` (1 for the
    /// root, 0 for unreachable nodes).
    pub counts: Vec<f64>,
    /// `depth[n]`: hop distance from the root, `None` when unreachable.
    pub depth: Vec<Option<u32>>,
    pub levels: LevelStack,
}

impl PathCounts {
    /// Sum of counts over every visited node, the root included.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

struct CountVisitor {
    counts: Vec<f64>,
    depth: Vec<Option<u32>>,
    layers: Vec<Vec<u32>>,
}

impl BfsVisitor for CountVisitor {
    fn edge(&mut self, parent: u32, child: u32, already: bool) -> ControlFlow<()> {
        let (p, c) = (parent as usize, child as usize);
        self.counts[c] += self.counts[p];
        if !already {
            self.depth[c] = self.depth[p].map(|d| d + 1);
        }
        ControlFlow::Continue(())
    }

    fn level(&mut self, _depth: u32, frontier: &[u32]) -> ControlFlow<()> {
        self.layers.push(frontier.to_vec());
        ControlFlow::Continue(())
    }
}

/// Number of shortest paths from `root` to every node.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown root.
pub fn path_counts(graph: &Graph, root: u32) -> Result<PathCounts, GraphError> {
    graph.check_node(root)?;
    let n = graph.num_nodes();
    let mut visitor = CountVisitor {
        counts: vec![0.0; n],
        depth: vec![None; n],
        layers: vec![vec![root]],
    };
    visitor.counts[root as usize] = 1.0;
    visitor.depth[root as usize] = Some(0);

    bfs(graph, &[root], None, &mut visitor)?;

    Ok(PathCounts {
        root,
        counts: visitor.counts,
        depth: visitor.depth,
        levels: LevelStack {
            layers: visitor.layers,
        },
    })
}

/// Total number of shortest paths from `root`, caching the per-target
/// counts (pair granularity, row `root`) and the total (node granularity).
///
/// A cached total is returned as is; see the staleness contract on
/// [`connectome_core::DerivedStatsCache`].
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown root.
pub fn num_paths(graph: &mut Graph, root: u32) -> Result<f64, GraphError> {
    if let Some(total) = graph
        .stats()
        .and_then(|cache| cache.node(MetricKind::NumPaths, root))
    {
        return Ok(total);
    }

    let counts = path_counts(graph, root)?;
    let total = counts.total();
    graph.with_stats(|cache, g| {
        cache.update_pair_row(g, MetricKind::NumPaths, root, &counts.counts)?;
        cache.update_node(g, MetricKind::NumPaths, root, total)
    })?;
    Ok(total)
}

// ---------------------------------------------------------------------------
// Distances
// ---------------------------------------------------------------------------

struct DistanceVisitor(Vec<Option<u32>>);

impl BfsVisitor for DistanceVisitor {
    fn level(&mut self, depth: u32, frontier: &[u32]) -> ControlFlow<()> {
        for &node in frontier {
            self.0[node as usize] = Some(depth);
        }
        ControlFlow::Continue(())
    }
}

/// Hop distance from `root` to every node, `None` when unreachable.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown root.
pub fn distances(graph: &Graph, root: u32) -> Result<Vec<Option<u32>>, GraphError> {
    graph.check_node(root)?;
    let mut visitor = DistanceVisitor(vec![None; graph.num_nodes()]);
    visitor.0[root as usize] = Some(0);
    bfs(graph, &[root], None, &mut visitor)?;
    Ok(visitor.0)
}
