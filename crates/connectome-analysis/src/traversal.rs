//! Breadth-first traversal engine.
//!
//! # Overview
//!
//! Every statistic in this crate is a [`BfsVisitor`] driven by [`bfs`].
//! The engine works one level at a time: [`expand`] turns the current
//! frontier into the next one, reporting each edge that reaches a node not
//! seen in an earlier level, and [`bfs`] calls it repeatedly, reporting
//! each completed level.
//!
//! # Ordering
//!
//! Discovery order is non-decreasing in distance from the nearest root.
//! Within a level, frontier nodes are expanded in frontier order and their
//! neighbours in ascending id order, so ties resolve toward smaller ids
//! reachable through earlier-discovered parents. No node is expanded twice.
//!
//! # Early termination
//!
//! A visitor callback returning [`ControlFlow::Break`] stops the traversal
//! immediately, even mid-level. The visited set is always consistent at
//! that point: the child whose callback broke is left unmarked. Stopping is
//! not an error; [`BfsOutcome::stopped`] reports it.

use std::ops::ControlFlow;

use fixedbitset::FixedBitSet;

use connectome_core::{Graph, GraphError};

/// Callbacks invoked by [`expand`] and [`bfs`]. Both default to continuing.
pub trait BfsVisitor {
    /// Called for every edge `parent -> child` where `child` was not visited
    /// in an earlier level. `already_discovered` is true when an earlier
    /// parent in the same level reached `child` first.
    fn edge(&mut self, _parent: u32, _child: u32, _already_discovered: bool) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after level `depth` (>= 1) is complete, with its nodes.
    fn level(&mut self, _depth: u32, _frontier: &[u32]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// A visitor that observes nothing.
impl BfsVisitor for () {}

/// Summary of a [`bfs`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfsOutcome {
    /// Deepest completed level (0 when nothing beyond the roots was found).
    pub depth: u32,
    /// Number of nodes marked visited, roots included. Nodes pre-marked by
    /// a subgraph mask are not counted.
    pub visited: usize,
    /// True when a visitor callback requested termination.
    pub stopped: bool,
}

/// Expand one BFS level.
///
/// `visited` must contain every node seen in earlier levels; newly
/// discovered children are added to it. Returns the next frontier, or
/// `Break` when the visitor stopped the expansion.
pub fn expand<V: BfsVisitor + ?Sized>(
    graph: &Graph,
    frontier: &[u32],
    visited: &mut FixedBitSet,
    visitor: &mut V,
) -> ControlFlow<(), Vec<u32>> {
    let mut discovered = FixedBitSet::with_capacity(graph.num_nodes());
    let mut next = Vec::new();
    expand_into(graph, frontier, visited, &mut discovered, visitor, &mut next)?;
    ControlFlow::Continue(next)
}

fn expand_into<V: BfsVisitor + ?Sized>(
    graph: &Graph,
    frontier: &[u32],
    visited: &mut FixedBitSet,
    discovered: &mut FixedBitSet,
    visitor: &mut V,
    next: &mut Vec<u32>,
) -> ControlFlow<()> {
    for &parent in frontier {
        for &child in graph.neighbours(parent) {
            let c = child as usize;
            let already = discovered.contains(c);
            if visited.contains(c) && !already {
                continue;
            }
            visitor.edge(parent, child, already)?;
            if !already {
                visited.insert(c);
                discovered.insert(c);
                next.push(child);
            }
        }
    }
    ControlFlow::Continue(())
}

/// Breadth-first search from `roots`.
///
/// When `subgraph` is given, nodes outside it are treated as already
/// visited, confining the search to the subgraph.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown root,
/// [`GraphError::InvalidArgument`] when the subgraph mask is shorter than
/// the node count.
pub fn bfs<V: BfsVisitor + ?Sized>(
    graph: &Graph,
    roots: &[u32],
    subgraph: Option<&FixedBitSet>,
    visitor: &mut V,
) -> Result<BfsOutcome, GraphError> {
    let n = graph.num_nodes();
    for &root in roots {
        graph.check_node(root)?;
    }

    let mut visited = FixedBitSet::with_capacity(n);
    if let Some(mask) = subgraph {
        if mask.len() < n {
            return Err(GraphError::InvalidArgument(format!(
                "subgraph mask covers {} of {n} nodes",
                mask.len()
            )));
        }
        for node in 0..n {
            if !mask.contains(node) {
                visited.insert(node);
            }
        }
    }

    let mut frontier = Vec::with_capacity(roots.len());
    let mut outcome = BfsOutcome {
        depth: 0,
        visited: 0,
        stopped: false,
    };
    for &root in roots {
        if !frontier.contains(&root) {
            visited.insert(root as usize);
            frontier.push(root);
        }
    }
    outcome.visited = frontier.len();

    let mut discovered = FixedBitSet::with_capacity(n);
    let mut next = Vec::new();
    while !frontier.is_empty() {
        next.clear();
        let flow = expand_into(
            graph,
            &frontier,
            &mut visited,
            &mut discovered,
            visitor,
            &mut next,
        );
        for &node in &next {
            discovered.set(node as usize, false);
        }
        if flow.is_break() {
            outcome.stopped = true;
            outcome.visited += next.len();
            return Ok(outcome);
        }
        if next.is_empty() {
            break;
        }

        outcome.depth += 1;
        outcome.visited += next.len();
        if visitor.level(outcome.depth, &next).is_break() {
            outcome.stopped = true;
            return Ok(outcome);
        }
        std::mem::swap(&mut frontier, &mut next);
    }

    Ok(outcome)
}

/// Nodes reachable from `node` (including itself), ascending.
///
/// Follows out-edges, so on undirected graphs this is `node`'s connected
/// component.
///
/// # Errors
///
/// [`GraphError::NodeOutOfRange`] for an unknown node.
pub fn reachable_from(graph: &Graph, node: u32) -> Result<Vec<u32>, GraphError> {
    struct Collect(Vec<u32>);

    impl BfsVisitor for Collect {
        fn level(&mut self, _depth: u32, frontier: &[u32]) -> ControlFlow<()> {
            self.0.extend_from_slice(frontier);
            ControlFlow::Continue(())
        }
    }

    let mut collect = Collect(vec![node]);
    bfs(graph, &[node], None, &mut collect)?;
    collect.0.sort_unstable();
    Ok(collect.0)
}
