//! Connected components.
//!
//! Directed graphs are split into weakly connected components: arc
//! direction is ignored.

use petgraph::unionfind::UnionFind;

use connectome_core::{Graph, GraphError, MetricKind};

/// Component assignment of every node.
///
/// Components are numbered `0..count()` in order of their smallest node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    labels: Vec<u32>,
    sizes: Vec<usize>,
}

impl Components {
    fn from_labels(labels: Vec<u32>) -> Self {
        let mut sizes = Vec::new();
        for &label in &labels {
            let idx = label as usize;
            if idx >= sizes.len() {
                sizes.resize(idx + 1, 0);
            }
            sizes[idx] += 1;
        }
        Self { labels, sizes }
    }

    /// Component label of every node, indexed by node id.
    #[must_use]
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    #[must_use]
    pub fn label(&self, node: u32) -> Option<u32> {
        self.labels.get(node as usize).copied()
    }

    /// Node count of each component, indexed by label.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Number of components with more than `ignore_size` nodes.
    #[must_use]
    pub fn count_above(&self, ignore_size: usize) -> usize {
        self.sizes.iter().filter(|&&size| size > ignore_size).count()
    }

    /// Nodes of component `label`, ascending.
    #[must_use]
    pub fn members(&self, label: u32) -> Vec<u32> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(node, _)| node as u32)
            .collect()
    }

    /// Size of the largest component (0 for an empty graph).
    #[must_use]
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Split the graph into connected components.
#[must_use]
pub fn connected_components(graph: &Graph) -> Components {
    let n = graph.num_nodes();
    let mut uf = UnionFind::<u32>::new(n);
    for (u, v, _) in graph.edges() {
        uf.union(u, v);
    }

    let roots = uf.into_labeling();
    let mut dense = vec![u32::MAX; n];
    let mut next = 0_u32;
    let labels = roots
        .iter()
        .map(|&root| {
            let slot = &mut dense[root as usize];
            if *slot == u32::MAX {
                *slot = next;
                next += 1;
            }
            *slot
        })
        .collect();
    Components::from_labels(labels)
}

/// [`connected_components`], with the labels memoized as node values.
///
/// # Errors
///
/// Only when the cache rejects the write, which cannot happen for labels
/// computed against the same graph.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn components_cached(graph: &mut Graph) -> Result<Components, GraphError> {
    let labels = super::memo_nodes(graph, MetricKind::Components, |g| {
        Ok(connected_components(g)
            .labels()
            .iter()
            .map(|&label| f64::from(label))
            .collect())
    })?;
    Ok(Components::from_labels(
        labels.into_iter().map(|label| label as u32).collect(),
    ))
}

/// Number of components with more than `ignore_size` nodes, through the
/// cache.
///
/// # Errors
///
/// See [`components_cached`].
pub fn num_components_cached(graph: &mut Graph, ignore_size: usize) -> Result<usize, GraphError> {
    Ok(components_cached(graph)?.count_above(ignore_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(n: usize, directed: bool, edges: &[(u32, u32)]) -> Graph {
        let mut g = Graph::new(n, directed);
        for &(u, v) in edges {
            g.add_edge(u, v, 1.0).expect("edge");
        }
        g
    }

    #[test]
    fn labels_follow_smallest_member() {
        let g = build(6, false, &[(4, 5), (0, 3), (1, 2)]);
        let comps = connected_components(&g);
        assert_eq!(comps.labels(), &[0, 1, 1, 0, 2, 2]);
        assert_eq!(comps.sizes(), &[2, 2, 2]);
        assert_eq!(comps.count(), 3);
        assert_eq!(comps.members(1), vec![1, 2]);
    }

    #[test]
    fn isolated_nodes_can_be_ignored() {
        let g = build(5, false, &[(0, 1), (1, 2)]);
        let comps = connected_components(&g);
        assert_eq!(comps.count(), 3);
        assert_eq!(comps.count_above(1), 1);
        assert_eq!(comps.largest(), 3);
    }

    #[test]
    fn directed_graphs_use_weak_connectivity() {
        let g = build(4, true, &[(0, 1), (2, 1)]);
        let comps = connected_components(&g);
        assert_eq!(comps.count(), 2);
        assert_eq!(comps.label(2), Some(0));
        assert_eq!(comps.label(3), Some(1));
    }

    #[test]
    fn empty_graph_has_no_components() {
        let comps = connected_components(&Graph::new(0, false));
        assert_eq!(comps.count(), 0);
        assert_eq!(comps.largest(), 0);
    }

    #[test]
    fn cached_labels_survive_until_cleared() {
        let mut g = build(4, false, &[(0, 1), (2, 3)]);
        assert_eq!(num_components_cached(&mut g, 0).expect("count"), 2);

        g.remove_edge(2, 3).expect("cut");
        assert_eq!(
            num_components_cached(&mut g, 0).expect("stale"),
            2,
            "cache is not invalidated by mutation"
        );

        g.clear_stats();
        assert_eq!(num_components_cached(&mut g, 0).expect("fresh"), 3);
    }
}
