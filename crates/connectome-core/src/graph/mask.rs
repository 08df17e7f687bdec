//! Whole-graph masking.
//!
//! Nodes are never removed from a graph in place. Dropping nodes means
//! building a new graph through a node-index remap: every kept node gets a
//! new dense id, and edges whose endpoints both survive are carried across
//! with their weights. Labels travel with their nodes.

use tracing::debug;

use super::Graph;
use crate::error::GraphError;

impl Graph {
    /// Build a graph from the nodes where `mask[node]` is true.
    ///
    /// Returns the new graph and, for each new id, the old id it came from.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] when the mask length differs from
    /// the node count; [`GraphError::Allocation`] when the new graph cannot
    /// be allocated.
    pub fn subgraph(&self, mask: &[bool]) -> Result<(Self, Vec<u32>), GraphError> {
        if mask.len() != self.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "mask has {} entries, graph has {} nodes",
                mask.len(),
                self.num_nodes()
            )));
        }

        let mut kept = Vec::new();
        let mut old_to_new = Vec::with_capacity(mask.len());
        for (old, &keep) in mask.iter().enumerate() {
            if keep {
                old_to_new.push(Some(kept.len() as u32));
                kept.push(old as u32);
            } else {
                old_to_new.push(None);
            }
        }

        let graph = self.remap(&old_to_new)?;
        Ok((graph, kept))
    }

    /// Build a new graph by mapping every old node id through `old_to_new`.
    ///
    /// `None` drops the node. New ids must be dense (`0..k` for `k` kept
    /// nodes) and injective.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidArgument`] for a map of the wrong length, a
    /// duplicate target, or a target outside `0..k`.
    pub fn remap(&self, old_to_new: &[Option<u32>]) -> Result<Self, GraphError> {
        if old_to_new.len() != self.num_nodes() {
            return Err(GraphError::InvalidArgument(format!(
                "remap has {} entries, graph has {} nodes",
                old_to_new.len(),
                self.num_nodes()
            )));
        }

        let kept = old_to_new.iter().flatten().count();
        let mut seen = vec![false; kept];
        for &new in old_to_new.iter().flatten() {
            match seen.get_mut(new as usize) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(GraphError::InvalidArgument(format!(
                        "node {new} is targeted twice"
                    )));
                }
                None => {
                    return Err(GraphError::InvalidArgument(format!(
                        "target {new} outside 0..{kept}"
                    )));
                }
            }
        }

        let mut out = Self::try_new(kept, self.is_directed())?;
        for (old, new) in old_to_new.iter().enumerate() {
            let Some(new) = *new else { continue };
            if let Some(label) = self.label(old as u32) {
                out.set_label(new, *label)?;
            }
        }
        for (u, v, w) in self.edges() {
            if let (Some(nu), Some(nv)) = (old_to_new[u as usize], old_to_new[v as usize]) {
                out.add_edge(nu, nv, w)?;
            }
        }

        debug!(
            from_nodes = self.num_nodes(),
            to_nodes = out.num_nodes(),
            from_edges = self.num_edges(),
            to_edges = out.num_edges(),
            "graph remapped"
        );
        Ok(out)
    }
}
