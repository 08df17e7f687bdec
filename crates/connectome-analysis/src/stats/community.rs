//! Partition quality scores.
//!
//! Both scores judge a node labelling against a *reference* graph, which
//! for divisive clustering is the graph before any edge was removed.

use std::collections::BTreeMap;

use connectome_core::config::ScoreKind;
use connectome_core::{Graph, GraphError};

fn check_labels(reference: &Graph, labels: &[u32]) -> Result<(), GraphError> {
    if labels.len() == reference.num_nodes() {
        Ok(())
    } else {
        Err(GraphError::InvalidArgument(format!(
            "{} community labels for {} nodes",
            labels.len(),
            reference.num_nodes()
        )))
    }
}

/// Newman modularity of `labels` over `reference`.
///
/// `Q = Σ_c [ l_c / m - (d_c / 2m)^2 ]` where `l_c` is the number of edges
/// inside community `c` and `d_c` the summed degree of its nodes. Arcs of a
/// directed graph count once each. Returns 0 when the reference has no
/// edges.
///
/// # Errors
///
/// [`GraphError::InvalidArgument`] when `labels` is not one per node.
#[allow(clippy::cast_precision_loss)]
pub fn modularity(reference: &Graph, labels: &[u32]) -> Result<f64, GraphError> {
    check_labels(reference, labels)?;
    if reference.num_edges() == 0 {
        return Ok(0.0);
    }
    let m = reference.num_edges() as f64;

    // community -> (internal edges, summed degree)
    let mut tally: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for (u, v, _) in reference.edges() {
        let (lu, lv) = (labels[u as usize], labels[v as usize]);
        if lu == lv {
            tally.entry(lu).or_default().0 += 1.0;
        }
        tally.entry(lu).or_default().1 += 1.0;
        tally.entry(lv).or_default().1 += 1.0;
    }

    Ok(tally
        .values()
        .map(|&(internal, degree)| {
            let share = degree / (2.0 * m);
            internal / m - share * share
        })
        .sum())
}

/// Chira fitness of `labels` over `reference`.
///
/// Each community contributes the mean, over its nodes, of the fraction of
/// a node's neighbours that share its community. Nodes of degree 0
/// contribute 0.
///
/// # Errors
///
/// [`GraphError::InvalidArgument`] when `labels` is not one per node.
#[allow(clippy::cast_precision_loss)]
pub fn chira_fitness(reference: &Graph, labels: &[u32]) -> Result<f64, GraphError> {
    check_labels(reference, labels)?;

    // community -> (summed internal fraction, size)
    let mut tally: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for u in reference.nodes() {
        let label = labels[u as usize];
        let nbrs = reference.neighbours(u);
        let fraction = if nbrs.is_empty() {
            0.0
        } else {
            let inside = nbrs
                .iter()
                .filter(|&&v| labels[v as usize] == label)
                .count();
            inside as f64 / nbrs.len() as f64
        };
        let entry = tally.entry(label).or_default();
        entry.0 += fraction;
        entry.1 += 1;
    }

    Ok(tally
        .values()
        .map(|&(sum, size)| sum / size as f64)
        .sum())
}

/// Score `labels` with the chosen quality function.
///
/// # Errors
///
/// See [`modularity`] and [`chira_fitness`].
pub fn score_partition(
    kind: ScoreKind,
    reference: &Graph,
    labels: &[u32],
) -> Result<f64, GraphError> {
    match kind {
        ScoreKind::Modularity => modularity(reference, labels),
        ScoreKind::Chira => chira_fitness(reference, labels),
    }
}
