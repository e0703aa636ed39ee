//! Fragmentation measures from single-node removal
//!
//! Every measure follows the same template for each node `n` of a graph of
//! size `S`:
//!
//! 1. remove `n` (zero its row and column)
//! 2. drop every node left without an edge
//! 3. decompose the remainder into connected components
//! 4. aggregate component sizes (or pairwise distances) into one score
//!
//! Scores are indexed by position in the graph they were computed on and are
//! always finite.
//!
//! # References
//! - Borgatti (2006): "Identifying sets of key players in a social network"

use super::shortest_path::shortest_path_lengths;
use super::structure::component_sizes;
use crate::storage::working::reduce_graph;
use crate::storage::CsrGraph;
use crate::NodeId;

/// Fragmentation measure used to score node removals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    /// Components left behind, normalized by graph size
    DisconnectionCount,
    /// Pairwise-connectivity measure `F`
    FMeasure,
    /// Entropy of the component-size distribution
    InformationEntropy,
    /// Distance-weighted fragmentation `Fd`
    FdMeasure,
    /// Element-wise sum of `F`, entropy and `Fd`
    Combined,
}

impl Measure {
    /// Per-removal penalty matching the scale of the measure
    ///
    /// Single measures live in `[0, 1]` (entropy in `[0, ln S]`); the combined
    /// objective sums three of them.
    #[must_use]
    pub const fn default_penalty(self) -> f64 {
        match self {
            Self::Combined => 0.75,
            _ => 0.15,
        }
    }

    /// Score every node of `graph` under this measure
    #[must_use]
    pub fn scores(self, graph: &CsrGraph) -> Vec<f64> {
        match self {
            Self::DisconnectionCount => disconnection_count(graph),
            Self::FMeasure => f_measure(graph),
            Self::InformationEntropy => information_entropy(graph),
            Self::FdMeasure => fd_measure(graph),
            Self::Combined => combined_objective(graph),
        }
    }
}

/// `numerator / denominator`, with an empty denominator contributing nothing
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Sizes of the fragments left after removing node `n`
///
/// The live part is the graph with `n` removed and every isolated node pruned.
/// Neighbors of `n` whose only edge led to `n` are stranded by the removal and
/// each form a fragment of size one. Nodes isolated before the removal belong
/// to no fragment.
fn fragment_sizes(graph: &CsrGraph, n: usize) -> Vec<usize> {
    let (live, _) = reduce_graph(graph, Some(n));
    let stranded = graph
        .neighbor_slice(n)
        .iter()
        .filter(|&&m| graph.neighbor_slice(m as usize).len() == 1)
        .count();
    let mut sizes = component_sizes(&live);
    sizes.extend(std::iter::repeat(1).take(stranded));
    sizes
}

/// Apply the removal template to every node, aggregating fragment sizes
fn score_by_fragment_sizes<F>(graph: &CsrGraph, aggregate: F) -> Vec<f64>
where
    F: Fn(&[usize], usize) -> f64,
{
    let size = graph.num_nodes();
    (0..size)
        .map(|n| aggregate(&fragment_sizes(graph, n), size))
        .collect()
}

/// Number of fragments left after each removal, divided by the graph size
///
/// # Example
///
/// ```
/// use keynode_graph::{disconnection_count, CsrGraph, NodeId};
///
/// // Star with center 0
/// let edges: Vec<_> = (1..5).map(|i| (NodeId(0), NodeId(i))).collect();
/// let star = CsrGraph::from_edge_list(5, &edges).unwrap();
///
/// let scores = disconnection_count(&star);
/// assert!((scores[0] - 4.0 / 5.0).abs() < 1e-12); // four stranded leaves
/// assert!((scores[1] - 1.0 / 5.0).abs() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn disconnection_count(graph: &CsrGraph) -> Vec<f64> {
    score_by_fragment_sizes(graph, |sizes, size| ratio(sizes.len() as f64, size as f64))
}

/// `F = 1 − Σ s_k(s_k − 1) / (S(S − 1))` after each removal
///
/// The ratio is the fraction of ordered node pairs that stay connected, so
/// `F` is the fraction of pairs the removal disconnects (the removed node's
/// own pairs count as disconnected).
///
/// Sign convention: key-node selection takes the arg-max of this vector, the
/// way the original fragmentation analysis does. Graphs with fewer than two
/// nodes score `1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f_measure(graph: &CsrGraph) -> Vec<f64> {
    score_by_fragment_sizes(graph, |sizes, size| {
        let connected_pairs: usize = sizes.iter().map(|&s| s * (s - 1)).sum();
        let total_pairs = size * size.saturating_sub(1);
        1.0 - ratio(connected_pairs as f64, total_pairs as f64)
    })
}

/// `−Σ p_k ln(p_k)` over the fragments left after each removal
///
/// `p_k` is the share of the surviving fragment nodes in fragment `k`, so the
/// score is `0` exactly when the survivors stay connected and never exceeds
/// `ln S`. Zero-sized terms contribute `0`.
///
/// Normalization note: shares are taken over the survivors, not over `S` as in
/// the textbook `s_k / S` form, which would never reach `0`.
///
/// # Example
///
/// ```
/// use keynode_graph::{information_entropy, CsrGraph, NodeId};
///
/// let edges: Vec<_> = (1..5).map(|i| (NodeId(0), NodeId(i))).collect();
/// let star = CsrGraph::from_edge_list(5, &edges).unwrap();
///
/// let scores = information_entropy(&star);
/// assert!((scores[0] - 4.0_f64.ln()).abs() < 1e-12); // ≈ 1.386
/// assert_eq!(scores[1], 0.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn information_entropy(graph: &CsrGraph) -> Vec<f64> {
    score_by_fragment_sizes(graph, |sizes, _| {
        let survivors: usize = sizes.iter().sum();
        if survivors == 0 {
            return 0.0;
        }
        let total = survivors as f64;
        let entropy: f64 = sizes
            .iter()
            .filter(|&&s| s > 0)
            .map(|&s| {
                let p = s as f64 / total;
                p * p.ln()
            })
            .sum();
        // avoid −0.0 for a single fragment
        if entropy == 0.0 {
            0.0
        } else {
            -entropy
        }
    })
}

/// `Fd = 1 − Σ_{i<j} 1/d(i, j) / ((S − 1)(S − 2)/2)` after each removal
///
/// Sums reciprocal distances over all pairs of the reduced graph. Unreachable
/// pairs contribute `0`. The denominator is the pair count of a graph one node
/// smaller; graphs with fewer than three nodes score `1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fd_measure(graph: &CsrGraph) -> Vec<f64> {
    let size = graph.num_nodes();
    let denominator = if size >= 3 {
        ((size - 1) * (size - 2)) as f64 / 2.0
    } else {
        0.0
    };

    (0..size)
        .map(|n| {
            let (reduced, _) = reduce_graph(graph, Some(n));
            1.0 - ratio(reciprocal_distance_sum(&reduced), denominator)
        })
        .collect()
}

/// `Σ_{i<j} 1/d(i, j)`, infinite distances contributing `0`
fn reciprocal_distance_sum(graph: &CsrGraph) -> f64 {
    let n = graph.num_nodes();
    let mut sum = 0.0;
    for i in 0..n {
        #[allow(clippy::cast_possible_truncation)]
        let source = NodeId(i as u32);
        let Ok(lengths) = shortest_path_lengths(graph, source) else {
            continue;
        };
        sum += lengths[..i]
            .iter()
            .filter(|d| d.is_finite() && **d > 0.0)
            .map(|d| 1.0 / d)
            .sum::<f64>();
    }
    sum
}

/// Element-wise `F + entropy + Fd`
#[must_use]
pub fn combined_objective(graph: &CsrGraph) -> Vec<f64> {
    let f = f_measure(graph);
    let entropy = information_entropy(graph);
    let fd = fd_measure(graph);

    f.iter()
        .zip(&entropy)
        .zip(&fd)
        .map(|((a, b), c)| a + b + c)
        .collect()
}

/// Position of the maximum score, lowest index on ties
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn arg_max(scores: &[f64]) -> Option<(usize, f64)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
}
