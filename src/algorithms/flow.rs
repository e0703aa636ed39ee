//! Combinatorial flow-based source selection
//!
//! Picks a set of source nodes that keeps every node of a connected component
//! close to some source. A candidate set is scored from the element-wise
//! minimum of its members' distance rows:
//!
//! ```text
//! objective = mean(min_d) + penalty · max(min_d) · count(min_d == max)
//! ```
//!
//! Set sizes `k = 2, 3, …` are searched exhaustively; the search continues
//! while the penalized score `best(k) + k · regularization` strictly drops.
//! That stopping rule is a heuristic: penalized scores need not be unimodal in
//! `k`, so the result is not guaranteed optimal over all sizes.
//!
//! Every round evaluates `C(N, k)` subsets. Use
//! [`FlowConfig::with_max_evaluations`] or [`FlowConfig::with_max_set_size`]
//! to bound the work on anything but small graphs.

use super::shortest_path::{distance_matrix, DistanceMatrix};
use super::structure::{find_components, largest_component};
use crate::storage::CsrGraph;
use crate::NodeId;
use anyhow::{anyhow, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Subset evaluations per round above which a warning is logged
pub const DEFAULT_WARN_EVALUATIONS: u64 = 1_000_000;

/// Errors raised by the flow-based selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Fewer than two nodes to choose from
    #[error("Distance matrix has {num_nodes} nodes, at least 2 are required")]
    TooFewNodes {
        /// Nodes in the distance matrix
        num_nodes: usize,
    },

    /// Some pair of nodes is unreachable
    #[error("Distance matrix has unreachable pairs; restrict it to one connected component")]
    Disconnected,

    /// A round would exceed the configured evaluation budget
    #[error("Set size {size} needs {evaluations} subset evaluations, limit is {limit}")]
    SearchTooLarge {
        /// Set size of the rejected round
        size: usize,
        /// `C(N, size)`, saturated at `u64::MAX`
        evaluations: u64,
        /// Configured budget
        limit: u64,
    },

    /// Empty candidate set
    #[error("Source set is empty")]
    NoSources,

    /// Candidate refers to a node outside the matrix
    #[error("Source {node} out of range for {num_nodes} nodes")]
    SourceOutOfRange {
        /// Offending position
        node: usize,
        /// Nodes in the distance matrix
        num_nodes: usize,
    },
}

/// Flow selector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    /// Weight of the worst-case term in the set objective
    pub penalty: f64,
    /// Cost per source added to the set
    pub regularization: f64,
    /// Largest set size to try
    pub max_set_size: Option<usize>,
    /// Hard budget of subset evaluations per round
    pub max_evaluations: Option<u64>,
    /// Evaluations per round above which a warning is logged
    pub warn_evaluations: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            penalty: 0.1,
            regularization: 0.5,
            max_set_size: None,
            max_evaluations: None,
            warn_evaluations: DEFAULT_WARN_EVALUATIONS,
        }
    }
}

impl FlowConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worst-case penalty
    #[must_use]
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set the per-source regularization
    #[must_use]
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Stop before trying sets larger than `size`
    #[must_use]
    pub fn with_max_set_size(mut self, size: usize) -> Self {
        self.max_set_size = Some(size);
        self
    }

    /// Fail instead of running a round with more than `limit` subsets
    #[must_use]
    pub fn with_max_evaluations(mut self, limit: u64) -> Self {
        self.max_evaluations = Some(limit);
        self
    }
}

/// Winning set of one explored size
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRound {
    /// Set size `k`
    pub size: usize,
    /// Minimum set objective over all `k`-subsets
    pub objective: f64,
    /// `objective + k · regularization`
    pub penalized: f64,
    /// Winning sources, ascending
    pub sources: Vec<NodeId>,
    /// Whether `penalized` beat the previous round
    pub improved: bool,
}

/// Why the flow search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowHalt {
    /// The last round's penalized score did not improve
    NoImprovement,
    /// `FlowConfig::max_set_size` was reached
    SizeCap,
    /// Every node is already a source
    AllNodes,
}

/// Result of the flow-based search
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSelection {
    /// Explored rounds in increasing size, the failing round included
    pub rounds: Vec<FlowRound>,
    /// Termination reason
    pub halt: FlowHalt,
}

impl FlowSelection {
    /// Last round that improved on its predecessor
    #[must_use]
    pub fn best(&self) -> Option<&FlowRound> {
        self.rounds.iter().rev().find(|round| round.improved)
    }
}

/// Objective of one candidate source set
///
/// Takes the element-wise minimum of the sources' distance rows, then returns
/// `mean + penalty · max · count_at_max`.
///
/// # Errors
///
/// Returns error if `sources` is empty or holds an out-of-range position
pub fn compute_obj_flow(distances: &DistanceMatrix, sources: &[usize], penalty: f64) -> Result<f64> {
    let n = distances.num_nodes();
    let Some((&first, rest)) = sources.split_first() else {
        return Err(SelectionError::NoSources.into());
    };
    let row = |node: usize| {
        distances
            .row(node)
            .ok_or(SelectionError::SourceOutOfRange { node, num_nodes: n })
    };

    let mut min_distances = row(first)?.to_vec();
    for &source in rest {
        for (current, &d) in min_distances.iter_mut().zip(row(source)?) {
            if d < *current {
                *current = d;
            }
        }
    }

    Ok(flow_objective(&min_distances, penalty))
}

#[allow(clippy::cast_precision_loss)]
fn flow_objective(min_distances: &[f64], penalty: f64) -> f64 {
    if min_distances.is_empty() {
        return 0.0;
    }
    let mean = min_distances.iter().sum::<f64>() / min_distances.len() as f64;
    let max = min_distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Hop counts are integral, so exact comparison is safe
    #[allow(clippy::float_cmp)]
    let at_max = min_distances.iter().filter(|&&d| d == max).count();
    mean + penalty * max * at_max as f64
}

/// `k`-subsets of `0..n` in lexicographic order
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// All `k`-subsets of `0..n`; none when `k > n`
    #[must_use]
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance the rightmost index that still has room
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// `C(n, k)`, saturating at `u64::MAX`
#[must_use]
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: result is C(n, i) before the update
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    #[allow(clippy::cast_possible_truncation)]
    let count = result as u64;
    count
}

/// Exhaustive search for the best source sets of growing size
///
/// `distances` must be the distance matrix of one connected component; see
/// [`select_flow_sources_in_graph`] to run on a whole graph. Ties between
/// subsets resolve to the first in lexicographic order.
///
/// # Errors
///
/// Returns [`SelectionError::TooFewNodes`] for fewer than two nodes,
/// [`SelectionError::Disconnected`] if any distance is infinite, and
/// [`SelectionError::SearchTooLarge`] if a round exceeds
/// `config.max_evaluations`
pub fn select_flow_sources(distances: &DistanceMatrix, config: &FlowConfig) -> Result<FlowSelection> {
    let n = distances.num_nodes();
    if n < 2 {
        return Err(SelectionError::TooFewNodes { num_nodes: n }.into());
    }
    if !distances.is_finite() {
        return Err(SelectionError::Disconnected.into());
    }

    let mut rounds: Vec<FlowRound> = Vec::new();
    let mut size = 2;

    let halt = loop {
        if size > n {
            break FlowHalt::AllNodes;
        }
        if config.max_set_size.is_some_and(|cap| size > cap) {
            break FlowHalt::SizeCap;
        }

        let evaluations = binomial(n, size);
        if let Some(limit) = config.max_evaluations {
            if evaluations > limit {
                return Err(SelectionError::SearchTooLarge {
                    size,
                    evaluations,
                    limit,
                }
                .into());
            }
        }
        if evaluations > config.warn_evaluations {
            warn!(size, evaluations, nodes = n, "exhaustive flow search round is large");
        }

        let (sources, objective) = best_subset(distances, size, config.penalty)?;
        #[allow(clippy::cast_precision_loss)]
        let penalized = objective + size as f64 * config.regularization;
        let improved = rounds.last().map_or(true, |previous| penalized < previous.penalized);

        debug!(size, objective, penalized, improved, "flow round");
        rounds.push(FlowRound {
            size,
            objective,
            penalized,
            sources,
            improved,
        });

        if !improved {
            break FlowHalt::NoImprovement;
        }
        size += 1;
    };

    info!(rounds = rounds.len(), halt = ?halt, "flow source selection finished");
    Ok(FlowSelection { rounds, halt })
}

/// Minimum-objective `size`-subset, first in lexicographic order on ties
fn best_subset(distances: &DistanceMatrix, size: usize, penalty: f64) -> Result<(Vec<NodeId>, f64)> {
    let mut best: Option<(Vec<usize>, f64)> = None;
    for subset in Combinations::new(distances.num_nodes(), size) {
        let objective = compute_obj_flow(distances, &subset, penalty)?;
        if best.as_ref().map_or(true, |(_, b)| objective < *b) {
            best = Some((subset, objective));
        }
    }

    let (subset, objective) =
        best.ok_or_else(|| anyhow!("No subsets of size {size} among {} nodes", distances.num_nodes()))?;
    #[allow(clippy::cast_possible_truncation)]
    let sources = subset.into_iter().map(|s| NodeId(s as u32)).collect();
    Ok((sources, objective))
}

/// Run the flow search on the largest component of `graph`
///
/// Sources in the result are node ids of `graph`.
///
/// # Errors
///
/// Same as [`select_flow_sources`]; a graph whose largest component has a
/// single node yields [`SelectionError::TooFewNodes`]
pub fn select_flow_sources_in_graph(graph: &CsrGraph, config: &FlowConfig) -> Result<FlowSelection> {
    let components = find_components(graph);
    let component = largest_component(&components)
        .ok_or(SelectionError::TooFewNodes { num_nodes: 0 })?;
    let members = component.nodes();

    let distances = distance_matrix(graph).restrict(members)?;
    let mut selection = select_flow_sources(&distances, config)?;

    for round in &mut selection.rounds {
        for source in &mut round.sources {
            *source = members[source.index()];
        }
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn cycle(n: u32) -> CsrGraph {
        let edges: Vec<_> = (0..n).map(|i| (NodeId(i), NodeId((i + 1) % n))).collect();
        CsrGraph::from_edge_list(n as usize, &edges).unwrap()
    }

    #[test]
    fn test_combinations_lexicographic() {
        let all: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 3).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(6, 3).count(), 20);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(6, 2), 15);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(60, 30), 118_264_581_564_861_424);
        assert_eq!(binomial(200, 100), u64::MAX);
    }

    #[test]
    fn test_obj_flow_values() {
        // Cycle of 6, sources {0, 3}: min distances 0,1,1,0,1,1
        let distances = distance_matrix(&cycle(6));
        let objective = compute_obj_flow(&distances, &[0, 3], 0.1).unwrap();
        assert!((objective - (4.0 / 6.0 + 0.1 * 1.0 * 4.0)).abs() < EPS);

        // Sources {0, 1}: min distances 0,0,1,2,2,1
        let objective = compute_obj_flow(&distances, &[0, 1], 0.1).unwrap();
        assert!((objective - (6.0 / 6.0 + 0.1 * 2.0 * 2.0)).abs() < EPS);

        assert!(compute_obj_flow(&distances, &[], 0.1).is_err());
        assert!(compute_obj_flow(&distances, &[6], 0.1).is_err());

        // Out-of-range sources are reported, never indexed
        let err = compute_obj_flow(&distances, &[1, 9], 0.1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SelectionError>(),
            Some(&SelectionError::SourceOutOfRange { node: 9, num_nodes: 6 })
        );
    }

    #[test]
    fn test_pair_matches_brute_force_on_cycle() {
        let distances = distance_matrix(&cycle(6));
        let config = FlowConfig::default().with_max_set_size(2);
        let selection = select_flow_sources(&distances, &config).unwrap();

        let mut brute: Option<(Vec<usize>, f64)> = None;
        for a in 0..6 {
            for b in a + 1..6 {
                let objective = compute_obj_flow(&distances, &[a, b], config.penalty).unwrap();
                if brute.as_ref().map_or(true, |(_, best)| objective < *best) {
                    brute = Some((vec![a, b], objective));
                }
            }
        }
        let (brute_set, brute_objective) = brute.unwrap();

        let round = &selection.rounds[0];
        assert_eq!(round.size, 2);
        assert!((round.objective - brute_objective).abs() < EPS);
        let winners: Vec<_> = round.sources.iter().map(|n| n.index()).collect();
        assert_eq!(winners, brute_set);
        // Two apart beats antipodal: 5/6 + 0.1·2 < 4/6 + 0.1·4
        assert_eq!(winners, vec![0, 2]);
        assert_eq!(selection.halt, FlowHalt::SizeCap);
    }

    #[test]
    fn test_search_stops_without_improvement() {
        let distances = distance_matrix(&cycle(6));
        let selection = select_flow_sources(&distances, &FlowConfig::default()).unwrap();

        assert_eq!(selection.halt, FlowHalt::NoImprovement);
        let last = selection.rounds.last().unwrap();
        assert!(!last.improved);
        let best = selection.best().unwrap();
        assert!(best.improved);
        assert!(best.penalized < last.penalized || (best.penalized - last.penalized).abs() < EPS);
        for pair in selection.rounds.windows(2) {
            assert_eq!(pair[1].size, pair[0].size + 1);
        }
    }

    #[test]
    fn test_zero_regularization_reaches_all_nodes() {
        // Triangle: k = 2 leaves one node at distance 1, k = 3 covers all
        let triangle = cycle(3);
        let config = FlowConfig::default().with_regularization(0.0);
        let selection = select_flow_sources(&distance_matrix(&triangle), &config).unwrap();

        assert_eq!(selection.halt, FlowHalt::AllNodes);
        assert_eq!(selection.rounds.len(), 2);
        assert_eq!(selection.best().map(|r| r.size), Some(3));
        assert_eq!(selection.rounds[1].objective, 0.0);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let single = DistanceMatrix::from_rows(&[vec![0.0]]).unwrap();
        let err = select_flow_sources(&single, &FlowConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SelectionError>(),
            Some(&SelectionError::TooFewNodes { num_nodes: 1 })
        );

        let split = CsrGraph::from_edge_list(4, &[(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))])
            .unwrap();
        let err = select_flow_sources(&distance_matrix(&split), &FlowConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SelectionError>(),
            Some(&SelectionError::Disconnected)
        );
    }

    #[test]
    fn test_evaluation_budget_is_explicit() {
        let distances = distance_matrix(&cycle(8));
        let config = FlowConfig::default().with_max_evaluations(10);
        let err = select_flow_sources(&distances, &config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SelectionError>(),
            Some(&SelectionError::SearchTooLarge {
                size: 2,
                evaluations: 28,
                limit: 10
            })
        );
    }

    #[test]
    fn test_size_cap_below_two() {
        let distances = distance_matrix(&cycle(4));
        let config = FlowConfig::default().with_max_set_size(1);
        let selection = select_flow_sources(&distances, &config).unwrap();
        assert!(selection.rounds.is_empty());
        assert!(selection.best().is_none());
        assert_eq!(selection.halt, FlowHalt::SizeCap);
    }

    #[test]
    fn test_graph_entry_maps_component_ids() {
        // Node 0 isolated, cycle of 6 on nodes 1..=6
        let mut edges: Vec<_> = (1..6).map(|i| (NodeId(i), NodeId(i + 1))).collect();
        edges.push((NodeId(6), NodeId(1)));
        let graph = CsrGraph::from_edge_list(7, &edges).unwrap();

        let config = FlowConfig::default().with_max_set_size(2);
        let selection = select_flow_sources_in_graph(&graph, &config).unwrap();
        assert_eq!(selection.rounds[0].sources, vec![NodeId(1), NodeId(3)]);
    }
}
