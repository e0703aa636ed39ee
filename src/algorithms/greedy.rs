//! Greedy key-node selection by iterative removal
//!
//! Repeatedly removes the node whose removal scores highest under a
//! fragmentation [`Measure`], tracking a penalized cumulative objective:
//!
//! ```text
//! objective[0] = max(score_0) − C
//! objective[t] = objective[t−1] + max(score_t) − C·(t+1)
//! ```
//!
//! A candidate is kept only while its cumulative value strictly improves on
//! the previous one, so the penalty `C` acts as a diminishing-returns cutoff.
//!
//! # Example
//!
//! ```
//! use keynode_graph::{find_key_nodes, CsrGraph, GreedyConfig, Measure, NodeId};
//!
//! // Star with center 0
//! let edges: Vec<_> = (1..5).map(|i| (NodeId(0), NodeId(i))).collect();
//! let star = CsrGraph::from_edge_list(5, &edges).unwrap();
//!
//! let selection = find_key_nodes(&star, &GreedyConfig::new(Measure::FMeasure)).unwrap();
//! assert_eq!(selection.removed, vec![NodeId(0)]);
//! ```

use super::fragmentation::{arg_max, Measure};
use crate::storage::{CsrGraph, WorkingGraph};
use crate::NodeId;
use anyhow::{anyhow, Result};
use tracing::{debug, info};

/// Greedy selector configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyConfig {
    /// Measure scoring each candidate removal
    pub measure: Measure,
    /// Cost `C` charged per removed node, scaled by the removal count
    pub penalty: f64,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self::new(Measure::FMeasure)
    }
}

impl GreedyConfig {
    /// Configuration for `measure` with its default penalty
    #[must_use]
    pub const fn new(measure: Measure) -> Self {
        Self {
            measure,
            penalty: measure.default_penalty(),
        }
    }

    /// Override the per-removal penalty
    #[must_use]
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }
}

/// Scores of one selection step
#[derive(Debug, Clone, PartialEq)]
pub enum StepScores {
    /// One score per node of the current graph
    PerNode(Vec<f64>),
    /// A single node is left; it scores `1` by convention
    LastNode,
    /// Nothing left to remove
    Exhausted,
}

impl StepScores {
    /// Score the current graph under `measure`
    #[must_use]
    pub fn compute(graph: &CsrGraph, measure: Measure) -> Self {
        match graph.num_nodes() {
            0 => Self::Exhausted,
            1 => Self::LastNode,
            _ => Self::PerNode(measure.scores(graph)),
        }
    }

    /// Best candidate as `(position, score)`, lowest position on ties
    #[must_use]
    pub fn best(&self) -> Option<(usize, f64)> {
        match self {
            Self::PerNode(scores) => arg_max(scores),
            Self::LastNode => Some((0, 1.0)),
            Self::Exhausted => None,
        }
    }
}

/// Why the greedy selector stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreedyHalt {
    /// The next candidate did not improve the cumulative objective
    NoImprovement,
    /// The last remaining node was taken
    LastNode,
    /// Removals left an empty graph
    Exhausted,
}

/// Result of greedy key-node selection
#[derive(Debug, Clone, PartialEq)]
pub struct KeyNodeSelection {
    /// Removed nodes in order of decreasing importance, as original ids
    pub removed: Vec<NodeId>,

    /// Cumulative objective recorded when each node was removed
    pub objective: Vec<f64>,

    /// Value of the first candidate that failed the improvement test
    pub stopping_objective: Option<f64>,

    /// Termination reason
    pub halt: GreedyHalt,
}

impl KeyNodeSelection {
    /// Number of selected nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    /// True if nothing was selected (empty input graph)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    /// Cumulative objective after the last selected node
    #[must_use]
    pub fn final_objective(&self) -> Option<f64> {
        self.objective.last().copied()
    }
}

/// Select key nodes by greedy iterative removal
///
/// Each step scores the current graph, takes the arg-max (lowest position on
/// ties), records its original id, and removes it together with every node it
/// strands. The caller's graph is never modified.
///
/// Terminates on every finite graph: each accepted candidate removes at least
/// one node.
///
/// # Errors
///
/// Returns error if a selected position cannot be mapped back to an original
/// node (an internal invariant violation)
pub fn find_key_nodes(graph: &CsrGraph, config: &GreedyConfig) -> Result<KeyNodeSelection> {
    let mut working = WorkingGraph::new(graph);
    let mut removed = Vec::new();
    let mut objective: Vec<f64> = Vec::new();
    let mut stopping_objective = None;

    let halt = loop {
        let scores = StepScores::compute(working.graph(), config.measure);
        let Some((local, best)) = scores.best() else {
            break GreedyHalt::Exhausted;
        };

        #[allow(clippy::cast_precision_loss)]
        let cost = config.penalty * (removed.len() + 1) as f64;
        let previous = objective.last().copied();
        let value = previous.unwrap_or(0.0) + best - cost;

        let original = working
            .original_id(local)
            .ok_or_else(|| anyhow!("Position {local} missing from index map"))?;

        if matches!(scores, StepScores::LastNode) {
            removed.push(original);
            objective.push(value);
            debug!(node = original.0, objective = value, "took last remaining node");
            break GreedyHalt::LastNode;
        }

        if previous.is_some_and(|previous| value <= previous) {
            stopping_objective = Some(value);
            debug!(node = original.0, objective = value, "candidate does not improve objective");
            break GreedyHalt::NoImprovement;
        }

        removed.push(original);
        objective.push(value);
        debug!(
            step = removed.len(),
            node = original.0,
            score = best,
            objective = value,
            remaining = working.num_nodes(),
            "removed key node"
        );

        working = working.remove_node(local)?;
    };

    info!(
        selected = removed.len(),
        measure = ?config.measure,
        halt = ?halt,
        "greedy key-node selection finished"
    );

    Ok(KeyNodeSelection {
        removed,
        objective,
        stopping_objective,
        halt,
    })
}

/// Rank every node by its single-removal score, highest first
///
/// Ties keep ascending node order.
#[must_use]
pub fn rank_nodes(graph: &CsrGraph, measure: Measure) -> Vec<(NodeId, f64)> {
    let mut ranking: Vec<(NodeId, f64)> = measure
        .scores(graph)
        .into_iter()
        .enumerate()
        .map(|(i, score)| {
            #[allow(clippy::cast_possible_truncation)]
            let node = NodeId(i as u32);
            (node, score)
        })
        .collect();
    // Stable sort keeps index order among equal scores
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking
}
