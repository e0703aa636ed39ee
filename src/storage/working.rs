//! Reduced graphs with an explicit original-index map
//!
//! Removing a node zeroes its row and column, then drops every node left
//! without an edge. The surviving nodes are compacted into `0..len`, so the
//! position of a node no longer identifies it; `WorkingGraph` carries the map
//! back to the caller's node ids.

use super::{CsrGraph, NodeId};
use anyhow::{anyhow, Result};

/// A compacted graph plus the original id of every position
///
/// # Example
///
/// ```
/// use keynode_graph::{CsrGraph, NodeId, WorkingGraph};
///
/// // Path 0 - 1 - 2 - 3
/// let graph = CsrGraph::from_edge_list(
///     4,
///     &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))],
/// )
/// .unwrap();
///
/// // Removing node 1 strands node 0, which is pruned as well
/// let reduced = WorkingGraph::new(&graph).remove_node(1).unwrap();
/// assert_eq!(reduced.original_ids(), &[NodeId(2), NodeId(3)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingGraph {
    graph: CsrGraph,
    original: Vec<NodeId>,
}

impl WorkingGraph {
    /// Start from a copy of `graph` with the identity index map
    #[must_use]
    pub fn new(graph: &CsrGraph) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let original = (0..graph.num_nodes()).map(|i| NodeId(i as u32)).collect();
        Self {
            graph: graph.clone(),
            original,
        }
    }

    /// Current (compacted) graph
    #[must_use]
    pub const fn graph(&self) -> &CsrGraph {
        &self.graph
    }

    /// Number of live nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    /// True once every node has been removed or pruned
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.graph.num_nodes() == 0
    }

    /// Original id of the node at position `local`
    #[must_use]
    pub fn original_id(&self, local: usize) -> Option<NodeId> {
        self.original.get(local).copied()
    }

    /// Original ids, indexed by current position
    #[must_use]
    pub fn original_ids(&self) -> &[NodeId] {
        &self.original
    }

    /// Remove the node at position `local`, then prune isolated nodes
    ///
    /// Post-conditions: the result is symmetric, contains no isolated node,
    /// and its index map points at the caller's original ids. `self` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns error if `local` is out of bounds
    pub fn remove_node(&self, local: usize) -> Result<Self> {
        if local >= self.graph.num_nodes() {
            return Err(anyhow!(
                "Node position {local} out of bounds for a graph of {} nodes",
                self.graph.num_nodes()
            ));
        }
        Ok(self.reduce(Some(local)))
    }

    /// Drop every isolated node without removing anything else
    #[must_use]
    pub fn prune_isolated(&self) -> Self {
        self.reduce(None)
    }

    fn reduce(&self, removed: Option<usize>) -> Self {
        let (graph, kept) = reduce_graph(&self.graph, removed);
        let original = kept.iter().map(|&old| self.original[old]).collect();
        Self { graph, original }
    }
}

/// Zero out `removed` (if any) and drop nodes whose degree becomes zero
///
/// Returns the compacted graph and, for each new position, its position in
/// `graph`. Node names follow their nodes.
pub(crate) fn reduce_graph(graph: &CsrGraph, removed: Option<usize>) -> (CsrGraph, Vec<usize>) {
    let n = graph.num_nodes();
    let removed_neighbors = removed.map_or(&[][..], |r| graph.neighbor_slice(r));

    let mut new_index = vec![u32::MAX; n];
    let mut kept = Vec::with_capacity(n);
    for v in 0..n {
        if Some(v) == removed {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let v_u32 = v as u32;
        let mut degree = graph.neighbor_slice(v).len();
        if removed_neighbors.binary_search(&v_u32).is_ok() {
            degree -= 1;
        }
        if degree > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let idx = kept.len() as u32;
            new_index[v] = idx;
            kept.push(v);
        }
    }

    // Old indices are visited in ascending order, so remapped lists stay sorted
    let neighbors = kept
        .iter()
        .map(|&v| {
            graph
                .neighbor_slice(v)
                .iter()
                .filter_map(|&w| {
                    let mapped = new_index[w as usize];
                    (mapped != u32::MAX).then_some(mapped)
                })
                .collect()
        })
        .collect();

    let mut reduced = CsrGraph::from_neighbor_lists(neighbors);
    for (node, name) in graph.node_names() {
        let mapped = new_index[node.index()];
        if mapped != u32::MAX {
            reduced.set_node_name(NodeId(mapped), name.clone());
        }
    }

    (reduced, kept)
}
