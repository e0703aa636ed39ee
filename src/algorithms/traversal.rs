//! Breadth-first traversal with hop-distance layering
//!
//! Based on Ligra (Shun & Blelloch, `PPoPP` 2013) frontier-based traversal patterns:
//! each frontier is one layer, so layer `d` holds exactly the nodes at hop
//! distance `d` from the start.

use crate::storage::CsrGraph;
use crate::NodeId;
use anyhow::{anyhow, Result};

/// Result of a breadth-first search
///
/// Nodes outside the start's component appear in no layer and have no
/// distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsLayers {
    layers: Vec<Vec<NodeId>>,
    distances: Vec<Option<u32>>,
}

impl BfsLayers {
    /// Nodes at exactly `distance` hops (empty beyond the last layer)
    #[must_use]
    pub fn layer(&self, distance: usize) -> &[NodeId] {
        self.layers.get(distance).map_or(&[][..], Vec::as_slice)
    }

    /// All non-empty layers, indexed by hop distance
    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    /// Hop distance of `node`, `None` if unreachable or out of range
    #[must_use]
    pub fn distance(&self, node: NodeId) -> Option<u32> {
        self.distances.get(node.index()).copied().flatten()
    }

    /// Per-node distance array, `None` for unreachable nodes
    #[must_use]
    pub fn distances(&self) -> &[Option<u32>] {
        &self.distances
    }

    /// Number of reachable nodes, start included
    #[must_use]
    pub fn num_reached(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Reachable nodes in visiting order
    pub fn reached(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Largest hop distance reached (eccentricity of the start within its component)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }
}

/// Breadth-first search from `start`, layered by hop distance
///
/// Each reachable node is visited exactly once and its distance is written
/// straight into the per-node array.
///
/// # Errors
///
/// Returns error if `start` is out of bounds
///
/// # Example
///
/// ```
/// use keynode_graph::{breadth_first_search, CsrGraph, NodeId};
///
/// // 0 - 1 - 2, 3 isolated
/// let graph = CsrGraph::from_edge_list(4, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))])
///     .unwrap();
///
/// let bfs = breadth_first_search(&graph, NodeId(0)).unwrap();
/// assert_eq!(bfs.layer(2), &[NodeId(2)]);
/// assert_eq!(bfs.distance(NodeId(3)), None);
/// ```
pub fn breadth_first_search(graph: &CsrGraph, start: NodeId) -> Result<BfsLayers> {
    let n = graph.num_nodes();
    if start.index() >= n {
        return Err(anyhow!("Node ID {} out of bounds", start.0));
    }

    let mut distances = vec![None; n];
    distances[start.index()] = Some(0);

    let mut layers = vec![vec![start]];
    let mut depth = 0_u32;

    loop {
        let mut next = Vec::new();
        if let Some(frontier) = layers.last() {
            for &node in frontier {
                for &neighbor in graph.neighbor_slice(node.index()) {
                    let slot = &mut distances[neighbor as usize];
                    if slot.is_none() {
                        *slot = Some(depth + 1);
                        next.push(NodeId(neighbor));
                    }
                }
            }
        }

        if next.is_empty() {
            break;
        }
        layers.push(next);
        depth += 1;
    }

    Ok(BfsLayers { layers, distances })
}
