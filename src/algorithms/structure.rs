//! Graph structure: connected components, connectivity, clustering coefficient
//!
//! Provides structural analysis algorithms:
//! - `find_components`: Partition nodes into maximal connected components
//! - `largest_component`: Pick the component with the most nodes
//! - `is_connected`: Single-component test
//! - `clustering_coefficient`: Local clustering of one node
//!
//! # Example
//!
//! ```
//! use keynode_graph::{find_components, is_connected, CsrGraph, NodeId};
//!
//! // Two components: 0 - 1, 2 - 3
//! let graph = CsrGraph::from_edge_list(4, &[(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))])
//!     .unwrap();
//!
//! assert_eq!(find_components(&graph).len(), 2);
//! assert!(!is_connected(&graph));
//! ```

use super::traversal::breadth_first_search;
use crate::storage::CsrGraph;
use crate::NodeId;
use anyhow::Result;

/// A maximal connected set of nodes, sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    nodes: Vec<NodeId>,
}

impl Component {
    /// Member nodes, sorted ascending
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of member nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Components always hold at least one node
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` belongs to this component
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.binary_search(&node).is_ok()
    }

    /// Induced adjacency in the original index space
    ///
    /// The result has as many nodes as `graph`; non-members are isolated and
    /// members keep their ids and edges.
    #[must_use]
    pub fn adjacency_in(&self, graph: &CsrGraph) -> CsrGraph {
        let mut neighbors = vec![Vec::new(); graph.num_nodes()];
        for &node in &self.nodes {
            if node.index() < graph.num_nodes() {
                neighbors[node.index()] = graph.neighbor_slice(node.index()).to_vec();
            }
        }
        let mut induced = CsrGraph::from_neighbor_lists(neighbors);
        for &node in &self.nodes {
            if let Some(name) = graph.node_name(node) {
                induced.set_node_name(node, name.to_string());
            }
        }
        induced
    }
}

/// Partition all nodes into maximal connected components
///
/// Repeatedly runs BFS from the lowest unvisited node, so components come out
/// ordered by their smallest member. Isolated nodes form singleton components.
///
/// # Example
///
/// ```
/// use keynode_graph::{find_components, CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(5, &[(NodeId(0), NodeId(4)), (NodeId(1), NodeId(2))])
///     .unwrap();
///
/// let components = find_components(&graph);
/// let sizes: Vec<_> = components.iter().map(|c| c.len()).collect();
/// assert_eq!(sizes, vec![2, 2, 1]);
/// ```
#[must_use]
pub fn find_components(graph: &CsrGraph) -> Vec<Component> {
    let n = graph.num_nodes();
    let mut assigned = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if assigned[start] {
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let start_id = NodeId(start as u32);
        // start < n, so the search cannot fail
        let Ok(bfs) = breadth_first_search(graph, start_id) else {
            continue;
        };

        let mut nodes: Vec<NodeId> = bfs.reached().collect();
        for node in &nodes {
            assigned[node.index()] = true;
        }
        nodes.sort_unstable();
        components.push(Component { nodes });
    }

    components
}

/// Sizes of all components, in `find_components` order
#[must_use]
pub fn component_sizes(graph: &CsrGraph) -> Vec<usize> {
    find_components(graph).iter().map(Component::len).collect()
}

/// Component with the most nodes (the first one on ties)
#[must_use]
pub fn largest_component(components: &[Component]) -> Option<&Component> {
    components
        .iter()
        .fold(None, |best: Option<&Component>, c| match best {
            Some(b) if b.len() >= c.len() => Some(b),
            _ => Some(c),
        })
}

/// True iff one BFS from node 0 reaches every node
///
/// An empty graph has no components and is not connected.
#[must_use]
pub fn is_connected(graph: &CsrGraph) -> bool {
    if graph.num_nodes() == 0 {
        return false;
    }
    breadth_first_search(graph, NodeId(0)).is_ok_and(|bfs| bfs.num_reached() == graph.num_nodes())
}

/// Local clustering coefficient `2L / (k(k-1))`
///
/// `k` is the number of neighbors and `L` the number of edges among them.
/// Nodes with fewer than two neighbors have coefficient `0`.
///
/// # Errors
///
/// Returns error if `node` is out of bounds
pub fn clustering_coefficient(graph: &CsrGraph, node: NodeId) -> Result<f64> {
    let neighbors = graph.neighbors(node)?;
    let k = neighbors.len();
    if k < 2 {
        return Ok(0.0);
    }

    let links: usize = neighbors
        .iter()
        .enumerate()
        .map(|(i, &a)| {
            neighbors[i + 1..]
                .iter()
                .filter(|&&b| graph.has_edge(NodeId(a), NodeId(b)))
                .count()
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let coefficient = 2.0 * links as f64 / (k * (k - 1)) as f64;
    Ok(coefficient)
}
