//! Hop-count shortest paths on unweighted graphs
//!
//! Provides distance computations built on the BFS layering:
//! - `shortest_path_lengths`: Single-source distances, `+∞` outside the source's component
//! - `distance_matrix`: All-pairs distances (feeds the flow-based selector)
//! - `average_distance` / `diameter`: Mean and maximum finite pairwise distance
//!
//! # Example
//!
//! ```
//! use keynode_graph::{diameter, shortest_path_lengths, CsrGraph, NodeId};
//!
//! // Path 0 - 1 - 2, node 3 isolated
//! let graph = CsrGraph::from_edge_list(4, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))])
//!     .unwrap();
//!
//! let lengths = shortest_path_lengths(&graph, NodeId(0)).unwrap();
//! assert_eq!(lengths, vec![0.0, 1.0, 2.0, f64::INFINITY]);
//! assert_eq!(diameter(&graph), 2);
//! ```

use super::traversal::breadth_first_search;
use crate::storage::CsrGraph;
use crate::NodeId;
use anyhow::Result;

/// BFS hop distance from `source` to every node
///
/// Nodes outside the source's component get `f64::INFINITY`.
///
/// # Errors
///
/// Returns error if `source` is out of bounds
pub fn shortest_path_lengths(graph: &CsrGraph, source: NodeId) -> Result<Vec<f64>> {
    let bfs = breadth_first_search(graph, source)?;
    Ok(bfs
        .distances()
        .iter()
        .map(|d| d.map_or(f64::INFINITY, f64::from))
        .collect())
}

/// All-pairs hop distances, row-major
///
/// Symmetric with a zero diagonal; unreachable pairs hold `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    num_nodes: usize,
}

impl DistanceMatrix {
    /// Build from explicit rows
    ///
    /// Intended for callers that already hold a distance table; no metric
    /// checks are performed beyond the shape.
    ///
    /// # Errors
    ///
    /// Returns error if the rows do not form a square matrix
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            anyhow::bail!("Distance row {i} has {} entries, expected {n}", row.len());
        }
        Ok(Self {
            data: rows.iter().flatten().copied().collect(),
            num_nodes: n,
        })
    }

    /// Number of nodes (rows)
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Distance row of `node`, `None` if it is out of bounds
    #[must_use]
    pub fn row(&self, node: usize) -> Option<&[f64]> {
        (node < self.num_nodes)
            .then(|| &self.data[node * self.num_nodes..(node + 1) * self.num_nodes])
    }

    /// Distance between `a` and `b`, `None` if either is out of bounds
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        (a < self.num_nodes && b < self.num_nodes).then(|| self.data[a * self.num_nodes + b])
    }

    /// True when every pair is reachable
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|d| d.is_finite())
    }

    /// Sub-matrix over `nodes`, row `i` of the result being `nodes[i]`
    ///
    /// Hop distances inside one component do not depend on the rest of the
    /// graph, so restricting to a component's members yields that
    /// component's own distance matrix.
    ///
    /// # Errors
    ///
    /// Returns error if any node is out of bounds
    pub fn restrict(&self, nodes: &[NodeId]) -> Result<Self> {
        if let Some(node) = nodes.iter().find(|node| node.index() >= self.num_nodes) {
            anyhow::bail!("Node ID {} out of bounds", node.0);
        }
        let data = nodes
            .iter()
            .flat_map(|a| nodes.iter().map(move |b| (a.index(), b.index())))
            .map(|(a, b)| self.data[a * self.num_nodes + b])
            .collect();
        Ok(Self {
            data,
            num_nodes: nodes.len(),
        })
    }
}

/// All-pairs shortest-path lengths via one BFS per node
#[must_use]
pub fn distance_matrix(graph: &CsrGraph) -> DistanceMatrix {
    let n = graph.num_nodes();
    let mut data = Vec::with_capacity(n * n);
    for source in 0..n {
        #[allow(clippy::cast_possible_truncation)]
        let source_id = NodeId(source as u32);
        match shortest_path_lengths(graph, source_id) {
            Ok(row) => data.extend(row),
            Err(_) => data.extend(std::iter::repeat(f64::INFINITY).take(n)),
        }
    }
    DistanceMatrix { data, num_nodes: n }
}

/// Finite distances between distinct nodes that have at least one edge
fn finite_pair_distances(graph: &CsrGraph) -> impl Iterator<Item = u32> + '_ {
    (0..graph.num_nodes())
        .filter(move |&v| !graph.neighbor_slice(v).is_empty())
        .flat_map(move |v| {
            #[allow(clippy::cast_possible_truncation)]
            let source = NodeId(v as u32);
            breadth_first_search(graph, source)
                .map(|bfs| {
                    bfs.distances()
                        .iter()
                        .filter_map(|d| d.filter(|&d| d > 0))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
}

/// Mean finite shortest-path length over ordered pairs of distinct nodes
///
/// Isolated nodes are excluded. Returns `0.0` for a graph without edges.
///
/// This is a pair mean: self-distances are not counted. It differs from the
/// mean of per-node averages that include each node's zero distance to itself.
#[must_use]
pub fn average_distance(graph: &CsrGraph) -> f64 {
    let (sum, count) = finite_pair_distances(graph)
        .fold((0_u64, 0_u64), |(sum, count), d| (sum + u64::from(d), count + 1));
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / count as f64;
    mean
}

/// Longest finite shortest path (the largest component eccentricity)
///
/// Isolated nodes are excluded. Returns `0` for a graph without edges.
#[must_use]
pub fn diameter(graph: &CsrGraph) -> u32 {
    finite_pair_distances(graph).max().unwrap_or(0)
}
