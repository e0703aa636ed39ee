//! Undirected CSR (Compressed Sparse Row) graph representation
//!
//! Networks arrive as dense `N×N` 0/1 adjacency matrices. They are validated once
//! at construction and stored as CSR with every undirected edge present in both
//! rows, so traversals never touch the dense matrix again.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 - 1, 0 - 2, 1 - 2
//!
//! CSR:
//!   row_offsets: [0, 2, 4, 6]   // Node 0: [0..2), Node 1: [2..4), Node 2: [4..6)
//!   col_indices: [1, 2, 0, 2, 0, 1]
//! ```

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use thiserror::Error;

/// Node identifier (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in index space
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Input validation failures
///
/// Raised at the construction boundary; algorithms assume a validated graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Matrix has no rows
    #[error("adjacency matrix is empty")]
    Empty,

    /// Row length differs from the number of rows
    #[error("adjacency matrix is not square: row {row} has {actual} entries, expected {expected}")]
    NotSquare {
        /// Offending row
        row: usize,
        /// Number of rows
        expected: usize,
        /// Entries in the offending row
        actual: usize,
    },

    /// Entry outside {0, 1}
    #[error("adjacency entry ({row}, {col}) is {value}, expected 0 or 1")]
    NonBinary {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending value
        value: u8,
    },

    /// Non-zero diagonal entry
    #[error("node {0} has a self-loop")]
    SelfLoop(usize),

    /// `A[i][j] != A[j][i]`
    #[error("adjacency matrix is not symmetric at ({row}, {col})")]
    Asymmetric {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },

    /// Edge endpoint beyond the declared node count
    #[error("node {node} out of range for a graph of {num_nodes} nodes")]
    NodeOutOfRange {
        /// Offending node
        node: u32,
        /// Declared node count
        num_nodes: usize,
    },

    /// Label matrix shape does not match the graph
    #[error("label matrix has shape {rows}x{cols}, graph has {num_nodes} nodes")]
    LabelShape {
        /// Label rows
        rows: usize,
        /// Columns of the first mismatching row
        cols: usize,
        /// Graph size
        num_nodes: usize,
    },

    /// Label value outside the known relation codes
    #[error("label ({row}, {col}) has unknown relation code {value}")]
    UnknownRelation {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending code
        value: i8,
    },

    /// Labels disagree with the adjacency structure
    #[error("label ({row}, {col}) is inconsistent with the adjacency matrix")]
    LabelMismatch {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },
}

/// Undirected, unweighted graph in CSR form
///
/// Invariants:
/// - every edge `{a, b}` appears in both row `a` and row `b`
/// - neighbor lists are sorted and free of duplicates and self-loops
/// - immutable once built (removal produces a new graph, see `WorkingGraph`)
///
/// # Example
///
/// ```
/// use keynode_graph::{CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_adjacency_matrix(&[
///     vec![0, 1, 1],
///     vec![1, 0, 0],
///     vec![1, 0, 0],
/// ])
/// .unwrap();
///
/// assert_eq!(graph.num_nodes(), 3);
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.neighbors(NodeId(0)).unwrap(), &[1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    /// node i's neighbors live at `col_indices[row_offsets[i]..row_offsets[i + 1]]`
    /// Length: `num_nodes` + 1
    row_offsets: Vec<u32>,

    /// Neighbor indices, both directions of every edge
    /// Length: 2 * `num_edges`
    col_indices: Vec<u32>,

    /// Node names (for reporting/export)
    node_names: HashMap<NodeId, String>,

    num_nodes: usize,
}

impl CsrGraph {
    /// Build a graph from a dense adjacency matrix
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the matrix is empty, not square, has
    /// entries outside {0, 1}, a non-zero diagonal, or is not symmetric.
    pub fn from_adjacency_matrix(rows: &[Vec<u8>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(ValidationError::Empty.into());
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ValidationError::NotSquare {
                    row: i,
                    expected: n,
                    actual: row.len(),
                }
                .into());
            }
        }

        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); n];
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                match value {
                    0 => {}
                    1 if i == j => return Err(ValidationError::SelfLoop(i).into()),
                    1 => {
                        if rows[j][i] != 1 {
                            return Err(ValidationError::Asymmetric { row: i, col: j }.into());
                        }
                        #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported
                        let j_u32 = j as u32;
                        neighbors[i].push(j_u32);
                    }
                    _ => {
                        return Err(ValidationError::NonBinary {
                            row: i,
                            col: j,
                            value,
                        }
                        .into())
                    }
                }
            }
        }

        Ok(Self::from_neighbor_lists(neighbors))
    }

    /// Build a graph from an undirected edge list
    ///
    /// Each pair is stored in both directions; repeated pairs collapse into one
    /// edge. Nodes that appear in no edge are isolated.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `num_nodes` is zero, an endpoint is out of
    /// range, or an edge is a self-loop.
    pub fn from_edge_list(num_nodes: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        if num_nodes == 0 {
            return Err(ValidationError::Empty.into());
        }

        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for &(a, b) in edges {
            for node in [a, b] {
                if node.index() >= num_nodes {
                    return Err(ValidationError::NodeOutOfRange {
                        node: node.0,
                        num_nodes,
                    }
                    .into());
                }
            }
            if a == b {
                return Err(ValidationError::SelfLoop(a.index()).into());
            }
            neighbors[a.index()].push(b.0);
            neighbors[b.index()].push(a.0);
        }

        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self::from_neighbor_lists(neighbors))
    }

    /// Assemble CSR arrays from already-validated, sorted, symmetric lists
    pub(crate) fn from_neighbor_lists(neighbors: Vec<Vec<u32>>) -> Self {
        let num_nodes = neighbors.len();
        let mut row_offsets = Vec::with_capacity(num_nodes + 1);
        let mut col_indices = Vec::with_capacity(neighbors.iter().map(Vec::len).sum());

        let mut offset = 0_u32;
        row_offsets.push(offset);
        for list in neighbors {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B edges not supported
            let len_u32 = list.len() as u32;
            offset += len_u32;
            row_offsets.push(offset);
            col_indices.extend(list);
        }

        Self {
            row_offsets,
            col_indices,
            node_names: HashMap::new(),
            num_nodes,
        }
    }

    /// Neighbors of a node, sorted ascending
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn neighbors(&self, node: NodeId) -> Result<&[u32]> {
        if node.index() >= self.num_nodes {
            return Err(anyhow!("Node ID {} out of bounds", node.0));
        }
        Ok(self.neighbor_slice(node.index()))
    }

    /// Unchecked neighbor access for in-crate traversals over `0..num_nodes`
    pub(crate) fn neighbor_slice(&self, idx: usize) -> &[u32] {
        let start = self.row_offsets[idx] as usize;
        let end = self.row_offsets[idx + 1] as usize;
        &self.col_indices[start..end]
    }

    /// Number of neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn degree(&self, node: NodeId) -> Result<usize> {
        self.neighbors(node).map(<[u32]>::len)
    }

    /// Whether the node has no incident edge
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn is_isolated(&self, node: NodeId) -> Result<bool> {
        self.degree(node).map(|d| d == 0)
    }

    /// Whether `a` and `b` are adjacent (false for out-of-range ids)
    #[must_use]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        if a.index() >= self.num_nodes || b.index() >= self.num_nodes {
            return false;
        }
        self.neighbor_slice(a.index()).binary_search(&b.0).is_ok()
    }

    /// Set node name (for reporting/export)
    pub fn set_node_name(&mut self, node: NodeId, name: String) {
        self.node_names.insert(node, name);
    }

    /// Get node name
    #[must_use]
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.node_names.get(&node).map(String::as_str)
    }

    /// Get number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of undirected edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.col_indices.len() / 2
    }

    /// Iterate over undirected edges once each, as `(a, b)` with `a < b`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        (0..self.num_nodes).flat_map(move |a| {
            #[allow(clippy::cast_possible_truncation)]
            let a_u32 = a as u32;
            self.neighbor_slice(a)
                .iter()
                .filter(move |&&b| b > a_u32)
                .map(move |&b| (NodeId(a_u32), NodeId(b)))
        })
    }

    /// Dense 0/1 adjacency matrix
    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        let mut dense = vec![vec![0_u8; self.num_nodes]; self.num_nodes];
        for (i, row) in dense.iter_mut().enumerate() {
            for &j in self.neighbor_slice(i) {
                row[j as usize] = 1;
            }
        }
        dense
    }

    /// Get CSR components `(row_offsets, col_indices)`
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32]) {
        (&self.row_offsets, &self.col_indices)
    }

    /// Node names, keyed by id
    pub(crate) const fn node_names(&self) -> &HashMap<NodeId, String> {
        &self.node_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> CsrGraph {
        CsrGraph::from_adjacency_matrix(&[vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]).unwrap()
    }

    #[test]
    fn test_from_adjacency_matrix_triangle() {
        let graph = triangle();

        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_edges(), 3);

        let (row_offsets, col_indices) = graph.csr_components();
        assert_eq!(row_offsets, &[0, 2, 4, 6]);
        assert_eq!(col_indices, &[1, 2, 0, 2, 0, 1]);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let err = CsrGraph::from_adjacency_matrix(&[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Empty)
        );
    }

    #[test]
    fn test_non_square_rejected() {
        let err = CsrGraph::from_adjacency_matrix(&[vec![0, 1], vec![1]]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NotSquare {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_asymmetric_rejected() {
        let err = CsrGraph::from_adjacency_matrix(&[vec![0, 1], vec![0, 0]]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Asymmetric { row: 0, col: 1 })
        );
    }

    #[test]
    fn test_non_binary_rejected() {
        let err = CsrGraph::from_adjacency_matrix(&[vec![0, 2], vec![2, 0]]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::NonBinary { value: 2, .. })
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = CsrGraph::from_adjacency_matrix(&[vec![1, 0], vec![0, 0]]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::SelfLoop(0))
        );
    }

    #[test]
    fn test_from_edge_list_dedups() {
        let edges = vec![
            (NodeId(0), NodeId(1)),
            (NodeId(1), NodeId(0)),
            (NodeId(1), NodeId(2)),
        ];
        let graph = CsrGraph::from_edge_list(4, &edges).unwrap();

        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.neighbors(NodeId(1)).unwrap(), &[0, 2]);
        assert!(graph.is_isolated(NodeId(3)).unwrap());
    }

    #[test]
    fn test_from_edge_list_out_of_range() {
        let err = CsrGraph::from_edge_list(2, &[(NodeId(0), NodeId(5))]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::NodeOutOfRange { node: 5, .. })
        ));
    }

    #[test]
    fn test_neighbors_out_of_bounds() {
        let graph = triangle();
        assert!(graph.neighbors(NodeId(3)).is_err());
    }

    #[test]
    fn test_has_edge_symmetric() {
        let graph = CsrGraph::from_edge_list(3, &[(NodeId(0), NodeId(2))]).unwrap();
        assert!(graph.has_edge(NodeId(0), NodeId(2)));
        assert!(graph.has_edge(NodeId(2), NodeId(0)));
        assert!(!graph.has_edge(NodeId(0), NodeId(1)));
        assert!(!graph.has_edge(NodeId(0), NodeId(9)));
    }

    #[test]
    fn test_dense_roundtrip() {
        let dense = vec![
            vec![0, 1, 0, 0],
            vec![1, 0, 1, 0],
            vec![0, 1, 0, 1],
            vec![0, 0, 1, 0],
        ];
        let graph = CsrGraph::from_adjacency_matrix(&dense).unwrap();
        assert_eq!(graph.to_dense(), dense);
    }

    #[test]
    fn test_edges_listed_once() {
        let graph = triangle();
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(
            edges,
            vec![
                (NodeId(0), NodeId(1)),
                (NodeId(0), NodeId(2)),
                (NodeId(1), NodeId(2))
            ]
        );
    }

    #[test]
    fn test_node_names() {
        let mut graph = triangle();
        graph.set_node_name(NodeId(0), "alpha".to_string());

        assert_eq!(graph.node_name(NodeId(0)), Some("alpha"));
        assert_eq!(graph.node_name(NodeId(1)), None);
    }
}
