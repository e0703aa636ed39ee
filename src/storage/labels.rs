//! Relation labels attached to edges
//!
//! Relation files classify each tie between two people. The core measures
//! never read labels; they travel alongside the graph for export.

use super::{CsrGraph, NodeId, ValidationError};
use anyhow::Result;

/// Relationship category of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Family tie
    Family,
    /// Attended the same congregation
    Congregate,
    /// Work colleague
    Colleague,
    /// Direct contact
    Contact,
}

impl Relation {
    /// Integer code used in label matrices
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Family => -2,
            Self::Congregate => -1,
            Self::Colleague => 1,
            Self::Contact => 2,
        }
    }

    /// Decode a label-matrix entry (`0` means "no relation")
    #[must_use]
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            -2 => Some(Self::Family),
            -1 => Some(Self::Congregate),
            1 => Some(Self::Colleague),
            2 => Some(Self::Contact),
            _ => None,
        }
    }
}

/// `N×N` relation labels aligned with a graph's node indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLabels {
    codes: Vec<i8>,
    num_nodes: usize,
}

impl RelationLabels {
    /// Validate a label matrix against `graph`
    ///
    /// Every edge must carry a known relation code, every non-edge must be `0`,
    /// and the matrix must be symmetric.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on shape mismatch, unknown codes, or labels
    /// that disagree with the adjacency structure.
    pub fn new(graph: &CsrGraph, rows: &[Vec<i8>]) -> Result<Self> {
        let n = graph.num_nodes();
        if rows.len() != n {
            return Err(ValidationError::LabelShape {
                rows: rows.len(),
                cols: rows.first().map_or(0, Vec::len),
                num_nodes: n,
            }
            .into());
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != n) {
            return Err(ValidationError::LabelShape {
                rows: rows.len(),
                cols: bad.len(),
                num_nodes: n,
            }
            .into());
        }

        let mut codes = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &code) in row.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let adjacent = graph.has_edge(NodeId(i as u32), NodeId(j as u32));
                if code != 0 && Relation::from_code(code).is_none() {
                    return Err(ValidationError::UnknownRelation {
                        row: i,
                        col: j,
                        value: code,
                    }
                    .into());
                }
                if adjacent != (code != 0) || rows[j][i] != code {
                    return Err(ValidationError::LabelMismatch { row: i, col: j }.into());
                }
                codes.push(code);
            }
        }

        Ok(Self {
            codes,
            num_nodes: n,
        })
    }

    /// Relation of the edge `{a, b}`, `None` if unlabeled or out of range
    #[must_use]
    pub fn relation(&self, a: NodeId, b: NodeId) -> Option<Relation> {
        if a.index() >= self.num_nodes || b.index() >= self.num_nodes {
            return None;
        }
        Relation::from_code(self.codes[a.index() * self.num_nodes + b.index()])
    }

    /// Number of nodes the labels cover
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> CsrGraph {
        CsrGraph::from_edge_list(3, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))]).unwrap()
    }

    #[test]
    fn test_relation_codes_roundtrip() {
        for relation in [
            Relation::Family,
            Relation::Congregate,
            Relation::Colleague,
            Relation::Contact,
        ] {
            assert_eq!(Relation::from_code(relation.code()), Some(relation));
        }
        assert_eq!(Relation::from_code(0), None);
    }

    #[test]
    fn test_labels_lookup() {
        let labels =
            RelationLabels::new(&path3(), &[vec![0, -2, 0], vec![-2, 0, 2], vec![0, 2, 0]])
                .unwrap();

        assert_eq!(labels.relation(NodeId(0), NodeId(1)), Some(Relation::Family));
        assert_eq!(labels.relation(NodeId(2), NodeId(1)), Some(Relation::Contact));
        assert_eq!(labels.relation(NodeId(0), NodeId(2)), None);
        assert_eq!(labels.relation(NodeId(0), NodeId(7)), None);
    }

    #[test]
    fn test_label_on_non_edge_rejected() {
        let err = RelationLabels::new(&path3(), &[vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]])
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::LabelMismatch { row: 0, col: 2 })
        );
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = RelationLabels::new(&path3(), &[vec![0, 5, 0], vec![5, 0, 1], vec![0, 1, 0]])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::UnknownRelation { value: 5, .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = RelationLabels::new(&path3(), &[vec![0, 1], vec![1, 0]]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::LabelShape { num_nodes: 3, .. })
        ));
    }
}
