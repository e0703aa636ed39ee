//! Graph storage layer
//!
//! Validated CSR graphs, reduced working copies with their original-index map,
//! relation labels, and Parquet persistence.

pub mod csr;
pub mod labels;
#[cfg(feature = "storage")]
pub mod parquet;
pub mod working;

pub use csr::{CsrGraph, NodeId, ValidationError};
pub use labels::{Relation, RelationLabels};
pub use working::WorkingGraph;
