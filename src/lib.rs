//! keynode-graph: key-node detection for undirected networks
//!
//! # Overview
//!
//! keynode-graph finds the nodes whose removal fragments a network the most.
//! Every node is scored by simulating its removal under one of several
//! fragmentation measures, and two selectors turn those scores into key-node
//! sets: greedy iterative removal with a penalized cumulative objective, and
//! an exhaustive search for source sets that keep every node close.
//!
//! # Quick Start
//!
//! ```
//! use keynode_graph::{find_key_nodes, CsrGraph, GreedyConfig, Measure, NodeId};
//!
//! # fn example() -> keynode_graph::Result<()> {
//! // Two triangles joined through node 2 - 3
//! let graph = CsrGraph::from_adjacency_matrix(&[
//!     vec![0, 1, 1, 0, 0, 0],
//!     vec![1, 0, 1, 0, 0, 0],
//!     vec![1, 1, 0, 1, 0, 0],
//!     vec![0, 0, 1, 0, 1, 1],
//!     vec![0, 0, 0, 1, 0, 1],
//!     vec![0, 0, 0, 1, 1, 0],
//! ])?;
//!
//! let selection = find_key_nodes(&graph, &GreedyConfig::new(Measure::FMeasure))?;
//! assert_eq!(selection.removed[0], NodeId(2));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Architecture
//!
//! - **Storage**: validated CSR (Compressed Sparse Row) graphs, reduced working
//!   copies that remember original node ids, relation labels
//! - **Persistence**: Parquet graph files and score exports (feature `storage`)
//! - **Algorithms**: BFS layering, components, distances, fragmentation
//!   measures, greedy and flow-based key-node selection
//! - **Logging**: `tracing` events; install a subscriber to see them

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod storage;

// Re-export core types
pub use algorithms::{
    arg_max, average_distance, binomial, breadth_first_search, clustering_coefficient,
    combined_objective, component_sizes, compute_obj_flow, diameter, disconnection_count,
    distance_matrix, f_measure, fd_measure, find_components, find_key_nodes,
    information_entropy, is_connected, largest_component, rank_nodes, select_flow_sources,
    select_flow_sources_in_graph, shortest_path_lengths, BfsLayers, Combinations, Component,
    DistanceMatrix, FlowConfig, FlowHalt, FlowRound, FlowSelection, GreedyConfig, GreedyHalt,
    KeyNodeSelection, Measure, SelectionError, StepScores,
};
pub use storage::{CsrGraph, NodeId, Relation, RelationLabels, ValidationError, WorkingGraph};

#[cfg(feature = "storage")]
pub use storage::parquet::export_scores_parquet;

// Error type
pub use anyhow::{Error, Result};
