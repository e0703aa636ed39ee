//! Graph algorithms (BFS, components, fragmentation, key-node selection)
//!
//! Layered bottom-up: traversal and structure feed the fragmentation
//! measures, which drive the greedy selector; the distance matrix feeds the
//! flow-based selector directly.

pub mod flow;
pub mod fragmentation;
pub mod greedy;
pub mod shortest_path;
pub mod structure;
pub mod traversal;

pub use flow::{
    binomial, compute_obj_flow, select_flow_sources, select_flow_sources_in_graph, Combinations,
    FlowConfig, FlowHalt, FlowRound, FlowSelection, SelectionError,
};
pub use fragmentation::{
    arg_max, combined_objective, disconnection_count, f_measure, fd_measure,
    information_entropy, Measure,
};
pub use greedy::{find_key_nodes, rank_nodes, GreedyConfig, GreedyHalt, KeyNodeSelection, StepScores};
pub use shortest_path::{average_distance, diameter, distance_matrix, shortest_path_lengths, DistanceMatrix};
pub use structure::{
    clustering_coefficient, component_sizes, find_components, is_connected, largest_component,
    Component,
};
pub use traversal::{breadth_first_search, BfsLayers};
