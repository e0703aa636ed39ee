//! Key-node analysis example
//!
//! Demonstrates fragmentation scoring, greedy key-node selection and the
//! flow-based source search on a small two-cell network
//!
//! Run with: RUST_LOG=debug cargo run --example key_nodes

use keynode_graph::{
    average_distance, clustering_coefficient, diameter, export_scores_parquet, find_components,
    find_key_nodes, rank_nodes, select_flow_sources_in_graph, CsrGraph, FlowConfig,
    GreedyConfig, Measure, NodeId, RelationLabels,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🦀 keynode-graph: key-node analysis\n");

    // 1. Build the network: two cells joined through a courier
    println!("📊 Building network...");
    let mut edges = vec![
        // Cell A
        (0, 1),
        (0, 2),
        (1, 2),
        (2, 3),
        // Cell B
        (5, 6),
        (5, 7),
        (6, 7),
        (7, 8),
        // Courier links
        (3, 4),
        (4, 5),
    ];
    // Family tie inside cell A
    edges.push((1, 3));
    let edges: Vec<_> = edges.into_iter().map(|(a, b)| (NodeId(a), NodeId(b))).collect();
    let mut graph = CsrGraph::from_edge_list(9, &edges)?;

    let names = [
        "amir", "bela", "chen", "dara", "eli", "fenna", "goran", "hana", "ivo",
    ];
    for (id, name) in names.iter().enumerate() {
        graph.set_node_name(NodeId(id as u32), (*name).to_string());
    }

    println!(
        "  ✅ Network built: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    println!(
        "  • components: {}, diameter: {}, average distance: {:.3}",
        find_components(&graph).len(),
        diameter(&graph),
        average_distance(&graph)
    );
    println!(
        "  • clustering of {}: {:.3}\n",
        names[2],
        clustering_coefficient(&graph, NodeId(2))?
    );

    // 2. Single-removal ranking
    println!("🔍 Ranking nodes by F-measure...");
    let ranking = rank_nodes(&graph, Measure::FMeasure);
    for (node, score) in ranking.iter().take(3) {
        let name = graph.node_name(*node).unwrap_or("unknown");
        println!("    {name} (score: {score:.4})");
    }

    // 3. Greedy selection under each measure
    println!("\n🎯 Greedy key-node selection...");
    for measure in [Measure::FMeasure, Measure::FdMeasure, Measure::Combined] {
        let selection = find_key_nodes(&graph, &GreedyConfig::new(measure))?;
        let chosen: Vec<_> = selection
            .removed
            .iter()
            .map(|node| graph.node_name(*node).unwrap_or("unknown"))
            .collect();
        println!(
            "  {measure:?}: {chosen:?} (objective {:.3}, {:?})",
            selection.final_objective().unwrap_or_default(),
            selection.halt
        );
    }

    // 4. Flow-based sources
    println!("\n🌊 Flow-based source search...");
    let flow = select_flow_sources_in_graph(&graph, &FlowConfig::default())?;
    for round in &flow.rounds {
        let sources: Vec<_> = round
            .sources
            .iter()
            .map(|node| graph.node_name(*node).unwrap_or("unknown"))
            .collect();
        println!(
            "  k = {}: {sources:?} (objective {:.3}, penalized {:.3})",
            round.size, round.objective, round.penalized
        );
    }
    if let Some(best) = flow.best() {
        println!("  ✅ Best set size: {}", best.size);
    }

    // 5. Export scores with relation labels
    println!("\n💾 Exporting scores to Parquet...");
    let mut labels = vec![vec![0_i8; 9]; 9];
    for (a, b) in graph.edges() {
        let code = if (a, b) == (NodeId(1), NodeId(3)) { -2 } else { 1 };
        labels[a.index()][b.index()] = code;
        labels[b.index()][a.index()] = code;
    }
    let labels = RelationLabels::new(&graph, &labels)?;

    let path = std::env::temp_dir().join("key_nodes");
    let scores = Measure::Combined.scores(&graph);
    export_scores_parquet(&path, &graph, &scores, Some(&labels)).await?;
    graph.write_parquet(&path).await?;
    println!("  ✅ Saved to {}_scores.parquet", path.display());
    println!("  ✅ Saved to {}_relations.parquet", path.display());

    let loaded = CsrGraph::read_parquet(&path).await?;
    println!(
        "  ✅ Reloaded: {} nodes, {} edges",
        loaded.num_nodes(),
        loaded.num_edges()
    );

    Ok(())
}
