//! Parquet I/O for graph persistence and score export
//!
//! Based on `DuckDB` (Raasveldt et al., SIGMOD 2019) columnar storage patterns.
//!
//! # Format
//!
//! Graphs are stored as two Parquet files:
//! - `{path}_edges.parquet`: (source, target), one row per undirected edge, source < target
//! - `{path}_nodes.parquet`: (`node_id`, name)
//!
//! Score exports are stored as:
//! - `{path}_scores.parquet`: (`node_id`, name, score)
//! - `{path}_relations.parquet`: (source, target, relation)

use super::{CsrGraph, NodeId, RelationLabels};
use anyhow::{anyhow, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int8Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

impl CsrGraph {
    /// Write graph to Parquet files
    ///
    /// Creates two files:
    /// - `{path}_edges.parquet`: Edge list (source, target)
    /// - `{path}_nodes.parquet`: Node metadata (`node_id`, name)
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails or Arrow conversion fails
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let base_path = path.as_ref();

        let (sources, targets): (Vec<u32>, Vec<u32>) =
            self.edges().map(|(a, b)| (a.0, b.0)).unzip();
        let schema = Arc::new(Schema::new(vec![
            Field::new("source", DataType::UInt32, false),
            Field::new("target", DataType::UInt32, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(sources)),
            Arc::new(UInt32Array::from(targets)),
        ];
        write_batch(&suffixed(base_path, "edges"), schema, columns)?;

        let (node_ids, names) = self.named_nodes();
        let schema = Arc::new(Schema::new(vec![
            Field::new("node_id", DataType::UInt32, false),
            Field::new("name", DataType::Utf8, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(node_ids)),
            Arc::new(StringArray::from(names)),
        ];
        write_batch(&suffixed(base_path, "nodes"), schema, columns)?;

        Ok(())
    }

    /// Read graph from Parquet files
    ///
    /// Node names of the form `node_{id}` are the defaults written for unnamed
    /// nodes and are not restored.
    ///
    /// # Errors
    ///
    /// Returns error if files don't exist, Arrow conversion fails, or the stored
    /// edges do not form a valid graph
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();

        let nodes = read_nodes(&suffixed(base_path, "nodes"))?;
        let edges = read_edges(&suffixed(base_path, "edges"))?;

        let mut graph = Self::from_edge_list(nodes.len(), &edges)?;
        for (node_id, name) in nodes {
            if name != format!("node_{}", node_id.0) {
                graph.set_node_name(node_id, name);
            }
        }

        Ok(graph)
    }

    /// Node ids and names, with `node_{id}` for unnamed nodes
    fn named_nodes(&self) -> (Vec<u32>, Vec<String>) {
        (0..self.num_nodes())
            .map(|node_id| {
                #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
                let node_u32 = node_id as u32;
                let name = self
                    .node_name(NodeId(node_u32))
                    .map_or_else(|| format!("node_{node_id}"), str::to_string);
                (node_u32, name)
            })
            .unzip()
    }
}

/// Export a per-node score vector together with the labeled edge list
///
/// Creates `{path}_scores.parquet` (`node_id`, name, score) and
/// `{path}_relations.parquet` (source, target, relation). When `labels` is
/// `None` every edge gets relation code `0`; a [`RelationLabels`] value always
/// carries a code for every edge.
///
/// # Errors
///
/// Returns error if `scores` or `labels` do not match the graph size, or if
/// file I/O or Arrow conversion fails
#[allow(clippy::unused_async)] // Async API for future I/O operations
pub async fn export_scores_parquet<P: AsRef<Path>>(
    path: P,
    graph: &CsrGraph,
    scores: &[f64],
    labels: Option<&RelationLabels>,
) -> Result<()> {
    let base_path = path.as_ref();

    if scores.len() != graph.num_nodes() {
        return Err(anyhow!(
            "Score vector has {} entries, graph has {} nodes",
            scores.len(),
            graph.num_nodes()
        ));
    }
    if let Some(labels) = labels {
        if labels.num_nodes() != graph.num_nodes() {
            return Err(anyhow!(
                "Labels cover {} nodes, graph has {} nodes",
                labels.num_nodes(),
                graph.num_nodes()
            ));
        }
    }

    let (node_ids, names) = graph.named_nodes();
    let schema = Arc::new(Schema::new(vec![
        Field::new("node_id", DataType::UInt32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(node_ids)),
        Arc::new(StringArray::from(names)),
        Arc::new(Float64Array::from(scores.to_vec())),
    ];
    write_batch(&suffixed(base_path, "scores"), schema, columns)?;

    let mut sources = Vec::new();
    let mut targets = Vec::new();
    let mut relations = Vec::new();
    for (a, b) in graph.edges() {
        sources.push(a.0);
        targets.push(b.0);
        relations.push(
            labels
                .and_then(|labels| labels.relation(a, b))
                .map_or(0, |relation| relation.code()),
        );
    }
    let schema = Arc::new(Schema::new(vec![
        Field::new("source", DataType::UInt32, false),
        Field::new("target", DataType::UInt32, false),
        Field::new("relation", DataType::Int8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(sources)),
        Arc::new(UInt32Array::from(targets)),
        Arc::new(Int8Array::from(relations)),
    ];
    write_batch(&suffixed(base_path, "relations"), schema, columns)?;

    Ok(())
}

fn suffixed(base_path: &Path, suffix: &str) -> String {
    format!("{}_{suffix}.parquet", base_path.display())
}

fn write_batch(file_path: &str, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .with_context(|| format!("Failed to create RecordBatch for {file_path}"))?;

    let file = File::create(file_path).with_context(|| format!("Failed to create {file_path}"))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn read_batches(file_path: &str) -> Result<Vec<RecordBatch>> {
    let file = File::open(file_path).with_context(|| format!("Failed to open {file_path}"))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut batches = Vec::new();
    for batch_result in reader {
        batches.push(batch_result?);
    }
    Ok(batches)
}

fn read_edges(file_path: &str) -> Result<Vec<(NodeId, NodeId)>> {
    let mut edges = Vec::new();

    for batch in read_batches(file_path)? {
        let sources = batch
            .column(0)
            .as_any()
            .downcast_ref::<UInt32Array>()
            .context("Invalid source column type")?;

        let targets = batch
            .column(1)
            .as_any()
            .downcast_ref::<UInt32Array>()
            .context("Invalid target column type")?;

        for i in 0..batch.num_rows() {
            edges.push((NodeId(sources.value(i)), NodeId(targets.value(i))));
        }
    }

    Ok(edges)
}

fn read_nodes(file_path: &str) -> Result<Vec<(NodeId, String)>> {
    let mut nodes = Vec::new();

    for batch in read_batches(file_path)? {
        let node_ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<UInt32Array>()
            .context("Invalid node_id column type")?;

        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .context("Invalid name column type")?;

        for i in 0..batch.num_rows() {
            nodes.push((NodeId(node_ids.value(i)), names.value(i).to_string()));
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn labeled_path() -> CsrGraph {
        let mut graph =
            CsrGraph::from_edge_list(3, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))])
                .unwrap();
        graph.set_node_name(NodeId(0), "alice".to_string());
        graph.set_node_name(NodeId(2), "carol".to_string());
        graph
    }

    #[tokio::test]
    async fn test_parquet_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("network");

        let graph = labeled_path();
        graph.write_parquet(&path).await.unwrap();

        let loaded = CsrGraph::read_parquet(&path).await.unwrap();

        assert_eq!(loaded.num_nodes(), 3);
        assert_eq!(loaded.num_edges(), 2);
        assert_eq!(loaded.neighbors(NodeId(1)).unwrap(), &[0, 2]);

        assert_eq!(loaded.node_name(NodeId(0)), Some("alice"));
        assert_eq!(loaded.node_name(NodeId(1)), None);
        assert_eq!(loaded.node_name(NodeId(2)), Some("carol"));
    }

    #[tokio::test]
    async fn test_isolated_nodes_survive_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sparse");

        let graph = CsrGraph::from_edge_list(4, &[(NodeId(0), NodeId(1))]).unwrap();
        graph.write_parquet(&path).await.unwrap();

        let loaded = CsrGraph::read_parquet(&path).await.unwrap();
        assert_eq!(loaded, graph);
    }

    #[tokio::test]
    async fn test_export_scores_with_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores");

        let graph = labeled_path();
        let labels =
            RelationLabels::new(&graph, &[vec![0, 1, 0], vec![1, 0, -1], vec![0, -1, 0]])
                .unwrap();

        export_scores_parquet(&path, &graph, &[0.5, 1.0, 0.5], Some(&labels))
            .await
            .unwrap();

        let batches = read_batches(&suffixed(&path, "relations")).unwrap();
        let relations = batches[0]
            .column(2)
            .as_any()
            .downcast_ref::<Int8Array>()
            .unwrap();
        assert_eq!(relations.values().to_vec(), vec![1, -1]);

        let batches = read_batches(&suffixed(&path, "scores")).unwrap();
        let scores = batches[0]
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(scores.values().to_vec(), vec![0.5, 1.0, 0.5]);
    }

    #[tokio::test]
    async fn test_export_without_labels_uses_code_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unlabeled");

        export_scores_parquet(&path, &labeled_path(), &[0.5, 1.0, 0.5], None)
            .await
            .unwrap();

        let batches = read_batches(&suffixed(&path, "relations")).unwrap();
        let relations = batches[0]
            .column(2)
            .as_any()
            .downcast_ref::<Int8Array>()
            .unwrap();
        assert_eq!(relations.values().to_vec(), vec![0, 0]);
    }

    #[tokio::test]
    async fn test_export_rejects_wrong_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad");

        let result = export_scores_parquet(&path, &labeled_path(), &[1.0], None).await;
        assert!(result.is_err());
    }
}
