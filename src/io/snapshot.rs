//! JSON snapshots backing the in-memory collaborators.
//!
//! A graph catalog snapshot lists whole graphs with labeled nodes and edges:
//!
//! ```json
//! {"graphs": [{"name": "1abc",
//!              "nodes": [{"id": "1abc.A.1", "label": "G"}],
//!              "edges": [{"source": "1abc.A.1", "target": "1abc.A.2", "interaction": "B53"}]}]}
//! ```
//!
//! An index snapshot holds the node map and the recorded query answers:
//!
//! ```json
//! {"nodes": [{"node": "1abc.A.1", "index_id": 0}],
//!  "queries": [{"query": ["1abc.A.1"], "hits": [{"nodes": [0, 4], "score": 0.93}]}]}
//! ```

use crate::models::{Interaction, NodeId, StructuralGraph};
use crate::storage::{InMemoryGraphProvider, InMemoryStructuralIndex};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Catalog of whole structural graphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphCatalogSnapshot {
    /// The graphs.
    #[serde(default)]
    pub graphs: Vec<GraphRecord>,
}

/// One graph of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Graph name, the prefix of every node id.
    pub name: String,
    /// Labeled nodes. Edge endpoints missing here get the default label.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Undirected edges.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// A labeled node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    /// Residue label.
    pub label: String,
}

/// An undirected labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// One endpoint.
    pub source: NodeId,
    /// The other endpoint.
    pub target: NodeId,
    /// Interaction type.
    pub interaction: Interaction,
}

impl GraphRecord {
    /// Builds the graph.
    #[must_use]
    pub fn into_graph(self) -> StructuralGraph {
        let mut graph = StructuralGraph::new(self.name);
        for node in self.nodes {
            graph.add_node(node.id, node.label);
        }
        for edge in self.edges {
            graph.add_edge(edge.source, edge.target, edge.interaction);
        }
        graph
    }

    /// Captures a graph.
    #[must_use]
    pub fn from_graph(graph: &StructuralGraph) -> Self {
        Self {
            name: graph.name().to_string(),
            nodes: graph
                .nodes()
                .map(|id| NodeRecord {
                    id: id.clone(),
                    label: graph.label(id).unwrap_or_default().to_string(),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|(source, target, interaction)| EdgeRecord {
                    source: source.clone(),
                    target: target.clone(),
                    interaction: interaction.clone(),
                })
                .collect(),
        }
    }
}

/// Node map and recorded answers of a structural index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Node id to index id mapping.
    #[serde(default)]
    pub nodes: Vec<NodeMapping>,
    /// Recorded query answers.
    #[serde(default)]
    pub queries: Vec<RecordedQuery>,
}

/// One entry of the node map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
    /// Native node id.
    pub node: NodeId,
    /// Id in index space.
    pub index_id: u64,
}

/// A query and the hits the index answered with, in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedQuery {
    /// The trimmed query node list.
    pub query: Vec<NodeId>,
    /// The answer.
    #[serde(default)]
    pub hits: Vec<HitRecord>,
}

/// One recorded candidate hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Index-space node ids.
    pub nodes: Vec<u64>,
    /// Similarity score.
    pub score: f64,
}

/// Reads a JSON document into `T`.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be opened or parsed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| Error::operation(format!("open {}", path.display()), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::operation(format!("parse {}", path.display()), e))
}

/// Writes `value` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::operation(format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| Error::operation("serialize_json", e))?;
    writer
        .flush()
        .map_err(|e| Error::operation(format!("flush {}", path.display()), e))
}

/// Loads a graph catalog snapshot into a provider.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or holds duplicate graphs.
pub fn load_graph_provider(path: &Path) -> Result<InMemoryGraphProvider> {
    let provider = InMemoryGraphProvider::from_snapshot(read_json(path)?)?;
    tracing::info!(graphs = provider.len(), path = %path.display(), "loaded graph catalog");
    Ok(provider)
}

/// Loads an index snapshot.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or is inconsistent.
pub fn load_index(path: &Path) -> Result<InMemoryStructuralIndex> {
    let index = InMemoryStructuralIndex::from_snapshot(read_json(path)?)?;
    tracing::info!(
        nodes = index.node_count(),
        queries = index.recorded_count(),
        path = %path.display(),
        "loaded index snapshot"
    );
    Ok(index)
}
