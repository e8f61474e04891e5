//! In-memory structural graph provider.

use crate::io::snapshot::GraphCatalogSnapshot;
use crate::models::{NodeId, StructuralGraph};
use crate::storage::traits::StructuralGraphProvider;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog of whole graphs keyed by graph name.
///
/// A node resolves to its graph through the prefix of its id
/// (see [`NodeId::graph_name`]).
///
/// # Example
///
/// ```rust
/// use motifscope::models::{Interaction, NodeId, StructuralGraph};
/// use motifscope::storage::{InMemoryGraphProvider, StructuralGraphProvider};
///
/// let mut graph = StructuralGraph::new("1abc");
/// graph.add_edge("1abc.A.1", "1abc.A.2", Interaction::new("B53"));
///
/// let provider = InMemoryGraphProvider::new().with_graph(graph);
/// let whole = provider.whole_graph_for(&NodeId::new("1abc.A.2")).unwrap();
/// assert_eq!(whole.node_count(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryGraphProvider {
    graphs: HashMap<String, Arc<StructuralGraph>>,
}

impl InMemoryGraphProvider {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a loaded snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if two graphs share a name.
    pub fn from_snapshot(snapshot: GraphCatalogSnapshot) -> Result<Self> {
        let mut provider = Self::new();
        for record in snapshot.graphs {
            let graph = record.into_graph();
            if provider.graphs.contains_key(graph.name()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate graph '{}' in catalog",
                    graph.name()
                )));
            }
            provider.insert(graph);
        }
        Ok(provider)
    }

    /// Adds a graph, builder style.
    #[must_use]
    pub fn with_graph(mut self, graph: StructuralGraph) -> Self {
        self.insert(graph);
        self
    }

    /// Adds or replaces a graph under its own name.
    pub fn insert(&mut self, graph: StructuralGraph) {
        self.graphs.insert(graph.name().to_string(), Arc::new(graph));
    }

    /// Returns the graph with the given name.
    #[must_use]
    pub fn graph(&self, name: &str) -> Option<Arc<StructuralGraph>> {
        self.graphs.get(name).cloned()
    }

    /// Returns the number of graphs in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl StructuralGraphProvider for InMemoryGraphProvider {
    fn whole_graph_for(&self, node: &NodeId) -> Result<Arc<StructuralGraph>> {
        self.graph(node.graph_name())
            .ok_or_else(|| Error::GraphNotFound(node.to_string()))
    }
}
