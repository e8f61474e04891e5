//! Structural graph provider trait.
//!
//! # Error Modes
//!
//! | Operation | Error | Notes |
//! |-----------|-------|-------|
//! | `whole_graph_for` | `GraphNotFound` | No graph registered under the node's home graph name |
//! | `induced_subgraph` | none | Unknown nodes are ignored |
//! | `border_expand` | none | Unknown roots are ignored |

use crate::Result;
use crate::models::{NodeId, StructuralGraph};
use std::sync::Arc;

/// Source of whole structural graphs.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn StructuralGraphProvider>`
/// - Returned graphs are shared and never mutated by the pipeline
/// - The subgraph operations have defaults on top of [`StructuralGraph`];
///   override them only if the backend can compute them natively
pub trait StructuralGraphProvider: Send + Sync {
    /// Returns the whole graph the node belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphNotFound`] if no graph holds the node's
    /// home graph name.
    fn whole_graph_for(&self, node: &NodeId) -> Result<Arc<StructuralGraph>>;

    /// Returns the subgraph of `graph` induced by `nodes`.
    fn induced_subgraph(&self, graph: &StructuralGraph, nodes: &[NodeId]) -> StructuralGraph {
        graph.induced_subgraph(nodes)
    }

    /// Returns the edge-induced `depth`-hop expansion of `nodes` in `graph`.
    fn border_expand(
        &self,
        graph: &StructuralGraph,
        nodes: &[NodeId],
        depth: usize,
    ) -> StructuralGraph {
        graph.border_expand(nodes, depth)
    }
}
