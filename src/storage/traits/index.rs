//! Structural index trait.

use crate::Result;
use crate::models::{IndexId, NodeId, RetrievalResult};

/// Precomputed structural similarity index.
///
/// The index speaks its own id space ([`IndexId`]); the two translation
/// methods move node ids across the boundary.
///
/// # Implementor Notes
///
/// - Methods use `&self`; the index must be safe to query concurrently
/// - An empty [`RetrievalResult`] is a valid answer, not an error
/// - `to_index_id(n)` followed by `to_native_id` must give back `n`
pub trait StructuralIndex: Send + Sync {
    /// Retrieves candidates similar to the given (trimmed) node list.
    ///
    /// # Errors
    ///
    /// Returns an error if the index itself cannot be queried.
    fn retrieve(&self, query: &[NodeId]) -> Result<RetrievalResult>;

    /// Translates a node id into index space.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownNode`] if the index has no entry for the node.
    fn to_index_id(&self, node: &NodeId) -> Result<IndexId>;

    /// Translates an index id back into a node id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownNode`] if the id is not mapped.
    fn to_native_id(&self, id: IndexId) -> Result<NodeId>;
}
