//! In-memory structural index that replays recorded results.

use crate::io::snapshot::IndexSnapshot;
use crate::models::{CandidateHit, IndexId, NodeId, RetrievalResult};
use crate::storage::traits::StructuralIndex;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Structural index backed by a node map and a table of recorded answers.
///
/// Recorded results are keyed by the sorted, de-duplicated query node list,
/// so the order in which the pipeline emits the trimmed instance does not
/// matter. A query that was never recorded retrieves nothing.
///
/// Every query is logged and can be inspected with
/// [`issued_queries`](Self::issued_queries).
#[derive(Debug, Default)]
pub struct InMemoryStructuralIndex {
    to_index: HashMap<NodeId, IndexId>,
    to_native: HashMap<IndexId, NodeId>,
    recorded: HashMap<Vec<NodeId>, RetrievalResult>,
    issued: RwLock<Vec<Vec<NodeId>>>,
    /// One past the largest mapped id.
    next_id: u64,
}

impl InMemoryStructuralIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a loaded snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the node map is inconsistent or a
    /// recorded hit references an unmapped id.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {
        let mut index = Self::new();
        for entry in snapshot.nodes {
            index.register(entry.node, IndexId::new(entry.index_id))?;
        }
        for query in snapshot.queries {
            let mut result = RetrievalResult::new();
            for hit in query.hits {
                let ids: Vec<IndexId> = hit.nodes.into_iter().map(IndexId::new).collect();
                if let Some(unmapped) = ids.iter().find(|id| !index.to_native.contains_key(id)) {
                    return Err(Error::InvalidInput(format!(
                        "recorded hit references unmapped index id {unmapped}"
                    )));
                }
                result.insert(CandidateHit::new(ids, hit.score));
            }
            index.record(&query.query, result);
        }
        Ok(index)
    }

    /// Maps a node to an index id.
    ///
    /// Re-registering the same pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either side is already mapped to
    /// something else.
    pub fn register(&mut self, node: NodeId, id: IndexId) -> Result<()> {
        match (self.to_index.get(&node), self.to_native.get(&id)) {
            (Some(existing), _) if *existing != id => Err(Error::InvalidInput(format!(
                "node {node} already mapped to {existing}"
            ))),
            (_, Some(existing)) if *existing != node => Err(Error::InvalidInput(format!(
                "index id {id} already mapped to {existing}"
            ))),
            _ => {
                self.insert_mapping(node, id);
                Ok(())
            }
        }
    }

    /// Maps nodes to consecutive fresh index ids, builder style.
    ///
    /// Nodes that are already mapped keep their id.
    #[must_use]
    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        for node in nodes {
            let node = node.into();
            if !self.to_index.contains_key(&node) {
                self.insert_mapping(node, IndexId::new(self.next_id));
            }
        }
        self
    }

    fn insert_mapping(&mut self, node: NodeId, id: IndexId) {
        self.next_id = self.next_id.max(id.value().saturating_add(1));
        self.to_index.insert(node.clone(), id);
        self.to_native.insert(id, node);
    }

    /// Records the answer to a query. A later recording replaces it.
    pub fn record(&mut self, query: &[NodeId], result: RetrievalResult) {
        self.recorded.insert(Self::key(query), result);
    }

    /// Number of mapped nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.to_index.len()
    }

    /// Number of recorded queries.
    #[must_use]
    pub fn recorded_count(&self) -> usize {
        self.recorded.len()
    }

    /// Returns every query issued so far, in order.
    #[must_use]
    pub fn issued_queries(&self) -> Vec<Vec<NodeId>> {
        self.issued.read().map(|log| log.clone()).unwrap_or_default()
    }

    fn key(query: &[NodeId]) -> Vec<NodeId> {
        let mut key = query.to_vec();
        key.sort();
        key.dedup();
        key
    }
}

impl StructuralIndex for InMemoryStructuralIndex {
    fn retrieve(&self, query: &[NodeId]) -> Result<RetrievalResult> {
        if let Ok(mut log) = self.issued.write() {
            log.push(query.to_vec());
        }
        Ok(self
            .recorded
            .get(&Self::key(query))
            .cloned()
            .unwrap_or_default())
    }

    fn to_index_id(&self, node: &NodeId) -> Result<IndexId> {
        self.to_index
            .get(node)
            .copied()
            .ok_or_else(|| Error::UnknownNode(node.to_string()))
    }

    fn to_native_id(&self, id: IndexId) -> Result<NodeId> {
        self.to_native
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::snapshot::{HitRecord, NodeMapping, RecordedQuery};

    fn ids(raw: &[&str]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_round_trip_ids() {
        let index = InMemoryStructuralIndex::new().with_nodes(["a.A.1", "a.A.2", "a.A.1"]);
        assert_eq!(index.node_count(), 2);
        for node in ids(&["a.A.1", "a.A.2"]) {
            let id = index.to_index_id(&node).unwrap();
            assert_eq!(index.to_native_id(id).unwrap(), node);
        }
        assert!(matches!(
            index.to_index_id(&NodeId::new("b.A.1")),
            Err(Error::UnknownNode(_))
        ));
        assert!(index.to_native_id(IndexId::new(99)).is_err());
    }

    #[test]
    fn test_with_nodes_continues_after_registered_ids() {
        let mut index = InMemoryStructuralIndex::new();
        index.register(NodeId::new("a.A.1"), IndexId::new(10)).unwrap();
        index.register(NodeId::new("a.A.2"), IndexId::new(3)).unwrap();
        let index = index.with_nodes(["a.A.3", "a.A.1", "a.A.4"]);

        assert_eq!(index.to_index_id(&NodeId::new("a.A.1")).unwrap(), IndexId::new(10));
        assert_eq!(index.to_index_id(&NodeId::new("a.A.3")).unwrap(), IndexId::new(11));
        assert_eq!(index.to_index_id(&NodeId::new("a.A.4")).unwrap(), IndexId::new(12));
    }

    #[test]
    fn test_with_nodes_assigns_sequential_ids() {
        let nodes: Vec<String> = (0..5000).map(|i| format!("big.A.{i}")).collect();
        let index = InMemoryStructuralIndex::new().with_nodes(nodes.iter().map(String::as_str));
        assert_eq!(index.node_count(), 5000);
        let last = index.to_index_id(&NodeId::new("big.A.4999")).unwrap();
        assert_eq!(last, IndexId::new(4999));
    }

    #[test]
    fn test_register_conflicts() {
        let mut index = InMemoryStructuralIndex::new();
        index.register(NodeId::new("a.A.1"), IndexId::new(1)).unwrap();
        index.register(NodeId::new("a.A.1"), IndexId::new(1)).unwrap();
        assert!(index.register(NodeId::new("a.A.1"), IndexId::new(2)).is_err());
        assert!(index.register(NodeId::new("a.A.2"), IndexId::new(1)).is_err());
    }

    #[test]
    fn test_recorded_lookup_ignores_order() {
        let mut index = InMemoryStructuralIndex::new().with_nodes(["a.A.1", "a.A.2"]);
        let hit = CandidateHit::new([IndexId::new(0)], 0.8);
        index.record(&ids(&["a.A.2", "a.A.1"]), std::iter::once(hit).collect());

        let result = index.retrieve(&ids(&["a.A.1", "a.A.2"])).unwrap();
        assert_eq!(result.len(), 1);
        assert!(index.retrieve(&ids(&["a.A.1"])).unwrap().is_empty());
        assert_eq!(index.issued_queries().len(), 2);
    }

    #[test]
    fn test_from_snapshot() {
        let snapshot = IndexSnapshot {
            nodes: vec![
                NodeMapping {
                    node: NodeId::new("a.A.1"),
                    index_id: 10,
                },
                NodeMapping {
                    node: NodeId::new("a.A.2"),
                    index_id: 11,
                },
            ],
            queries: vec![RecordedQuery {
                query: ids(&["a.A.1"]),
                hits: vec![HitRecord {
                    nodes: vec![10, 11],
                    score: 0.5,
                }],
            }],
        };
        let index = InMemoryStructuralIndex::from_snapshot(snapshot).unwrap();
        assert_eq!(index.recorded_count(), 1);
        assert_eq!(index.to_index_id(&NodeId::new("a.A.2")).unwrap(), IndexId::new(11));

        let bad = IndexSnapshot {
            nodes: Vec::new(),
            queries: vec![RecordedQuery {
                query: ids(&["a.A.1"]),
                hits: vec![HitRecord {
                    nodes: vec![3],
                    score: 0.1,
                }],
            }],
        };
        assert!(InMemoryStructuralIndex::from_snapshot(bad).is_err());
    }
}
