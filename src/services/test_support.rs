//! Shared fixtures for service tests.

#![allow(clippy::unwrap_used)]

use crate::models::{
    CandidateHit, IndexId, Interaction, Motif, MotifId, MotifInstance, NodeId, RetrievalResult,
    StructuralGraph,
};
use crate::storage::{InMemoryGraphProvider, InMemoryStructuralIndex, StructuralIndex};
use std::ops::Range;

pub fn node(graph: &str, i: usize) -> NodeId {
    NodeId::new(format!("{graph}.A.{i}"))
}

pub fn nodes(graph: &str, range: Range<usize>) -> Vec<NodeId> {
    range.map(|i| node(graph, i)).collect()
}

/// Backbone path `<name>.A.0 - ... - <name>.A.{len-1}`.
pub fn path_graph(name: &str, len: usize) -> StructuralGraph {
    let mut graph = StructuralGraph::new(name);
    for i in 0..len {
        graph.add_node(node(name, i), "G");
    }
    for i in 1..len {
        graph.add_edge(node(name, i - 1), node(name, i), Interaction::new("B53"));
    }
    graph
}

pub fn instance(graph: &str, range: Range<usize>) -> MotifInstance {
    MotifInstance::new(nodes(graph, range)).unwrap()
}

pub fn motif(local_id: &str, instances: Vec<MotifInstance>) -> Motif {
    Motif::new(MotifId::new("carnaval", local_id), instances).unwrap()
}

/// Catalog of 20-residue paths named `g0`, `g1`, ...
pub fn provider(graphs: usize) -> InMemoryGraphProvider {
    (0..graphs).fold(InMemoryGraphProvider::new(), |provider, g| {
        provider.with_graph(path_graph(&format!("g{g}"), 20))
    })
}

/// Index mapping every node of the catalog built by [`provider`].
pub fn index(graphs: usize) -> InMemoryStructuralIndex {
    InMemoryStructuralIndex::new()
        .with_nodes((0..graphs).flat_map(|g| nodes(&format!("g{g}"), 0..20)))
}

/// Builds a result from native node sets and scores.
pub fn hits(index: &InMemoryStructuralIndex, sets: &[(Vec<NodeId>, f64)]) -> RetrievalResult {
    sets.iter()
        .map(|(set, score)| {
            let ids: Vec<IndexId> = set.iter().map(|n| index.to_index_id(n).unwrap()).collect();
            CandidateHit::new(ids, *score)
        })
        .collect()
}
