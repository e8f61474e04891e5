//! Property-based tests for neighborhood operations and hit scoring.
//!
//! Uses proptest to verify invariants across random residue graphs:
//! - The outer border never overlaps the node set
//! - Trimming only removes nodes and never keeps more at a larger depth
//! - `trim_with_retry` stays within its depth bounds
//! - `match_size` never exceeds its step caps
//! - Index ids round-trip
//! - Hit scoring ranks stay in range and account for every alternative
//! - Decoys are never the motif itself

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use motifscope::models::{CandidateHit, IndexId, RetrievalResult};
use motifscope::services::decoy::pick_decoy_index;
use motifscope::services::neighborhood::{
    MAX_SIZE_MATCH_ATTEMPTS, match_size, outer_border, trim, trim_with_retry,
};
use motifscope::services::score_hits;
use motifscope::storage::InMemoryStructuralIndex;
use motifscope::{Interaction, MotifInstance, NodeId, StructuralGraph, StructuralIndex};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

const MAX_NODES: usize = 24;

fn node(i: usize) -> NodeId {
    NodeId::new(format!("r.A.{i}"))
}

fn graph(size: usize, edges: &[(usize, usize)]) -> StructuralGraph {
    let mut graph = StructuralGraph::new("r");
    for i in 0..size {
        graph.add_node(node(i), "A");
    }
    for &(a, b) in edges {
        let (a, b) = (a % size, b % size);
        if a != b {
            let label = if (a + b) % 3 == 0 { "CWW" } else { "B53" };
            graph.add_edge(node(a), node(b), Interaction::new(label));
        }
    }
    graph
}

/// Distinct node ids, in first-seen order.
fn selection(size: usize, picks: &[usize]) -> Vec<NodeId> {
    let mut seen = BTreeSet::new();
    picks
        .iter()
        .map(|p| p % size)
        .filter(|p| seen.insert(*p))
        .map(node)
        .collect()
}

fn graph_and_selection() -> impl Strategy<Value = (StructuralGraph, Vec<NodeId>)> {
    (
        2..MAX_NODES,
        prop::collection::vec((0..MAX_NODES, 0..MAX_NODES), 0..48),
        prop::collection::vec(0..MAX_NODES, 1..12),
    )
        .prop_map(|(size, edges, picks)| (graph(size, &edges), selection(size, &picks)))
}

proptest! {
    /// Property: the outer border is disjoint from the set and adjacent to it.
    #[test]
    fn prop_outer_border_disjoint((graph, set) in graph_and_selection()) {
        let border = outer_border(&set, &graph);
        for node in &border {
            prop_assert!(!set.contains(node));
            prop_assert!(set.iter().any(|member| graph.edge(member, node).is_some()));
        }
    }

    /// Property: trimming returns a subsequence and is monotone in depth.
    #[test]
    fn prop_trim_monotone((graph, set) in graph_and_selection(), depth in 0usize..4) {
        let shallow = trim(&set, depth, &graph);
        let deep = trim(&set, depth + 1, &graph);

        prop_assert!(shallow.len() <= set.len());
        prop_assert!(deep.len() <= shallow.len());
        prop_assert!(deep.iter().all(|n| shallow.contains(n)));

        let positions: Vec<usize> = shallow
            .iter()
            .map(|n| set.iter().position(|m| m == n).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: `trim_with_retry` stays within its bounds.
    #[test]
    fn prop_trim_with_retry_bounds((graph, set) in graph_and_selection(), max_depth in 0usize..4) {
        let outcome = trim_with_retry(&graph, &set, max_depth);
        prop_assert!(outcome.effective_depth <= max_depth);
        prop_assert!(outcome.trimmed.len() <= set.len());
        prop_assert_eq!(outcome.subgraph.node_count(), outcome.trimmed.len());
        if outcome.effective_depth > 0 {
            prop_assert!(outcome.subgraph.has_edges());
        } else {
            prop_assert_eq!(&outcome.trimmed, &set);
        }
    }

    /// Property: `match_size` respects its step caps and leaves equal sizes alone.
    #[test]
    fn prop_match_size_caps(
        (whole, movable) in graph_and_selection(),
        target_size in 1usize..MAX_NODES,
    ) {
        let movable = whole.induced_subgraph(&movable);
        let target = graph(target_size, &[]);
        let matched = match_size(&target, &movable, &whole);

        prop_assert!(matched.shrink_steps <= MAX_SIZE_MATCH_ATTEMPTS);
        prop_assert!(matched.grow_steps <= MAX_SIZE_MATCH_ATTEMPTS);
        prop_assert!(matched.graph.nodes().all(|n| whole.contains(n)));
        if movable.node_count() == target_size {
            prop_assert_eq!(&matched.graph, &movable);
        }
        prop_assert!(matched.graph.node_count() >= 1);
    }

    /// Property: mapped nodes round-trip through index space.
    #[test]
    fn prop_index_id_roundtrip(count in 1usize..64) {
        let index = InMemoryStructuralIndex::new().with_nodes((0..count).map(node));
        let mut seen = BTreeSet::new();
        for i in 0..count {
            let id = index.to_index_id(&node(i)).unwrap();
            prop_assert!(seen.insert(id));
            prop_assert_eq!(index.to_native_id(id).unwrap(), node(i));
        }
        prop_assert!(index.to_index_id(&NodeId::new("x.A.1")).is_err());
        prop_assert!(index.to_native_id(IndexId::new(count as u64)).is_err());
    }

    /// Property: ranks stay in range and every alternative is counted once.
    #[test]
    fn prop_score_hits_accounting(
        hits in prop::collection::vec(
            (prop::collection::btree_set(0u64..40, 1..6), 0.0f64..1.0),
            1..20,
        ),
        alternatives in prop::collection::vec(prop::collection::vec(0usize..40, 1..6), 0..6),
    ) {
        let index = InMemoryStructuralIndex::new().with_nodes((0..40).map(node));
        let result: RetrievalResult = hits
            .into_iter()
            .map(|(ids, score)| CandidateHit::new(ids.into_iter().map(IndexId::new), score))
            .collect();
        let alternatives: Vec<MotifInstance> = alternatives
            .into_iter()
            .map(|picks| MotifInstance::new(picks.into_iter().map(node).collect()).unwrap())
            .collect();

        let record = score_hits(&alternatives, &result, &index).unwrap();
        prop_assert_eq!(record.fail_count + record.matched_count, alternatives.len());
        prop_assert_eq!(record.candidate_count, result.len());
        for outcome in &record.outcomes {
            if let Some(rank) = outcome.rank() {
                prop_assert!(rank < result.len());
            }
        }
        prop_assert!((0.0..=1.0).contains(&record.fail_ratio));
    }

    /// Property: a decoy is never the motif itself.
    #[test]
    fn prop_decoy_never_self(count in 0usize..20, current in 0usize..20, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        match pick_decoy_index(current, count, &mut rng) {
            Some(j) => {
                prop_assert!(count >= 2);
                prop_assert!(j < count);
                prop_assert_ne!(j, current);
            }
            None => prop_assert!(count < 2),
        }
    }
}
