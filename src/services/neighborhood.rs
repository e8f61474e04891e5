//! Neighborhood operations on motif instances.
//!
//! Trimming peels the residues closest to an instance's outer border so the
//! query only keeps its core, which does not depend on the surrounding
//! structure. Size matching moves a node set toward a target size by trimming
//! or by one-hop expansion, so that decoys compare fairly against queries.
//!
//! ```text
//! whole graph:   o - o - [a - b - c - d - e] - o
//!                         ^               ^
//!                 outer border = the two o's next to a and e
//!
//! trim(depth = 1):  halo = border + one more ring = {o, a, e, ...}
//!                   core = [b, c, d] minus anything within reach
//! ```

use crate::models::{NodeId, StructuralGraph};
use std::collections::BTreeSet;

/// Upper bound on shrink steps and on grow steps in [`match_size`].
pub const MAX_SIZE_MATCH_ATTEMPTS: usize = 5;

/// Trimming depth used by each shrink step of [`match_size`].
pub const SIZE_MATCH_TRIM_DEPTH: usize = 1;

/// Nodes adjacent to the set that are not in it.
#[must_use]
pub fn outer_border(nodes: &[NodeId], graph: &StructuralGraph) -> BTreeSet<NodeId> {
    let members: BTreeSet<&NodeId> = nodes.iter().collect();
    nodes
        .iter()
        .flat_map(|node| graph.neighbors(node))
        .filter(|neighbor| !members.contains(neighbor))
        .cloned()
        .collect()
}

/// Removes the residues of `instance` that lie within `depth` rings of its
/// outer border.
///
/// The halo starts as the outer border and grows by `depth` rounds of
/// one-hop expansion in which only unseen nodes join the new ring. The
/// result keeps the instance order. A larger depth never keeps more nodes.
#[must_use]
pub fn trim(instance: &[NodeId], depth: usize, graph: &StructuralGraph) -> Vec<NodeId> {
    let border = outer_border(instance, graph);
    let mut halo: BTreeSet<&NodeId> = border.iter().collect();
    let mut ring: Vec<&NodeId> = halo.iter().copied().collect();

    for _ in 0..depth {
        let mut next = Vec::new();
        for node in ring {
            for neighbor in graph.neighbors(node) {
                if halo.insert(neighbor) {
                    next.push(neighbor);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        ring = next;
    }

    instance
        .iter()
        .filter(|node| !halo.contains(node))
        .cloned()
        .collect()
}

/// Result of [`trim_with_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    /// Surviving residues, in instance order.
    pub trimmed: Vec<NodeId>,
    /// Subgraph of the whole graph induced by `trimmed`.
    pub subgraph: StructuralGraph,
    /// Depth that produced `trimmed`; 0 means no trimming was applied.
    pub effective_depth: usize,
}

/// Trims as deep as possible while keeping at least one edge.
///
/// Depths `max_depth, max_depth - 1, ..., 1` are tried in turn and the first
/// one whose induced subgraph has an edge wins. When none does, the instance
/// comes back untrimmed with depth 0.
#[must_use]
pub fn trim_with_retry(
    graph: &StructuralGraph,
    instance: &[NodeId],
    max_depth: usize,
) -> TrimOutcome {
    for depth in (1..=max_depth).rev() {
        let trimmed = trim(instance, depth, graph);
        let subgraph = graph.induced_subgraph(&trimmed);
        if subgraph.has_edges() {
            return TrimOutcome {
                trimmed,
                subgraph,
                effective_depth: depth,
            };
        }
        tracing::trace!(depth, kept = trimmed.len(), "trim left no edge, retrying shallower");
    }

    TrimOutcome {
        trimmed: instance.to_vec(),
        subgraph: graph.induced_subgraph(instance),
        effective_depth: 0,
    }
}

/// Result of [`match_size`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMatch {
    /// The resized graph.
    pub graph: StructuralGraph,
    /// Trimming steps applied.
    pub shrink_steps: usize,
    /// Expansion steps applied.
    pub grow_steps: usize,
}

/// Moves `movable` toward the node count of `target`.
///
/// While larger, `movable` is trimmed with depth [`SIZE_MATCH_TRIM_DEPTH`]
/// inside `whole`, stopping before a step that would remove everything or
/// remove nothing. While smaller, it is replaced by its one-hop border
/// expansion in `whole`, stopping when it no longer grows. Each phase runs
/// at most [`MAX_SIZE_MATCH_ATTEMPTS`] steps, so the result may still differ
/// in size from the target. Equal sizes leave `movable` untouched.
///
/// `movable` is expected to be a subgraph of `whole`.
#[must_use]
pub fn match_size(
    target: &StructuralGraph,
    movable: &StructuralGraph,
    whole: &StructuralGraph,
) -> SizeMatch {
    let goal = target.node_count();

    let mut nodes: Vec<NodeId> = movable.nodes().cloned().collect();
    let mut shrink_steps = 0;
    while nodes.len() > goal && shrink_steps < MAX_SIZE_MATCH_ATTEMPTS {
        let trimmed = trim(&nodes, SIZE_MATCH_TRIM_DEPTH, whole);
        if trimmed.is_empty() || trimmed.len() == nodes.len() {
            break;
        }
        nodes = trimmed;
        shrink_steps += 1;
    }

    let mut graph = movable.induced_subgraph(&nodes);
    let mut grow_steps = 0;
    while graph.node_count() < goal && grow_steps < MAX_SIZE_MATCH_ATTEMPTS {
        let grown = whole.border_expand(graph.nodes(), 1);
        grow_steps += 1;
        let stalled = grown.node_count() <= graph.node_count();
        graph = grown;
        if stalled {
            break;
        }
    }

    SizeMatch {
        graph,
        shrink_steps,
        grow_steps,
    }
}
