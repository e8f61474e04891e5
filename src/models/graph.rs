//! Structural graph types.
//!
//! A [`StructuralGraph`] is an undirected graph over residues. Nodes carry a
//! residue label (e.g. the nucleotide) and edges carry the [`Interaction`]
//! observed between two residues.
//!
//! # Interaction Families
//!
//! | Label | Meaning | Canonical |
//! |-------|---------|-----------|
//! | `CWW` | cis Watson-Crick/Watson-Crick pair | yes |
//! | `B53`, `B35` | backbone (sequence) link | yes |
//! | anything else (`TSH`, `CHS`, ...) | non-canonical pair or stack | no |
//!
//! # Example
//!
//! ```rust
//! use motifscope::models::{Interaction, NodeId, StructuralGraph};
//!
//! let mut graph = StructuralGraph::new("1abc");
//! graph.add_edge("1abc.A.1", "1abc.A.2", Interaction::new("B53"));
//! graph.add_edge("1abc.A.1", "1abc.A.9", Interaction::new("TSH"));
//!
//! assert_eq!(graph.edge_count(), 2);
//! assert!(graph.has_non_canonical());
//! assert_eq!(NodeId::new("1abc.A.1").graph_name(), "1abc");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// Label given to nodes created implicitly by [`StructuralGraph::add_edge`].
pub const UNLABELED_RESIDUE: &str = "N";

/// Interaction labels that do not make a motif "non-canonical".
const CANONICAL_INTERACTIONS: &[&str] = &["CWW", "B53", "B35"];

/// Stable per-residue identifier, formatted `<graph>.<chain>.<resid>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new node ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the node ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name of the graph this residue belongs to.
    ///
    /// This is everything before the first `.`; an id without a dot is its
    /// own graph name.
    #[must_use]
    pub fn graph_name(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(graph, _)| graph)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a node in the structural index's id space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IndexId(u64);

impl IndexId {
    /// Creates a new index ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for IndexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Interaction type carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interaction(String);

impl Interaction {
    /// Creates a new interaction label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the interaction label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for canonical pairs and backbone links.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        CANONICAL_INTERACTIONS
            .iter()
            .any(|canonical| canonical.eq_ignore_ascii_case(&self.0))
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Undirected, node-labeled, edge-labeled residue graph.
///
/// Adjacency is kept in ordered maps so every traversal, and therefore every
/// derived subgraph, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralGraph {
    name: String,
    labels: BTreeMap<NodeId, String>,
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Interaction>>,
}

impl StructuralGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Returns the graph name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds (or relabels) a node.
    pub fn add_node(&mut self, id: impl Into<NodeId>, label: impl Into<String>) {
        let id = id.into();
        self.adjacency.entry(id.clone()).or_default();
        self.labels.insert(id, label.into());
    }

    /// Adds an undirected edge, creating missing endpoints with
    /// [`UNLABELED_RESIDUE`]. Self-loops are ignored.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        interaction: Interaction,
    ) {
        let source = source.into();
        let target = target.into();
        if source == target {
            return;
        }
        for endpoint in [&source, &target] {
            if !self.labels.contains_key(endpoint) {
                self.add_node(endpoint.clone(), UNLABELED_RESIDUE);
            }
        }
        self.adjacency
            .entry(source.clone())
            .or_default()
            .insert(target.clone(), interaction.clone());
        self.adjacency
            .entry(target)
            .or_default()
            .insert(source, interaction);
    }

    /// Returns true if the node is part of the graph.
    #[must_use]
    pub fn contains(&self, node: &NodeId) -> bool {
        self.labels.contains_key(node)
    }

    /// Returns the residue label of a node.
    #[must_use]
    pub fn label(&self, node: &NodeId) -> Option<&str> {
        self.labels.get(node).map(String::as_str)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns true if the graph has at least one edge.
    #[must_use]
    pub fn has_edges(&self) -> bool {
        self.adjacency.values().any(|neighbors| !neighbors.is_empty())
    }

    /// Iterates over node ids in order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.labels.keys()
    }

    /// Iterates over the neighbors of a node (empty for unknown nodes).
    pub fn neighbors<'a>(&'a self, node: &NodeId) -> impl Iterator<Item = &'a NodeId> + use<'a> {
        self.adjacency.get(node).into_iter().flat_map(BTreeMap::keys)
    }

    /// Returns the number of neighbors of a node.
    #[must_use]
    pub fn degree(&self, node: &NodeId) -> usize {
        self.adjacency.get(node).map_or(0, BTreeMap::len)
    }

    /// Returns the interaction between two nodes, if any.
    #[must_use]
    pub fn edge(&self, a: &NodeId, b: &NodeId) -> Option<&Interaction> {
        self.adjacency.get(a).and_then(|neighbors| neighbors.get(b))
    }

    /// Iterates over each undirected edge once, as `(smaller, larger, interaction)`.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &Interaction)> {
        self.adjacency.iter().flat_map(|(source, neighbors)| {
            neighbors
                .iter()
                .filter(move |(target, _)| source < *target)
                .map(move |(target, interaction)| (source, target, interaction))
        })
    }

    /// Returns true if any edge is a non-canonical interaction.
    #[must_use]
    pub fn has_non_canonical(&self) -> bool {
        self.edges()
            .any(|(_, _, interaction)| !interaction.is_canonical())
    }

    /// Returns the subgraph induced by `nodes`. Unknown nodes are ignored.
    #[must_use]
    pub fn induced_subgraph<'a>(&self, nodes: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let keep: BTreeSet<&NodeId> = nodes.into_iter().filter(|n| self.contains(n)).collect();
        let mut subgraph = Self::new(self.name.clone());
        for node in &keep {
            subgraph.add_node((*node).clone(), self.labels[*node].clone());
        }
        for (source, target, interaction) in self.edges() {
            if keep.contains(source) && keep.contains(target) {
                subgraph.add_edge(source.clone(), target.clone(), interaction.clone());
            }
        }
        subgraph
    }

    /// Edge-induced expansion of `roots` by `depth` hops.
    ///
    /// Every root contributes its `depth`-hop ball. The result holds the
    /// union of all balls, but only the edges whose two endpoints lie in a
    /// common ball. Edges that merely connect the outskirts of two
    /// different roots are left out. With `depth == 0` the roots come back
    /// as isolated nodes.
    #[must_use]
    pub fn border_expand<'a>(
        &self,
        roots: impl IntoIterator<Item = &'a NodeId>,
        depth: usize,
    ) -> Self {
        let mut expanded = Self::new(self.name.clone());
        for root in roots.into_iter().filter(|n| self.contains(n)) {
            let ball = self.ball(root, depth);
            for node in &ball {
                expanded.add_node((*node).clone(), self.labels[*node].clone());
            }
            for node in &ball {
                for (neighbor, interaction) in &self.adjacency[*node] {
                    if ball.contains(neighbor) {
                        expanded.add_edge((*node).clone(), neighbor.clone(), interaction.clone());
                    }
                }
            }
        }
        expanded
    }

    /// Nodes within `depth` hops of `root`, root included.
    fn ball<'a>(&'a self, root: &'a NodeId, depth: usize) -> BTreeSet<&'a NodeId> {
        let mut seen: BTreeSet<&NodeId> = BTreeSet::from([root]);
        let mut frontier: VecDeque<(&NodeId, usize)> = VecDeque::from([(root, 0)]);
        while let Some((node, hops)) = frontier.pop_front() {
            if hops == depth {
                continue;
            }
            for neighbor in self.neighbors(node) {
                if seen.insert(neighbor) {
                    frontier.push_back((neighbor, hops + 1));
                }
            }
        }
        seen
    }
}
