//! Motif and motif instance types.

use super::NodeId;
use crate::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a motif: the corpus it comes from plus its local id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MotifId {
    /// Corpus tag (e.g. `carnaval`, `bgsu`, `rna3dmotif`).
    pub source: String,
    /// Identifier within the corpus.
    pub local_id: String,
}

impl MotifId {
    /// Creates a new motif ID.
    #[must_use]
    pub fn new(source: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            local_id: local_id.into(),
        }
    }
}

impl fmt::Display for MotifId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.local_id)
    }
}

/// One occurrence of a motif: a non-empty, ordered list of residues in one graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NodeId>", into = "Vec<NodeId>")]
pub struct MotifInstance(Vec<NodeId>);

impl MotifInstance {
    /// Creates an instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `nodes` is empty.
    pub fn new(nodes: Vec<NodeId>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::InvalidInput(
                "motif instance must contain at least one node".to_string(),
            ));
        }
        Ok(Self(nodes))
    }

    /// Creates an instance from anything convertible into node ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no ids are given.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        Self::new(ids.into_iter().map(Into::into).collect())
    }

    /// Returns the residues of the instance in order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Returns the number of residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; instances are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first residue, which determines the home graph.
    #[must_use]
    pub fn home_node(&self) -> &NodeId {
        &self.0[0]
    }

    /// Returns the name of the home graph.
    #[must_use]
    pub fn graph_name(&self) -> &str {
        self.home_node().graph_name()
    }
}

impl TryFrom<Vec<NodeId>> for MotifInstance {
    type Error = Error;

    fn try_from(nodes: Vec<NodeId>) -> Result<Self> {
        Self::new(nodes)
    }
}

impl From<MotifInstance> for Vec<NodeId> {
    fn from(instance: MotifInstance) -> Self {
        instance.0
    }
}

/// A motif: an id plus its known instances, possibly across several graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MotifRepr")]
pub struct Motif {
    id: MotifId,
    instances: Vec<MotifInstance>,
}

/// Unchecked wire form of a [`Motif`].
#[derive(Deserialize)]
struct MotifRepr {
    id: MotifId,
    instances: Vec<MotifInstance>,
}

impl TryFrom<MotifRepr> for Motif {
    type Error = Error;

    fn try_from(repr: MotifRepr) -> Result<Self> {
        Self::new(repr.id, repr.instances)
    }
}

impl Motif {
    /// Creates a motif.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if there are no instances.
    pub fn new(id: MotifId, instances: Vec<MotifInstance>) -> Result<Self> {
        if instances.is_empty() {
            return Err(Error::InvalidInput(format!(
                "motif {id} must have at least one instance"
            )));
        }
        Ok(Self { id, instances })
    }

    /// Returns the motif id.
    #[must_use]
    pub const fn id(&self) -> &MotifId {
        &self.id
    }

    /// Returns all instances.
    #[must_use]
    pub fn instances(&self) -> &[MotifInstance] {
        &self.instances
    }

    /// Returns the first instance, the default retrieval query.
    #[must_use]
    pub fn query_instance(&self) -> &MotifInstance {
        &self.instances[0]
    }

    /// Returns every instance but the first.
    #[must_use]
    pub fn alternatives(&self) -> &[MotifInstance] {
        &self.instances[1..]
    }
}

/// Ordered collection of motifs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotifCorpus {
    motifs: Vec<Motif>,
}

impl MotifCorpus {
    /// Creates an empty corpus.
    #[must_use]
    pub const fn new() -> Self {
        Self { motifs: Vec::new() }
    }

    /// Adds a motif, replacing any existing motif with the same id in place.
    pub fn insert(&mut self, motif: Motif) {
        if let Some(existing) = self.motifs.iter_mut().find(|m| m.id == motif.id) {
            *existing = motif;
        } else {
            self.motifs.push(motif);
        }
    }

    /// Returns the number of motifs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    /// Returns true if the corpus holds no motif.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    /// Returns the motifs in order.
    #[must_use]
    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    /// Iterates over the motifs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Motif> {
        self.motifs.iter()
    }

    /// Returns the motif with the given id.
    #[must_use]
    pub fn get(&self, id: &MotifId) -> Option<&Motif> {
        self.motifs.iter().find(|m| &m.id == id)
    }

    /// Returns a copy of the corpus in an order drawn from `rng`.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut motifs = self.motifs.clone();
        motifs.shuffle(rng);
        Self { motifs }
    }
}

impl FromIterator<Motif> for MotifCorpus {
    fn from_iter<T: IntoIterator<Item = Motif>>(iter: T) -> Self {
        let mut corpus = Self::new();
        for motif in iter {
            corpus.insert(motif);
        }
        corpus
    }
}

impl<'a> IntoIterator for &'a MotifCorpus {
    type Item = &'a Motif;
    type IntoIter = std::slice::Iter<'a, Motif>;

    fn into_iter(self) -> Self::IntoIter {
        self.motifs.iter()
    }
}
