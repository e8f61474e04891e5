//! Retrieval result types.

use super::IndexId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A node set returned by the structural index, with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateHit {
    nodes: BTreeSet<IndexId>,
    score: f64,
}

impl CandidateHit {
    /// Creates a hit.
    #[must_use]
    pub fn new(nodes: impl IntoIterator<Item = IndexId>, score: f64) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            score,
        }
    }

    /// Returns the index-space node set.
    #[must_use]
    pub const fn nodes(&self) -> &BTreeSet<IndexId> {
        &self.nodes
    }

    /// Returns the similarity score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Returns true if the hit shares at least one node with `other`.
    #[must_use]
    pub fn intersects(&self, other: &BTreeSet<IndexId>) -> bool {
        let (small, large) = if self.nodes.len() <= other.len() {
            (&self.nodes, other)
        } else {
            (other, &self.nodes)
        };
        small.iter().any(|id| large.contains(id))
    }
}

/// Mapping from candidate node sets to scores, in insertion order.
///
/// Node sets are unique: inserting a set that is already present updates
/// its score in place and keeps its original position, so iteration order
/// (and with it the "first encountered" tie-break) stays stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    hits: Vec<CandidateHit>,
    positions: HashMap<BTreeSet<IndexId>, usize>,
}

impl RetrievalResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a hit or updates the score of an identical node set.
    pub fn insert(&mut self, hit: CandidateHit) {
        if let Some(&position) = self.positions.get(&hit.nodes) {
            self.hits[position].score = hit.score;
            return;
        }
        self.positions.insert(hit.nodes.clone(), self.hits.len());
        self.hits.push(hit);
    }

    /// Returns the number of distinct candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the index yielded no candidate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterates over hits in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CandidateHit> {
        self.hits.iter()
    }

    /// Returns the score of an exact node set.
    #[must_use]
    pub fn score_of(&self, nodes: &BTreeSet<IndexId>) -> Option<f64> {
        self.positions.get(nodes).map(|&position| self.hits[position].score)
    }

    /// Returns every score, highest first.
    #[must_use]
    pub fn descending_scores(&self) -> Vec<f64> {
        let mut scores: Vec<f64> = self.hits.iter().map(CandidateHit::score).collect();
        scores.sort_by(|a, b| b.total_cmp(a));
        scores
    }

    /// Returns the hits ordered by descending score.
    ///
    /// Equal scores keep their insertion order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&CandidateHit> {
        let mut ranked: Vec<&CandidateHit> = self.hits.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

impl FromIterator<CandidateHit> for RetrievalResult {
    fn from_iter<T: IntoIterator<Item = CandidateHit>>(iter: T) -> Self {
        let mut result = Self::new();
        for hit in iter {
            result.insert(hit);
        }
        result
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a CandidateHit;
    type IntoIter = std::slice::Iter<'a, CandidateHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Position of `score` in a descending score list.
///
/// Equal scores share the position of their first occurrence, so tied
/// candidates collapse onto one rank.
#[must_use]
pub fn rank_of_score(descending: &[f64], score: f64) -> Option<usize> {
    descending.iter().position(|s| s.total_cmp(&score).is_eq())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<IndexId> {
        raw.iter().copied().map(IndexId::new).collect()
    }

    #[test]
    fn test_insert_updates_in_place() {
        let mut result = RetrievalResult::new();
        result.insert(CandidateHit::new(ids(&[1, 2]), 0.2));
        result.insert(CandidateHit::new(ids(&[3]), 0.5));
        result.insert(CandidateHit::new(ids(&[2, 1]), 0.9));

        assert_eq!(result.len(), 2);
        let first = result.iter().next().unwrap();
        assert!((first.score() - 0.9).abs() < f64::EPSILON);
        assert_eq!(first.nodes().len(), 2);
    }

    #[test]
    fn test_descending_scores_and_ranks() {
        let result: RetrievalResult = [
            CandidateHit::new(ids(&[1]), 0.4),
            CandidateHit::new(ids(&[2]), 0.9),
            CandidateHit::new(ids(&[3]), 0.4),
            CandidateHit::new(ids(&[4]), 0.1),
        ]
        .into_iter()
        .collect();

        let scores = result.descending_scores();
        assert_eq!(scores, vec![0.9, 0.4, 0.4, 0.1]);
        assert_eq!(rank_of_score(&scores, 0.9), Some(0));
        assert_eq!(rank_of_score(&scores, 0.4), Some(1));
        assert_eq!(rank_of_score(&scores, 0.1), Some(3));
        assert_eq!(rank_of_score(&scores, 0.7), None);

        let ranked: Vec<u64> = result
            .ranked()
            .iter()
            .map(|hit| hit.nodes().iter().next().unwrap().value())
            .collect();
        assert_eq!(ranked, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_intersects() {
        let hit = CandidateHit::new(ids(&[1, 2, 3]), 1.0);
        assert!(hit.intersects(&ids(&[3, 9]).into_iter().collect()));
        assert!(!hit.intersects(&ids(&[7, 8]).into_iter().collect()));
        assert!(!hit.intersects(&BTreeSet::new()));
    }
}
