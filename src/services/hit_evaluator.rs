//! Scoring of retrieved hits against a motif's known instances.
//!
//! The motif's first instance (or a substitute query) is retrieved; every
//! other instance is then looked up among the hits. An instance counts as
//! recovered when at least one hit shares a residue with it, and its rank is
//! the rank of the best-scoring such hit.

use crate::models::{
    CandidateHit, EvaluationRecord, IndexId, InstanceOutcome, Motif, MotifInstance,
    RetrievalResult, rank_of_score,
};
use crate::services::RetrievalClient;
use crate::storage::StructuralIndex;
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::instrument;

/// Evaluates how well retrieval recovers a motif's instances.
#[derive(Debug, Clone)]
pub struct HitEvaluator {
    client: RetrievalClient,
    depth: usize,
}

impl HitEvaluator {
    /// Creates an evaluator that trims queries up to `depth`.
    #[must_use]
    pub const fn new(client: RetrievalClient, depth: usize) -> Self {
        Self { client, depth }
    }

    /// Returns the retrieval client.
    #[must_use]
    pub const fn client(&self) -> &RetrievalClient {
        &self.client
    }

    /// Returns the maximum trimming depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Retrieves with `query` (default: the motif's first instance) and
    /// scores the hits against the motif's other instances.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval fails or the index fails for a reason
    /// other than an unknown node.
    #[instrument(
        skip(self, motif, query),
        fields(motif = %motif.id(), substitute_query = query.is_some())
    )]
    pub fn evaluate(
        &self,
        motif: &Motif,
        query: Option<&MotifInstance>,
    ) -> Result<EvaluationRecord> {
        let query = query.unwrap_or_else(|| motif.query_instance());
        let retrieval = self.client.retrieve(query, self.depth)?;
        let record = score_hits(motif.alternatives(), &retrieval.result, self.client.index())?;
        tracing::debug!(
            candidates = record.candidate_count,
            matched = record.matched_count,
            failed = record.fail_count,
            mean_rank = record.mean_rank,
            "evaluated motif"
        );
        Ok(record)
    }
}

/// Scores a retrieval result against alternative instances.
///
/// # Errors
///
/// Returns the index's error for any translation failure other than
/// [`Error::UnknownNode`], which only fails the affected instance.
pub fn score_hits(
    alternatives: &[MotifInstance],
    result: &RetrievalResult,
    index: &dyn StructuralIndex,
) -> Result<EvaluationRecord> {
    if result.is_empty() {
        tracing::debug!(alternatives = alternatives.len(), "empty retrieval");
        return Ok(EvaluationRecord::empty_retrieval(alternatives.len()));
    }

    let descending = result.descending_scores();
    let outcomes = alternatives
        .iter()
        .map(|instance| score_instance(instance, result, &descending, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(EvaluationRecord::from_outcomes(outcomes, result.len()))
}

fn score_instance(
    instance: &MotifInstance,
    result: &RetrievalResult,
    descending: &[f64],
    index: &dyn StructuralIndex,
) -> Result<InstanceOutcome> {
    let translated: Result<BTreeSet<IndexId>> = instance
        .nodes()
        .iter()
        .map(|node| index.to_index_id(node))
        .collect();
    let ids = match translated {
        Ok(ids) => ids,
        Err(Error::UnknownNode(node)) => {
            metrics::counter!("motif_unknown_node_total").increment(1);
            tracing::warn!(
                node = %node,
                graph = instance.graph_name(),
                "instance residue missing from index, counted as failed"
            );
            return Ok(InstanceOutcome::Unmapped);
        }
        Err(e) => return Err(e),
    };

    let mut best: Option<&CandidateHit> = None;
    let mut best_score = SCORE_FLOOR;
    for hit in result {
        if hit.intersects(&ids) && hit.score() > best_score {
            best_score = hit.score();
            best = Some(hit);
        }
    }

    Ok(best
        .and_then(|hit| {
            rank_of_score(descending, hit.score()).map(|rank| InstanceOutcome::Matched {
                rank,
                score: hit.score(),
            })
        })
        .unwrap_or(InstanceOutcome::NoOverlap))
}

/// Overlapping hits must score strictly above this to count; NaN never does.
const SCORE_FLOOR: f64 = -1.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{hits, index, instance, motif, nodes, provider};
    use crate::storage::InMemoryStructuralIndex;
    use std::sync::Arc;

    fn evaluator(index: InMemoryStructuralIndex) -> HitEvaluator {
        HitEvaluator::new(RetrievalClient::new(Arc::new(provider(3)), Arc::new(index)), 1)
    }

    #[test]
    fn test_best_hit_is_rank_zero() {
        let mut idx = index(3);
        let recorded = hits(
            &idx,
            &[
                (nodes("g2", 0..3), 0.4),
                (nodes("g1", 4..7), 0.9),
                (nodes("g1", 10..12), 0.2),
            ],
        );
        idx.record(&nodes("g0", 4..7), recorded);

        let m = motif("1", vec![instance("g0", 3..8), instance("g1", 3..8)]);
        let record = evaluator(idx).evaluate(&m, None).unwrap();
        assert_eq!(record.outcomes, vec![InstanceOutcome::Matched { rank: 0, score: 0.9 }]);
        assert!(record.mean_rank.abs() < f64::EPSILON);
        assert_eq!(record.fail_count, 0);
        assert_eq!(record.candidate_count, 3);
    }

    #[test]
    fn test_unknown_node_fails_instance() {
        let mut idx = index(1);
        let recorded = hits(&idx, &[(nodes("g0", 0..2), 0.5)]);
        idx.record(&nodes("g0", 4..7), recorded);

        // g1 residues are not mapped in a one-graph index
        let m = motif("2", vec![instance("g0", 3..8), instance("g1", 3..8)]);
        let record = evaluator(idx).evaluate(&m, None).unwrap();
        assert_eq!(record.outcomes, vec![InstanceOutcome::Unmapped]);
        assert_eq!(record.fail_count, 1);
        assert!((record.fail_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_retrieval() {
        let m = motif(
            "3",
            vec![instance("g0", 3..8), instance("g1", 3..8), instance("g2", 3..8)],
        );
        let record = evaluator(index(3)).evaluate(&m, None).unwrap();
        assert!(record.empty_retrieval);
        assert_eq!(record.fail_count, 2);
        assert!((record.rank_ratio - 1.0).abs() < f64::EPSILON);
        assert!((record.fail_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ties_share_first_rank() {
        let idx = index(2);
        let result = hits(
            &idx,
            &[
                (nodes("g0", 0..2), 0.7),
                (nodes("g1", 0..2), 0.7),
                (nodes("g1", 1..3), 0.7),
            ],
        );
        let alternatives = [instance("g1", 2..4)];
        let record = score_hits(&alternatives, &result, &idx).unwrap();
        assert_eq!(record.outcomes, vec![InstanceOutcome::Matched { rank: 0, score: 0.7 }]);
    }

    #[test]
    fn test_strictly_highest_overlap_wins() {
        let idx = index(2);
        let result = hits(
            &idx,
            &[
                (nodes("g1", 0..3), 0.3),
                (nodes("g0", 0..3), 0.95),
                (nodes("g1", 2..5), 0.6),
                (nodes("g0", 5..8), 0.8),
            ],
        );
        let alternatives = [instance("g1", 2..3), instance("g1", 15..17)];
        let record = score_hits(&alternatives, &result, &idx).unwrap();
        assert_eq!(
            record.outcomes,
            vec![
                InstanceOutcome::Matched { rank: 2, score: 0.6 },
                InstanceOutcome::NoOverlap
            ]
        );
        assert_eq!(record.matched_count + record.fail_count, 2);
        assert!((record.mean_rank - 2.0).abs() < f64::EPSILON);
        assert!((record.rank_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scores_at_or_below_floor_never_match() {
        let idx = index(2);
        let result = hits(
            &idx,
            &[
                (nodes("g1", 0..3), f64::NAN),
                (nodes("g1", 2..5), -1.0),
                (nodes("g0", 0..3), 0.5),
            ],
        );
        let alternatives = [instance("g1", 2..3)];
        let record = score_hits(&alternatives, &result, &idx).unwrap();
        assert_eq!(record.outcomes, vec![InstanceOutcome::NoOverlap]);
        assert_eq!(record.fail_count, 1);
    }

    #[test]
    fn test_nan_does_not_shadow_later_hit() {
        let idx = index(2);
        let result = hits(&idx, &[(nodes("g1", 0..3), f64::NAN), (nodes("g1", 1..4), 0.4)]);
        let alternatives = [instance("g1", 1..2)];
        let record = score_hits(&alternatives, &result, &idx).unwrap();
        assert_eq!(record.matched_count, 1);
        assert!(matches!(
            record.outcomes[0],
            InstanceOutcome::Matched { score, .. } if (score - 0.4).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_substitute_query() {
        let mut idx = index(3);
        let recorded = hits(&idx, &[(nodes("g1", 0..3), 0.1)]);
        idx.record(&nodes("g2", 4..7), recorded);

        let m = motif("4", vec![instance("g0", 3..8), instance("g1", 1..2)]);
        let substitute = instance("g2", 3..8);
        let record = evaluator(idx).evaluate(&m, Some(&substitute)).unwrap();
        assert_eq!(record.matched_count, 1);
    }
}
