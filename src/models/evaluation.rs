//! Hit evaluation records and corpus-level aggregates.

use super::{MotifId, MotifInstance};
use serde::{Deserialize, Serialize};

/// What happened to one alternative instance during hit scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstanceOutcome {
    /// A hit overlapped the instance.
    Matched {
        /// Rank of the best overlapping hit (0 = best score).
        rank: usize,
        /// Score of the best overlapping hit.
        score: f64,
    },
    /// At least one residue is unknown to the index.
    Unmapped,
    /// No hit overlapped the instance.
    NoOverlap,
}

impl InstanceOutcome {
    /// Returns the rank if the instance was matched.
    #[must_use]
    pub const fn rank(&self) -> Option<usize> {
        match self {
            Self::Matched { rank, .. } => Some(*rank),
            Self::Unmapped | Self::NoOverlap => None,
        }
    }
}

/// Per-motif retrieval statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Mean rank of the best matching hit over matched instances, or the
    /// candidate count when nothing matched.
    pub mean_rank: f64,
    /// `mean_rank / candidate_count` (1.0 for an empty retrieval).
    pub rank_ratio: f64,
    /// Alternative instances without a matching hit.
    pub fail_count: usize,
    /// `fail_count / alternatives` (0.0 when the motif has no alternatives).
    pub fail_ratio: f64,
    /// Alternative instances with a matching hit.
    pub matched_count: usize,
    /// Number of candidates the index returned.
    pub candidate_count: usize,
    /// True when the index returned no candidate at all.
    pub empty_retrieval: bool,
    /// Outcome per alternative instance, in motif order.
    pub outcomes: Vec<InstanceOutcome>,
}

impl EvaluationRecord {
    /// Record for a query that retrieved nothing: every alternative failed.
    #[must_use]
    pub fn empty_retrieval(alternatives: usize) -> Self {
        Self {
            mean_rank: 0.0,
            rank_ratio: 1.0,
            fail_count: alternatives,
            fail_ratio: 1.0,
            matched_count: 0,
            candidate_count: 0,
            empty_retrieval: true,
            outcomes: vec![InstanceOutcome::NoOverlap; alternatives],
        }
    }

    /// Aggregates per-instance outcomes against a non-empty retrieval.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_outcomes(outcomes: Vec<InstanceOutcome>, candidate_count: usize) -> Self {
        let ranks: Vec<usize> = outcomes.iter().filter_map(InstanceOutcome::rank).collect();
        let matched_count = ranks.len();
        let fail_count = outcomes.len() - matched_count;

        let mean_rank = if ranks.is_empty() {
            candidate_count as f64
        } else {
            ranks.iter().sum::<usize>() as f64 / matched_count as f64
        };
        let rank_ratio = if candidate_count == 0 {
            1.0
        } else {
            mean_rank / candidate_count as f64
        };
        let fail_ratio = if outcomes.is_empty() {
            0.0
        } else {
            fail_count as f64 / outcomes.len() as f64
        };

        Self {
            mean_rank,
            rank_ratio,
            fail_count,
            fail_ratio,
            matched_count,
            candidate_count,
            empty_retrieval: candidate_count == 0,
            outcomes,
        }
    }

    /// Number of alternative instances that were scored.
    #[must_use]
    pub const fn alternatives(&self) -> usize {
        self.fail_count + self.matched_count
    }

    /// Returns true when no alternative instance was recovered.
    #[must_use]
    pub const fn all_failed(&self) -> bool {
        self.matched_count == 0
    }
}

/// Means of the four headline statistics over a set of records.
///
/// Every mean is `None` when there was nothing to average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    /// Number of records aggregated.
    pub motifs: usize,
    /// Mean failure count.
    pub mean_fail_count: Option<f64>,
    /// Mean failure ratio.
    pub mean_fail_ratio: Option<f64>,
    /// Mean of the per-motif mean ranks.
    pub mean_rank: Option<f64>,
    /// Mean rank ratio.
    pub mean_rank_ratio: Option<f64>,
}

impl StatSummary {
    /// Summarizes the given records.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> Self {
        let records: Vec<&EvaluationRecord> = records.into_iter().collect();
        let average = |field: fn(&EvaluationRecord) -> f64| mean(records.iter().map(|r| field(r)));
        Self {
            motifs: records.len(),
            mean_fail_count: average(|r| r.fail_count as f64),
            mean_fail_ratio: average(|r| r.fail_ratio),
            mean_rank: average(|r| r.mean_rank),
            mean_rank_ratio: average(|r| r.rank_ratio),
        }
    }
}

/// Arithmetic mean, `None` for an empty sequence.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// A motif that a corpus run could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMotif {
    /// The motif.
    pub motif_id: MotifId,
    /// Why it was skipped.
    pub reason: String,
}

/// Real and decoy evaluation of one motif.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestRecord {
    /// The motif being scored.
    pub motif_id: MotifId,
    /// Evaluation with the motif's own first instance as query.
    pub real: EvaluationRecord,
    /// Motif the decoy query was drawn from.
    pub decoy_source: Option<MotifId>,
    /// The decoy query instance.
    pub decoy_query: Option<MotifInstance>,
    /// Evaluation with the decoy query, scored against this motif.
    pub decoy: Option<EvaluationRecord>,
}

/// Outcome of an A/B run over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbTestReport {
    /// One record per evaluated motif, in corpus order.
    pub records: Vec<AbTestRecord>,
    /// Motifs that could not be evaluated.
    pub skipped: Vec<SkippedMotif>,
}

impl AbTestReport {
    /// Summary of real queries, optionally restricted to one corpus tag.
    #[must_use]
    pub fn real_summary(&self, source: Option<&str>) -> StatSummary {
        StatSummary::from_records(self.filtered(source).map(|r| &r.real))
    }

    /// Summary of decoy queries, optionally restricted to one corpus tag.
    #[must_use]
    pub fn decoy_summary(&self, source: Option<&str>) -> StatSummary {
        StatSummary::from_records(self.filtered(source).filter_map(|r| r.decoy.as_ref()))
    }

    fn filtered<'a>(
        &'a self,
        source: Option<&'a str>,
    ) -> impl Iterator<Item = &'a AbTestRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| source.is_none_or(|tag| r.motif_id.source == tag))
    }
}

/// Outcome of a plain hit-ratio sweep over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitRatioReport {
    /// One record per evaluated motif, in corpus order.
    pub records: Vec<(MotifId, EvaluationRecord)>,
    /// Motifs that could not be evaluated.
    pub skipped: Vec<SkippedMotif>,
}

impl HitRatioReport {
    /// Summary over all evaluated motifs.
    #[must_use]
    pub fn summary(&self) -> StatSummary {
        StatSummary::from_records(self.records.iter().map(|(_, record)| record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_retrieval_record() {
        let record = EvaluationRecord::empty_retrieval(3);
        assert!((record.rank_ratio - 1.0).abs() < f64::EPSILON);
        assert!((record.fail_ratio - 1.0).abs() < f64::EPSILON);
        assert_eq!(record.fail_count, 3);
        assert_eq!(record.alternatives(), 3);
        assert!(record.all_failed());
        assert!(record.empty_retrieval);
    }

    #[test]
    fn test_from_outcomes_mixed() {
        let outcomes = vec![
            InstanceOutcome::Matched { rank: 0, score: 0.9 },
            InstanceOutcome::Unmapped,
            InstanceOutcome::Matched { rank: 4, score: 0.3 },
            InstanceOutcome::NoOverlap,
        ];
        let record = EvaluationRecord::from_outcomes(outcomes, 10);
        assert!((record.mean_rank - 2.0).abs() < f64::EPSILON);
        assert!((record.rank_ratio - 0.2).abs() < f64::EPSILON);
        assert_eq!(record.fail_count, 2);
        assert!((record.fail_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(record.matched_count, 2);
    }

    #[test]
    fn test_nothing_matched_uses_candidate_count() {
        let record = EvaluationRecord::from_outcomes(vec![InstanceOutcome::NoOverlap], 8);
        assert!((record.mean_rank - 8.0).abs() < f64::EPSILON);
        assert!((record.rank_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_alternatives() {
        let record = EvaluationRecord::from_outcomes(Vec::new(), 5);
        assert_eq!(record.fail_count, 0);
        assert!(record.fail_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_of_nothing_is_none() {
        let summary = StatSummary::from_records(std::iter::empty());
        assert_eq!(summary.motifs, 0);
        assert!(summary.mean_rank.is_none());
        assert!(summary.mean_fail_ratio.is_none());
    }

    #[test]
    fn test_summary_filters_by_source() {
        let record = |source: &str, rank: usize| AbTestRecord {
            motif_id: MotifId::new(source, "1"),
            real: EvaluationRecord::from_outcomes(
                vec![InstanceOutcome::Matched { rank, score: 1.0 }],
                10,
            ),
            decoy_source: None,
            decoy_query: None,
            decoy: None,
        };
        let report = AbTestReport {
            records: vec![record("carnaval", 2), record("bgsu", 6)],
            skipped: Vec::new(),
        };
        let all = report.real_summary(None);
        assert_eq!(all.motifs, 2);
        assert!((all.mean_rank.unwrap() - 4.0).abs() < f64::EPSILON);

        let carnaval = report.real_summary(Some("carnaval"));
        assert_eq!(carnaval.motifs, 1);
        assert!((carnaval.mean_rank.unwrap() - 2.0).abs() < f64::EPSILON);
        assert_eq!(report.decoy_summary(None).motifs, 0);
    }
}
