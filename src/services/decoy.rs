//! Real versus decoy query comparison over a motif corpus.
//!
//! For every motif the real query (its own first instance) is compared with
//! a decoy query: the first instance of another motif drawn at random. A
//! retrieval that is actually informative recovers the motif's instances
//! from the real query and not from the decoy.

use crate::models::{AbTestRecord, AbTestReport, HitRatioReport, MotifCorpus, SkippedMotif};
use crate::services::HitEvaluator;
use rand::Rng;
use tracing::instrument;

/// Draws the index of a motif other than `current` among `count` motifs.
///
/// Uniform over the other `count - 1` positions; `None` when there is no
/// other motif.
pub fn pick_decoy_index<R: Rng + ?Sized>(
    current: usize,
    count: usize,
    rng: &mut R,
) -> Option<usize> {
    if count < 2 {
        return None;
    }
    let drawn = rng.random_range(0..count - 1);
    Some(if drawn >= current { drawn + 1 } else { drawn })
}

/// Runs corpus-wide evaluations.
#[derive(Debug, Clone)]
pub struct DecoyHarness {
    evaluator: HitEvaluator,
}

impl DecoyHarness {
    /// Creates a harness around an evaluator.
    #[must_use]
    pub const fn new(evaluator: HitEvaluator) -> Self {
        Self { evaluator }
    }

    /// Returns the evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &HitEvaluator {
        &self.evaluator
    }

    /// Evaluates every motif with its real query and with a decoy query.
    ///
    /// Motifs whose real evaluation fails are recorded as skipped. A failed
    /// decoy evaluation leaves the decoy side of the record empty.
    #[instrument(skip(self, corpus, rng), fields(motifs = corpus.len()))]
    pub fn ab_test<R: Rng + ?Sized>(&self, corpus: &MotifCorpus, rng: &mut R) -> AbTestReport {
        let motifs = corpus.motifs();
        if motifs.len() < 2 {
            tracing::warn!(
                motifs = motifs.len(),
                "corpus too small for decoys, decoy side left empty"
            );
        }

        let mut report = AbTestReport::default();
        for (i, motif) in motifs.iter().enumerate() {
            // one draw per motif, skipped or not
            let decoy_motif = pick_decoy_index(i, motifs.len(), rng).map(|j| &motifs[j]);
            let real = match self.evaluator.evaluate(motif, None) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(motif = %motif.id(), error = %e, "skipping motif");
                    report.skipped.push(SkippedMotif {
                        motif_id: motif.id().clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let decoy = decoy_motif.and_then(|other| {
                self.evaluator
                    .evaluate(motif, Some(other.query_instance()))
                    .inspect_err(|e| {
                        tracing::warn!(
                            motif = %motif.id(),
                            decoy = %other.id(),
                            error = %e,
                            "decoy evaluation failed"
                        );
                    })
                    .ok()
            });

            report.records.push(AbTestRecord {
                motif_id: motif.id().clone(),
                real,
                decoy_source: decoy_motif.map(|other| other.id().clone()),
                decoy_query: decoy_motif.map(|other| other.query_instance().clone()),
                decoy,
            });
        }

        let real = report.real_summary(None);
        let decoy = report.decoy_summary(None);
        tracing::info!(
            evaluated = report.records.len(),
            skipped = report.skipped.len(),
            real_fail_ratio = ?real.mean_fail_ratio,
            real_rank_ratio = ?real.mean_rank_ratio,
            decoy_fail_ratio = ?decoy.mean_fail_ratio,
            decoy_rank_ratio = ?decoy.mean_rank_ratio,
            "a/b test complete"
        );
        report
    }

    /// Evaluates motifs with their real query only, stopping after
    /// `max_motifs` motifs when given.
    #[instrument(skip(self, corpus), fields(motifs = corpus.len()))]
    pub fn hit_ratio(&self, corpus: &MotifCorpus, max_motifs: Option<usize>) -> HitRatioReport {
        let limit = max_motifs.unwrap_or(usize::MAX);
        let mut report = HitRatioReport::default();
        for motif in corpus.iter().take(limit) {
            match self.evaluator.evaluate(motif, None) {
                Ok(record) => report.records.push((motif.id().clone(), record)),
                Err(e) => {
                    tracing::warn!(motif = %motif.id(), error = %e, "skipping motif");
                    report.skipped.push(SkippedMotif {
                        motif_id: motif.id().clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let summary = report.summary();
        tracing::info!(
            evaluated = summary.motifs,
            mean_fail_count = ?summary.mean_fail_count,
            mean_rank = ?summary.mean_rank,
            "hit ratio sweep complete"
        );
        report
    }
}
