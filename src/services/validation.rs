//! Edit distance validation of retrieved hits against decoys.
//!
//! For a motif's first instance the validator retrieves hits, samples a few
//! of them by rank and measures the edit distance between each sampled hit
//! and the query. The same is done for a decoy (another motif's first
//! instance), both resized to the query's size and unresized. Hits that are
//! genuinely similar should sit well below the decoys.
//!
//! # Compared Graphs
//!
//! | Mode | Query graph | Hit graph |
//! |------|-------------|-----------|
//! | expand (default) | induced subgraph of the full instance | hit expanded by the query's effective depth |
//! | plain | induced subgraph of the trimmed instance | induced subgraph of the hit |

use crate::models::{
    DistanceSample, EditDistance, IndexId, Motif, MotifCorpus, NodeId, SampleKey, SkippedMotif,
    StructuralGraph, ValidationRecord, ValidationReport,
};
use crate::services::decoy::pick_decoy_index;
use crate::services::neighborhood::match_size;
use crate::services::{EditDistanceOracle, RetrievalClient};
use crate::{Error, Result};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Hit ranks sampled by default.
pub const DEFAULT_SAMPLE_RANKS: &[usize] = &[0, 10, 100, 1000];

/// Validation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum trimming depth for the query.
    pub depth: usize,
    /// Time budget per edit distance computation.
    pub timeout: Duration,
    /// Ranks of the hits to compare; ranks past the end are skipped.
    pub sample_ranks: Vec<usize>,
    /// Compare the full query with expanded hits instead of the trimmed
    /// query with raw hits.
    pub expand_hits: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            timeout: Duration::from_secs(2),
            sample_ranks: DEFAULT_SAMPLE_RANKS.to_vec(),
            expand_hits: true,
        }
    }
}

impl ValidationConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum trimming depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the per-computation time budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the sampled ranks.
    #[must_use]
    pub fn with_sample_ranks(mut self, ranks: impl IntoIterator<Item = usize>) -> Self {
        self.sample_ranks = ranks.into_iter().collect();
        self
    }

    /// Enables or disables hit expansion.
    #[must_use]
    pub const fn with_expand_hits(mut self, expand: bool) -> Self {
        self.expand_hits = expand;
        self
    }
}

/// Validates retrieval quality with a bounded edit distance.
pub struct StructuralValidator {
    client: RetrievalClient,
    oracle: Arc<dyn EditDistanceOracle>,
    config: ValidationConfig,
}

impl StructuralValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new(
        client: RetrievalClient,
        oracle: Arc<dyn EditDistanceOracle>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            client,
            oracle,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates every motif of the corpus, in order.
    ///
    /// Each motif's decoy is another motif of the corpus drawn with `rng`.
    /// Motifs whose query cannot be retrieved are recorded as skipped.
    #[instrument(
        skip(self, corpus, rng),
        fields(motifs = corpus.len(), expand = self.config.expand_hits)
    )]
    pub fn validate_corpus<R: Rng + ?Sized>(
        &self,
        corpus: &MotifCorpus,
        rng: &mut R,
    ) -> ValidationReport {
        let motifs = corpus.motifs();
        let mut report = ValidationReport::default();
        for (i, motif) in motifs.iter().enumerate() {
            let decoy = pick_decoy_index(i, motifs.len(), rng).map(|j| &motifs[j]);
            match self.validate_motif(motif, decoy) {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    tracing::warn!(motif = %motif.id(), error = %e, "skipping motif");
                    report.skipped.push(SkippedMotif {
                        motif_id: motif.id().clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            validated = report.records.len(),
            skipped = report.skipped.len(),
            "validation sweep complete"
        );
        report
    }

    /// Validates one motif against its sampled hits and an optional decoy.
    ///
    /// Sampled hits that cannot be resolved and a decoy whose graph is
    /// unavailable are logged and left out of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the motif's own query cannot be retrieved.
    #[instrument(skip(self, motif, decoy), fields(motif = %motif.id()))]
    pub fn validate_motif(
        &self,
        motif: &Motif,
        decoy: Option<&Motif>,
    ) -> Result<ValidationRecord> {
        let motif_start = Instant::now();
        let query = motif.query_instance();
        let retrieval = self.client.retrieve(query, self.config.depth)?;
        let effective_depth = retrieval.trim.effective_depth;

        let query_graph = if self.config.expand_hits {
            self.client
                .graphs()
                .induced_subgraph(&retrieval.whole, query.nodes())
        } else {
            retrieval.trim.subgraph.clone()
        };

        let ranked = retrieval.result.ranked();
        let mut samples = BTreeMap::new();
        for &rank in &self.config.sample_ranks {
            let Some(hit) = ranked.get(rank) else {
                tracing::debug!(rank, candidates = ranked.len(), "no hit at rank");
                continue;
            };
            let hit_graph = match self.hit_graph(hit.nodes().iter().copied(), effective_depth) {
                Ok(graph) => graph,
                Err(e) => {
                    tracing::warn!(rank, error = %e, "cannot resolve hit, sample skipped");
                    continue;
                }
            };
            let sample = self.measure(&query_graph, &hit_graph, Some(hit.score()));
            tracing::debug!(rank, distance = %sample.distance, "hit sample");
            samples.insert(SampleKey::Rank(rank), sample);
        }

        if let Some(decoy) = decoy {
            match self.decoy_graphs(decoy, &query_graph) {
                Ok((matched, raw)) => {
                    let matched = self.measure(&query_graph, &matched, None);
                    let raw = self.measure(&query_graph, &raw, None);
                    tracing::debug!(
                        decoy = %decoy.id(),
                        matched = %matched.distance,
                        raw = %raw.distance,
                        "decoy samples"
                    );
                    samples.insert(SampleKey::DecoyMatched, matched);
                    samples.insert(SampleKey::DecoyRaw, raw);
                }
                Err(e) => {
                    tracing::warn!(decoy = %decoy.id(), error = %e, "decoy unavailable");
                }
            }
        }

        Ok(ValidationRecord {
            motif_id: motif.id().clone(),
            motif_len: query.len(),
            effective_depth,
            candidate_count: retrieval.result.len(),
            samples,
            decoy_source: decoy.map(|d| d.id().clone()),
            motif_time: motif_start.elapsed(),
        })
    }

    /// Native graph of a hit in its own home graph.
    fn hit_graph(
        &self,
        ids: impl Iterator<Item = IndexId>,
        effective_depth: usize,
    ) -> Result<StructuralGraph> {
        let index = self.client.index();
        let mut nodes = ids
            .map(|id| index.to_native_id(id))
            .collect::<Result<Vec<NodeId>>>()?;
        nodes.sort();
        let home = nodes
            .first()
            .ok_or_else(|| Error::InvalidInput("hit without nodes".to_string()))?;

        let graphs = self.client.graphs();
        let whole = graphs.whole_graph_for(home)?;
        Ok(if self.config.expand_hits {
            graphs.border_expand(&whole, &nodes, effective_depth)
        } else {
            graphs.induced_subgraph(&whole, &nodes)
        })
    }

    /// Size-matched and raw graphs of a decoy's first instance.
    fn decoy_graphs(
        &self,
        decoy: &Motif,
        query_graph: &StructuralGraph,
    ) -> Result<(StructuralGraph, StructuralGraph)> {
        let instance = decoy.query_instance();
        let graphs = self.client.graphs();
        let whole = graphs.whole_graph_for(instance.home_node())?;
        let raw = graphs.induced_subgraph(&whole, instance.nodes());
        let matched = match_size(query_graph, &raw, &whole);
        tracing::trace!(
            shrink_steps = matched.shrink_steps,
            grow_steps = matched.grow_steps,
            size = matched.graph.node_count(),
            "size-matched decoy"
        );
        Ok((matched.graph, raw))
    }

    fn measure(
        &self,
        query: &StructuralGraph,
        candidate: &StructuralGraph,
        score: Option<f64>,
    ) -> DistanceSample {
        let start = Instant::now();
        let distance = self.oracle.distance(query, candidate, self.config.timeout);
        let elapsed = start.elapsed();

        metrics::histogram!("edit_distance_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
        if matches!(distance, EditDistance::TimedOut { .. }) {
            metrics::counter!("edit_distance_timeouts_total").increment(1);
        }

        DistanceSample {
            distance,
            query_size: query.node_count(),
            candidate_size: candidate.node_count(),
            score,
            elapsed,
        }
    }
}

impl std::fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ExactEditDistance;
    use crate::services::test_support::{hits, index, instance, motif, nodes, provider};
    use crate::storage::InMemoryStructuralIndex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Always answers the same value, counting nothing.
    struct FixedOracle(EditDistance);

    impl EditDistanceOracle for FixedOracle {
        fn distance(&self, _: &StructuralGraph, _: &StructuralGraph, _: Duration) -> EditDistance {
            self.0
        }
    }

    fn recorded_index() -> InMemoryStructuralIndex {
        let mut idx = index(3);
        let recorded = hits(
            &idx,
            &[
                (nodes("g1", 4..7), 0.5),
                (nodes("g1", 10..13), 0.9),
                (nodes("g2", 0..3), 0.1),
            ],
        );
        idx.record(&nodes("g0", 4..7), recorded);
        idx
    }

    fn validator(
        oracle: Arc<dyn EditDistanceOracle>,
        config: ValidationConfig,
    ) -> StructuralValidator {
        let client = RetrievalClient::new(Arc::new(provider(3)), Arc::new(recorded_index()));
        StructuralValidator::new(client, oracle, config)
    }

    #[test]
    fn test_samples_existing_ranks_only() {
        let validator = validator(
            Arc::new(ExactEditDistance::new()),
            ValidationConfig::new().with_sample_ranks([0, 2, 10]),
        );
        let m = motif("1", vec![instance("g0", 3..8)]);
        let record = validator.validate_motif(&m, None).unwrap();

        let keys: Vec<SampleKey> = record.samples.keys().copied().collect();
        assert_eq!(keys, vec![SampleKey::Rank(0), SampleKey::Rank(2)]);
        assert_eq!(record.candidate_count, 3);
        assert_eq!(record.effective_depth, 1);
        assert_eq!(record.motif_len, 5);

        // expand mode: full 5-residue query vs hit expanded by one hop
        let best = &record.samples[&SampleKey::Rank(0)];
        assert_eq!(best.query_size, 5);
        assert_eq!(best.candidate_size, 5);
        assert_eq!(best.score, Some(0.9));
        assert_eq!(best.distance, EditDistance::exact(0.0));
    }

    #[test]
    fn test_plain_mode_uses_trimmed_query() {
        let validator = validator(
            Arc::new(ExactEditDistance::new()),
            ValidationConfig::new()
                .with_sample_ranks([1])
                .with_expand_hits(false),
        );
        let m = motif("1", vec![instance("g0", 3..8)]);
        let record = validator.validate_motif(&m, None).unwrap();
        let sample = &record.samples[&SampleKey::Rank(1)];
        assert_eq!(sample.query_size, 3);
        assert_eq!(sample.candidate_size, 3);
        assert_eq!(sample.distance.value(), Some(0.0));
    }

    #[test]
    fn test_decoy_samples() {
        let validator = validator(
            Arc::new(ExactEditDistance::new()),
            ValidationConfig::new().with_sample_ranks([0]),
        );
        let m = motif("1", vec![instance("g0", 3..8)]);
        let decoy = motif("2", vec![instance("g2", 0..8)]);
        let record = validator.validate_motif(&m, Some(&decoy)).unwrap();

        let matched = &record.samples[&SampleKey::DecoyMatched];
        let raw = &record.samples[&SampleKey::DecoyRaw];
        assert_eq!(raw.candidate_size, 8);
        assert_eq!(matched.candidate_size, 5);
        assert!(matched.distance.value().unwrap() <= raw.distance.value().unwrap());
        assert_eq!(record.decoy_source, Some(decoy.id().clone()));
    }

    #[test]
    fn test_timeouts_are_recorded() {
        let oracle = FixedOracle(EditDistance::TimedOut {
            best_upper_bound: None,
        });
        let validator = validator(Arc::new(oracle), ValidationConfig::new());
        let m = motif("1", vec![instance("g0", 3..8)]);
        let decoy = motif("2", vec![instance("g2", 3..8)]);
        let record = validator.validate_motif(&m, Some(&decoy)).unwrap();
        assert_eq!(record.timeouts(), 3);
        assert!(record.distance(SampleKey::Rank(0)).unwrap().is_timeout());
    }

    #[test]
    fn test_missing_decoy_graph_is_skipped() {
        let validator = validator(Arc::new(ExactEditDistance::new()), ValidationConfig::new());
        let m = motif("1", vec![instance("g0", 3..8)]);
        let decoy = motif("2", vec![instance("g9", 3..8)]);
        let record = validator.validate_motif(&m, Some(&decoy)).unwrap();
        assert!(record.distance(SampleKey::DecoyRaw).is_none());
    }

    #[test]
    fn test_validate_corpus() {
        let validator = validator(
            Arc::new(FixedOracle(EditDistance::exact(1.0))),
            ValidationConfig::new(),
        );
        let corpus: MotifCorpus = [
            motif("a", vec![instance("g0", 3..8)]),
            motif("b", vec![instance("g1", 3..8)]),
            motif("c", vec![instance("g5", 3..8)]),
        ]
        .into_iter()
        .collect();
        let report = validator.validate_corpus(&corpus, &mut StdRng::seed_from_u64(4));
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        for record in &report.records {
            let decoy = record.decoy_source.as_ref().unwrap();
            assert_ne!(decoy, &record.motif_id);
        }
    }
}
