//! Motif corpus pruning.
//!
//! Keeps the motifs worth evaluating: enough instances (optionally counting
//! only instances from non-redundant structures), a long enough first
//! instance, and optionally at least one non-canonical interaction inside
//! it. The first instance is taken before the non-redundant filter.

use crate::models::{Motif, MotifCorpus, MotifInstance, mean};
use crate::storage::StructuralGraphProvider;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// Pruning thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneConfig {
    /// Minimum number of instances.
    pub sparsest: usize,
    /// Minimum number of residues in the query instance.
    pub shortest: usize,
    /// Require a non-canonical edge in the query instance.
    pub require_non_canonical: bool,
    /// Graph names whose instances are kept; `None` keeps every instance.
    pub non_redundant: Option<BTreeSet<String>>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            sparsest: 3,
            shortest: 4,
            require_non_canonical: true,
            non_redundant: None,
        }
    }
}

impl PruneConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum number of instances.
    #[must_use]
    pub const fn with_sparsest(mut self, sparsest: usize) -> Self {
        self.sparsest = sparsest;
        self
    }

    /// Sets the minimum query length.
    #[must_use]
    pub const fn with_shortest(mut self, shortest: usize) -> Self {
        self.shortest = shortest;
        self
    }

    /// Enables or disables the non-canonical requirement.
    #[must_use]
    pub const fn with_require_non_canonical(mut self, required: bool) -> Self {
        self.require_non_canonical = required;
        self
    }

    /// Restricts instances to the given graph names (matched case-insensitively).
    #[must_use]
    pub fn with_non_redundant(mut self, graphs: BTreeSet<String>) -> Self {
        self.non_redundant = Some(graphs.into_iter().map(|g| g.to_lowercase()).collect());
        self
    }
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    /// Motifs that passed every filter, with non-redundant instances only.
    pub kept: MotifCorpus,
    /// Motifs examined.
    pub examined: usize,
    /// Rejected for having too few instances.
    pub sparse: usize,
    /// Rejected for a too short query instance.
    pub short: usize,
    /// Rejected for being fully canonical.
    pub canonical: usize,
    /// Rejected because the query's graph could not be loaded.
    pub missing_graph: usize,
    /// Instances seen before the non-redundant filter.
    pub instances_total: usize,
    /// Instances left after the non-redundant filter.
    pub instances_non_redundant: usize,
    /// Mean instance count of kept motifs.
    pub mean_instances: Option<f64>,
    /// Mean query length of kept motifs.
    pub mean_nodes: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Sparse,
    Short,
    Canonical,
    MissingGraph,
}

/// Filters a motif corpus.
pub struct MotifPruner {
    graphs: Arc<dyn StructuralGraphProvider>,
    config: PruneConfig,
}

impl MotifPruner {
    /// Creates a pruner.
    #[must_use]
    pub fn new(graphs: Arc<dyn StructuralGraphProvider>, config: PruneConfig) -> Self {
        Self { graphs, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Prunes the corpus.
    #[instrument(skip(self, corpus), fields(motifs = corpus.len()))]
    #[allow(clippy::cast_precision_loss)]
    pub fn prune(&self, corpus: &MotifCorpus) -> PruneReport {
        let mut report = PruneReport {
            examined: corpus.len(),
            ..PruneReport::default()
        };

        for motif in corpus {
            report.instances_total += motif.instances().len();
            let instances: Vec<_> = motif
                .instances()
                .iter()
                .filter(|instance| {
                    self.config
                        .non_redundant
                        .as_ref()
                        .is_none_or(|set| set.contains(&instance.graph_name().to_lowercase()))
                })
                .cloned()
                .collect();
            report.instances_non_redundant += instances.len();

            let candidate = Motif::new(motif.id().clone(), instances).ok();
            let checked = candidate
                .ok_or(Rejection::Sparse)
                .and_then(|m| self.check(m, motif.query_instance()));
            match checked {
                Ok(kept) => report.kept.insert(kept),
                Err(Rejection::Sparse) => report.sparse += 1,
                Err(Rejection::Short) => report.short += 1,
                Err(Rejection::Canonical) => report.canonical += 1,
                Err(Rejection::MissingGraph) => report.missing_graph += 1,
            }
        }

        report.mean_instances = mean(report.kept.iter().map(|m| m.instances().len() as f64));
        report.mean_nodes = mean(report.kept.iter().map(|m| m.query_instance().len() as f64));
        tracing::info!(
            kept = report.kept.len(),
            examined = report.examined,
            sparse = report.sparse,
            short = report.short,
            canonical = report.canonical,
            missing_graph = report.missing_graph,
            removed_instances = report.instances_total - report.instances_non_redundant,
            "pruned motifs"
        );
        report
    }

    /// Length and interaction checks look at `query`, the first instance
    /// before the non-redundant filter.
    fn check(&self, motif: Motif, query: &MotifInstance) -> Result<Motif, Rejection> {
        if motif.instances().len() < self.config.sparsest {
            return Err(Rejection::Sparse);
        }
        if query.len() < self.config.shortest {
            return Err(Rejection::Short);
        }
        if self.config.require_non_canonical {
            let whole = self.graphs.whole_graph_for(query.home_node()).map_err(|e| {
                tracing::warn!(motif = %motif.id(), error = %e, "cannot check interactions");
                Rejection::MissingGraph
            })?;
            if !self
                .graphs
                .induced_subgraph(&whole, query.nodes())
                .has_non_canonical()
            {
                return Err(Rejection::Canonical);
            }
        }
        Ok(motif)
    }
}

impl std::fmt::Debug for MotifPruner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotifPruner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interaction;
    use crate::services::test_support::{instance, motif, node, path_graph};
    use crate::storage::InMemoryGraphProvider;

    fn provider() -> Arc<InMemoryGraphProvider> {
        let mut g0 = path_graph("g0", 20);
        g0.add_edge(node("g0", 2), node("g0", 5), Interaction::new("TSH"));
        Arc::new(
            InMemoryGraphProvider::new()
                .with_graph(g0)
                .with_graph(path_graph("g1", 20))
                .with_graph(path_graph("g2", 20)),
        )
    }

    fn corpus() -> MotifCorpus {
        [
            // kept: non-canonical chord 2-5 inside the query
            motif("nc", vec![instance("g0", 1..7), instance("g1", 0..6), instance("g2", 0..6)]),
            // fully canonical query
            motif("cw", vec![instance("g1", 1..7), instance("g0", 0..6), instance("g2", 0..6)]),
            // too few instances
            motif("sp", vec![instance("g0", 1..7), instance("g1", 0..6)]),
            // query too short
            motif("sh", vec![instance("g0", 2..5), instance("g1", 0..6), instance("g2", 0..6)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_default_filters() {
        let report = MotifPruner::new(provider(), PruneConfig::new()).prune(&corpus());
        assert_eq!(report.examined, 4);
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept.motifs()[0].id().local_id, "nc");
        assert_eq!((report.sparse, report.short, report.canonical), (1, 1, 1));
        assert_eq!(report.mean_instances, Some(3.0));
        assert_eq!(report.mean_nodes, Some(6.0));
    }

    #[test]
    fn test_canonical_allowed() {
        let config = PruneConfig::new().with_require_non_canonical(false);
        let report = MotifPruner::new(provider(), config).prune(&corpus());
        assert_eq!(report.kept.len(), 2);
    }

    #[test]
    fn test_non_redundant_filter() {
        let non_redundant = ["G0".to_string(), "g1".to_string()].into();
        let config = PruneConfig::new().with_non_redundant(non_redundant);
        let report = MotifPruner::new(provider(), config).prune(&corpus());
        // every motif loses its g2 instance and falls below three instances
        assert!(report.kept.is_empty());
        assert_eq!(report.sparse, 4);
        assert_eq!(report.instances_total, 11);
        assert_eq!(report.instances_non_redundant, 8);
        assert_eq!(report.mean_nodes, None);
    }

    #[test]
    fn test_checks_use_unfiltered_first_instance() {
        // the g0 instance carries the chord but is filtered out; the
        // survivors are all three residues long
        let corpus: MotifCorpus = std::iter::once(motif(
            "nr",
            vec![
                instance("g0", 1..7),
                instance("g1", 0..3),
                instance("g2", 0..3),
                instance("g1", 5..8),
            ],
        ))
        .collect();
        let non_redundant = ["g1".to_string(), "g2".to_string()].into();
        let config = PruneConfig::new().with_non_redundant(non_redundant);
        let report = MotifPruner::new(provider(), config).prune(&corpus);

        assert_eq!((report.sparse, report.short, report.canonical), (0, 0, 0));
        assert_eq!(report.kept.len(), 1);
        let kept = &report.kept.motifs()[0];
        assert_eq!(kept.instances().len(), 3);
        assert_eq!(kept.query_instance().graph_name(), "g1");
        assert_eq!(report.mean_nodes, Some(3.0));
    }

    #[test]
    fn test_missing_graph() {
        let corpus: MotifCorpus = std::iter::once(motif(
            "x",
            vec![instance("g7", 0..6), instance("g1", 0..6), instance("g2", 0..6)],
        ))
        .collect();
        let report = MotifPruner::new(provider(), PruneConfig::new()).prune(&corpus);
        assert_eq!(report.missing_graph, 1);
    }
}
