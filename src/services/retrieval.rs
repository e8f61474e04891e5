//! Retrieval of candidate hits for a motif instance.

use crate::Result;
use crate::models::{MotifInstance, RetrievalResult, StructuralGraph};
use crate::services::neighborhood::{TrimOutcome, trim_with_retry};
use crate::storage::{StructuralGraphProvider, StructuralIndex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Outcome of one retrieval.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Home graph of the query instance.
    pub whole: Arc<StructuralGraph>,
    /// How the query was trimmed before being sent.
    pub trim: TrimOutcome,
    /// What the index returned.
    pub result: RetrievalResult,
    /// Wall-clock time of the whole retrieval.
    pub elapsed: Duration,
}

/// Sends trimmed motif instances to the structural index.
///
/// Holds shared handles to both collaborators and is cheap to clone.
#[derive(Clone)]
pub struct RetrievalClient {
    graphs: Arc<dyn StructuralGraphProvider>,
    index: Arc<dyn StructuralIndex>,
}

impl RetrievalClient {
    /// Creates a client over the given collaborators.
    #[must_use]
    pub fn new(graphs: Arc<dyn StructuralGraphProvider>, index: Arc<dyn StructuralIndex>) -> Self {
        Self { graphs, index }
    }

    /// Returns the graph provider.
    #[must_use]
    pub fn graphs(&self) -> &dyn StructuralGraphProvider {
        self.graphs.as_ref()
    }

    /// Returns the structural index.
    #[must_use]
    pub fn index(&self) -> &dyn StructuralIndex {
        self.index.as_ref()
    }

    /// Trims `instance` inside its home graph and queries the index.
    ///
    /// An empty result is a valid outcome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphNotFound`] if the home graph is unknown,
    /// or the index's error if the query fails.
    #[instrument(
        skip(self, instance),
        fields(graph = instance.graph_name(), residues = instance.len())
    )]
    pub fn retrieve(&self, instance: &MotifInstance, depth: usize) -> Result<Retrieval> {
        let start = Instant::now();
        let result: Result<(Arc<StructuralGraph>, TrimOutcome, RetrievalResult)> = (|| {
            let whole = self.graphs.whole_graph_for(instance.home_node())?;
            let trim = trim_with_retry(&whole, instance.nodes(), depth);
            let result = self.index.retrieve(&trim.trimmed)?;
            Ok((whole, trim, result))
        })();

        let elapsed = start.elapsed();
        let status = match &result {
            Ok((_, _, hits)) if hits.is_empty() => "empty",
            Ok(_) => "success",
            Err(_) => "error",
        };
        metrics::counter!("motif_retrieval_total", "status" => status).increment(1);
        metrics::histogram!("motif_retrieval_duration_ms").record(elapsed.as_secs_f64() * 1000.0);

        let (whole, trim, result) = result?;
        tracing::debug!(
            trimmed = trim.trimmed.len(),
            effective_depth = trim.effective_depth,
            candidates = result.len(),
            elapsed_ms = elapsed.as_millis(),
            "retrieved candidates"
        );
        Ok(Retrieval {
            whole,
            trim,
            result,
            elapsed,
        })
    }
}

impl std::fmt::Debug for RetrievalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalClient").finish_non_exhaustive()
    }
}
