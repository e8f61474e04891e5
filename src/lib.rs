//! # Motifscope
//!
//! Retrieval and validation of recurring structural motifs in labeled
//! residue graphs.
//!
//! Given one instance of a motif (a small connected set of residues in one
//! structural graph), motifscope:
//!
//! - trims the instance to a border-independent core,
//! - queries a precomputed structural index for similar node sets ("hits"),
//! - scores how well those hits recover the motif's other known instances,
//! - compares real queries against random decoy queries across a corpus,
//! - validates sampled hits with a bounded graph edit distance against
//!   size-matched decoys.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use motifscope::services::{DecoyHarness, HitEvaluator, RetrievalClient};
//! use rand::SeedableRng;
//!
//! let client = RetrievalClient::new(graphs, index);
//! let harness = DecoyHarness::new(HitEvaluator::new(client, 1));
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let report = harness.ab_test(&corpus, &mut rng);
//! println!("{:?}", report.real_summary(None));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::MotifscopeConfig;
pub use models::{
    CandidateHit, EditDistance, EvaluationRecord, IndexId, Interaction, Motif, MotifCorpus,
    MotifId, MotifInstance, NodeId, RetrievalResult, StructuralGraph, ValidationRecord,
};
pub use services::{
    DecoyHarness, EditDistanceOracle, ExactEditDistance, HitEvaluator, MotifPruner,
    RetrievalClient, StructuralValidator,
};
pub use storage::{StructuralGraphProvider, StructuralIndex};

/// Error type for motifscope operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty instances or motifs, malformed motif documents, bad config values |
/// | `OperationFailed` | I/O errors, snapshot or report (de)serialization failures |
/// | `UnknownNode` | A node id is absent from the structural index mapping |
/// | `GraphNotFound` | No structural graph contains the requested node |
///
/// Empty retrievals, edit distance timeouts and out-of-range hit ranks are
/// not errors; they are recorded in the returned records.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A node id could not be translated by the structural index.
    ///
    /// Raised by [`StructuralIndex::to_index_id`] and
    /// [`StructuralIndex::to_native_id`]. The hit evaluator recovers from it
    /// locally by counting the affected instance as failed.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// No structural graph is registered for the node's home graph.
    #[error("no structural graph found for node {0}")]
    GraphNotFound(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for motifscope operations.
pub type Result<T> = std::result::Result<T, Error>;
