//! Retrieval and validation services.
//!
//! ```text
//! Motif ─▶ trim_with_retry ─▶ RetrievalClient ─▶ HitEvaluator ─▶ DecoyHarness
//!                                    │
//!                                    └──────────▶ StructuralValidator ─▶ EditDistanceOracle
//! ```
//!
//! Services hold shared handles to the collaborators and never mutate them.
//! Randomness is always passed in by the caller.

pub mod decoy;
pub mod edit_distance;
pub mod hit_evaluator;
pub mod neighborhood;
pub mod pruning;
pub mod retrieval;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use decoy::{DecoyHarness, pick_decoy_index};
pub use edit_distance::{EditCosts, EditDistanceOracle, ExactEditDistance};
pub use hit_evaluator::{HitEvaluator, score_hits};
pub use neighborhood::{
    MAX_SIZE_MATCH_ATTEMPTS, SizeMatch, TrimOutcome, match_size, outer_border, trim,
    trim_with_retry,
};
pub use pruning::{MotifPruner, PruneConfig, PruneReport};
pub use retrieval::{Retrieval, RetrievalClient};
pub use validation::{DEFAULT_SAMPLE_RANKS, StructuralValidator, ValidationConfig};
