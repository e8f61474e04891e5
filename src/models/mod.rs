//! Data models for motifscope.
//!
//! Plain values only: graphs are read-only once built, and every record is
//! immutable after the service that produced it returns.

mod evaluation;
mod graph;
mod motif;
mod retrieval;
mod validation;

pub use evaluation::{
    AbTestRecord, AbTestReport, EvaluationRecord, HitRatioReport, InstanceOutcome, SkippedMotif,
    StatSummary, mean,
};
pub use graph::{IndexId, Interaction, NodeId, StructuralGraph, UNLABELED_RESIDUE};
pub use motif::{Motif, MotifCorpus, MotifId, MotifInstance};
pub use retrieval::{CandidateHit, RetrievalResult, rank_of_score};
pub use validation::{
    DistanceSample, EditDistance, SampleKey, ValidationRecord, ValidationReport,
};
