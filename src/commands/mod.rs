//! Command handlers.
//!
//! - `prune.rs`: corpus filtering
//! - `evaluate.rs`: hit-ratio sweep and A/B decoy test
//! - `validate.rs`: edit distance validation

mod evaluate;
mod prune;
mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use motifscope::io::{load_graph_provider, load_index, load_motifs};
use motifscope::models::StatSummary;
use motifscope::{MotifCorpus, RetrievalClient};

pub use evaluate::{AbTestArgs, HitsArgs, cmd_ab_test, cmd_hits};
pub use prune::{PruneArgs, cmd_prune};
pub use validate::{ValidateArgs, cmd_validate};

/// Result type of every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Inputs shared by the retrieval commands.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Motif document (JSON).
    #[arg(short, long)]
    pub motifs: PathBuf,

    /// Graph catalog snapshot (JSON).
    #[arg(short, long)]
    pub graphs: PathBuf,

    /// Recorded index snapshot (JSON).
    #[arg(short, long)]
    pub index: PathBuf,
}

impl InputArgs {
    /// Loads the corpus and wires a retrieval client.
    pub fn load(&self) -> Result<(MotifCorpus, RetrievalClient), motifscope::Error> {
        let corpus = load_motifs(&self.motifs)?;
        let graphs = Arc::new(load_graph_provider(&self.graphs)?);
        let index = Arc::new(load_index(&self.index)?);
        Ok((corpus, RetrievalClient::new(graphs, index)))
    }
}

/// Keeps at most `max` motifs.
pub fn cap(corpus: MotifCorpus, max: Option<usize>) -> MotifCorpus {
    match max {
        Some(max) if max < corpus.len() => corpus.iter().take(max).cloned().collect(),
        _ => corpus,
    }
}

/// Formats an optional statistic.
pub fn stat(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

/// Prints a summary block.
pub fn print_summary(title: &str, summary: &StatSummary) {
    println!("{title} ({} motifs)", summary.motifs);
    println!("  mean fail count:  {}", stat(summary.mean_fail_count));
    println!("  mean fail ratio:  {}", stat(summary.mean_fail_ratio));
    println!("  mean rank:        {}", stat(summary.mean_rank));
    println!("  mean rank ratio:  {}", stat(summary.mean_rank_ratio));
}
