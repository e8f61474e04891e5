//! Prune command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use motifscope::config::MotifscopeConfig;
use motifscope::io::{load_graph_provider, load_motifs, load_non_redundant, write_motifs};
use motifscope::services::MotifPruner;

use super::{CommandResult, stat};

/// Arguments of `motifscope prune`.
#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Motif document (JSON).
    #[arg(short, long)]
    pub motifs: PathBuf,

    /// Graph catalog snapshot (JSON).
    #[arg(short, long)]
    pub graphs: PathBuf,

    /// Non-redundant structure list (directory or text file).
    #[arg(long)]
    pub non_redundant: Option<PathBuf>,

    /// Minimum query length.
    #[arg(long)]
    pub shortest: Option<usize>,

    /// Minimum number of instances.
    #[arg(long)]
    pub sparsest: Option<usize>,

    /// Keep motifs without non-canonical interactions.
    #[arg(long)]
    pub allow_canonical: bool,

    /// Output motif document.
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Prune command.
pub fn cmd_prune(config: &MotifscopeConfig, args: PruneArgs) -> CommandResult {
    let corpus = load_motifs(&args.motifs)?;
    let graphs = Arc::new(load_graph_provider(&args.graphs)?);

    let mut prune_config = config.prune_config();
    if let Some(shortest) = args.shortest {
        prune_config = prune_config.with_shortest(shortest);
    }
    if let Some(sparsest) = args.sparsest {
        prune_config = prune_config.with_sparsest(sparsest);
    }
    if args.allow_canonical {
        prune_config = prune_config.with_require_non_canonical(false);
    }
    if let Some(path) = args.non_redundant.or_else(|| config.pruning.non_redundant.clone()) {
        prune_config = prune_config.with_non_redundant(load_non_redundant(&path)?);
    }

    let report = MotifPruner::new(graphs, prune_config).prune(&corpus);
    write_motifs(&args.out, &report.kept)?;

    println!("Kept {} of {} motifs", report.kept.len(), report.examined);
    println!("  too few instances:    {}", report.sparse);
    println!("  query too short:      {}", report.short);
    println!("  canonical only:       {}", report.canonical);
    println!("  graph missing:        {}", report.missing_graph);
    println!(
        "  instances:            {} -> {} non-redundant",
        report.instances_total, report.instances_non_redundant
    );
    println!("  mean instances kept:  {}", stat(report.mean_instances));
    println!("  mean query length:    {}", stat(report.mean_nodes));
    println!("Wrote {}", args.out.display());
    Ok(())
}
