//! Hit-ratio and A/B decoy commands.

use std::path::PathBuf;

use clap::Args;
use motifscope::config::MotifscopeConfig;
use motifscope::io::{Format, write_ab_test, write_json, write_report};
use motifscope::{DecoyHarness, HitEvaluator};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{CommandResult, InputArgs, cap, print_summary};

/// Arguments of `motifscope hits`.
#[derive(Debug, Args)]
pub struct HitsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Evaluate at most this many motifs.
    #[arg(long)]
    pub max_motifs: Option<usize>,

    /// Maximum trimming depth.
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Write the per-motif records as JSON.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments of `motifscope ab-test`.
#[derive(Debug, Args)]
pub struct AbTestArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Seed for decoy selection.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also summarize the motifs of this corpus tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Maximum trimming depth.
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Report file (`.csv` or `.json`).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Report format, overriding the file extension.
    #[arg(long)]
    pub format: Option<Format>,
}

/// Hit-ratio command.
pub fn cmd_hits(config: &MotifscopeConfig, args: HitsArgs) -> CommandResult {
    let (corpus, client) = args.input.load()?;
    let depth = args.depth.unwrap_or(config.retrieval.depth);
    let harness = DecoyHarness::new(HitEvaluator::new(client, depth));

    let max_motifs = args.max_motifs.or(config.retrieval.max_motifs);
    let report = harness.hit_ratio(&corpus, max_motifs);

    print_summary("Hit ratio", &report.summary());
    if !report.skipped.is_empty() {
        println!("Skipped {} motifs", report.skipped.len());
    }
    if let Some(out) = args.out {
        write_json(&out, &report)?;
        println!("Wrote {}", out.display());
    }
    Ok(())
}

/// A/B decoy command.
pub fn cmd_ab_test(config: &MotifscopeConfig, args: AbTestArgs) -> CommandResult {
    let (corpus, client) = args.input.load()?;
    let corpus = cap(corpus, config.retrieval.max_motifs);
    let depth = args.depth.unwrap_or(config.retrieval.depth);
    let harness = DecoyHarness::new(HitEvaluator::new(client, depth));

    let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or(config.seed));
    let report = harness.ab_test(&corpus, &mut rng);

    print_summary("Real queries", &report.real_summary(None));
    print_summary("Decoy queries", &report.decoy_summary(None));
    if let Some(tag) = args.tag.as_deref() {
        print_summary(&format!("Real queries [{tag}]"), &report.real_summary(Some(tag)));
        print_summary(&format!("Decoy queries [{tag}]"), &report.decoy_summary(Some(tag)));
    }
    if !report.skipped.is_empty() {
        println!("Skipped {} motifs", report.skipped.len());
    }

    if let Some(out) = args.out {
        write_report(&out, args.format, |writer, format| {
            write_ab_test(writer, &report, format)
        })?;
        println!("Wrote {}", out.display());
    }
    Ok(())
}
