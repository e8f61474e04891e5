//! Validate command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use motifscope::config::MotifscopeConfig;
use motifscope::io::{Format, write_report, write_validation};
use motifscope::models::mean;
use motifscope::{ExactEditDistance, StructuralValidator, ValidationRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{CommandResult, InputArgs, cap, stat};

/// Arguments of `motifscope validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Edit distance budget per comparison, in seconds.
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Compare raw hits with the trimmed query instead of expanded hits
    /// with the full query.
    #[arg(long)]
    pub no_expand: bool,

    /// Keep the corpus order.
    #[arg(long)]
    pub no_shuffle: bool,

    /// Hit ranks to sample (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub ranks: Option<Vec<usize>>,

    /// Validate at most this many motifs.
    #[arg(long)]
    pub max_motifs: Option<usize>,

    /// Seed for shuffling and decoy selection.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report file (`.csv` or `.json`).
    #[arg(short, long)]
    pub out: PathBuf,

    /// Report format, overriding the file extension.
    #[arg(long)]
    pub format: Option<Format>,
}

/// Validate command.
pub fn cmd_validate(config: &MotifscopeConfig, args: ValidateArgs) -> CommandResult {
    let (corpus, client) = args.input.load()?;

    let mut validation = config.validation_config();
    if let Some(secs) = args.timeout {
        validation = validation.with_timeout(Duration::try_from_secs_f64(secs)?);
    }
    if args.no_expand {
        validation = validation.with_expand_hits(false);
    }
    if let Some(ranks) = args.ranks {
        validation = validation.with_sample_ranks(ranks);
    }

    let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or(config.seed));
    let corpus = if config.validation.shuffle && !args.no_shuffle {
        corpus.shuffled(&mut rng)
    } else {
        corpus
    };
    let corpus = cap(corpus, args.max_motifs.or(config.retrieval.max_motifs));

    let oracle = Arc::new(ExactEditDistance::new());
    let validator = StructuralValidator::new(client, oracle, validation);
    let report = validator.validate_corpus(&corpus, &mut rng);

    let timeouts: usize = report.records.iter().map(ValidationRecord::timeouts).sum();
    let mean_time = mean(report.records.iter().map(|r| r.motif_time.as_secs_f64()));
    println!(
        "Validated {} motifs ({} skipped)",
        report.records.len(),
        report.skipped.len()
    );
    println!("  timed out comparisons: {timeouts}");
    println!("  mean seconds / motif:  {}", stat(mean_time));

    write_report(&args.out, args.format, |writer, format| {
        write_validation(writer, &report, format)
    })?;
    println!("Wrote {}", args.out.display());
    Ok(())
}
