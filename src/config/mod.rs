//! Configuration management.
//!
//! Values are resolved in this order, later sources winning:
//!
//! | Source | Example |
//! |--------|---------|
//! | Built-in defaults | depth 1, timeout 2s, ranks 0/10/100/1000 |
//! | TOML file | `~/.config/motifscope/config.toml` or `--config` |
//! | Environment | `MOTIFSCOPE_DEPTH=2` |
//! | CLI flags | `--depth 2` |

use crate::services::{DEFAULT_SAMPLE_RANKS, PruneConfig, ValidationConfig};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for motifscope.
#[derive(Debug, Clone, PartialEq)]
pub struct MotifscopeConfig {
    /// Retrieval settings.
    pub retrieval: RetrievalSettings,
    /// Validation settings.
    pub validation: ValidationSettings,
    /// Pruning settings.
    pub pruning: PruningSettings,
    /// Seed for decoy selection and corpus shuffling.
    pub seed: u64,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Retrieval settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalSettings {
    /// Maximum trimming depth for query instances.
    pub depth: usize,
    /// Evaluate at most this many motifs.
    pub max_motifs: Option<usize>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            depth: 1,
            max_motifs: None,
        }
    }
}

/// Validation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSettings {
    /// Edit distance time budget per comparison.
    pub timeout: Duration,
    /// Hit ranks to sample.
    pub sample_ranks: Vec<usize>,
    /// Compare expanded hits against the untrimmed query.
    pub expand_hits: bool,
    /// Shuffle the corpus before validating.
    pub shuffle: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            sample_ranks: DEFAULT_SAMPLE_RANKS.to_vec(),
            expand_hits: true,
            shuffle: true,
        }
    }
}

/// Pruning settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruningSettings {
    /// Minimum query length.
    pub shortest: usize,
    /// Minimum number of instances.
    pub sparsest: usize,
    /// Require a non-canonical interaction in the query.
    pub require_non_canonical: bool,
    /// Non-redundant structure list (directory or text file).
    pub non_redundant: Option<PathBuf>,
}

impl Default for PruningSettings {
    fn default() -> Self {
        let defaults = PruneConfig::default();
        Self {
            shortest: defaults.shortest,
            sparsest: defaults.sparsest,
            require_non_canonical: defaults.require_non_canonical,
            non_redundant: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `MOTIFSCOPE_LOG` or `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Seed.
    pub seed: Option<u64>,
    /// Retrieval section.
    pub retrieval: Option<ConfigFileRetrieval>,
    /// Validation section.
    pub validation: Option<ConfigFileValidation>,
    /// Pruning section.
    pub pruning: Option<ConfigFilePruning>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Retrieval section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileRetrieval {
    /// Trimming depth.
    pub depth: Option<usize>,
    /// Motif cap.
    pub max_motifs: Option<usize>,
}

/// Validation section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileValidation {
    /// Timeout in seconds.
    pub timeout_secs: Option<f64>,
    /// Sampled ranks.
    pub sample_ranks: Option<Vec<usize>>,
    /// Expand mode.
    pub expand_hits: Option<bool>,
    /// Shuffle the corpus.
    pub shuffle: Option<bool>,
}

/// Pruning section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFilePruning {
    /// Minimum query length.
    pub shortest: Option<usize>,
    /// Minimum instance count.
    pub sparsest: Option<usize>,
    /// Non-canonical requirement.
    pub require_non_canonical: Option<bool>,
    /// Non-redundant list path.
    pub non_redundant: Option<String>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for MotifscopeConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalSettings::default(),
            validation: ValidationSettings::default(),
            pruning: PruningSettings::default(),
            seed: 0,
            logging: LoggingSettings::default(),
        }
    }
}

impl MotifscopeConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::operation("read_config_file", format!("{}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, has unknown keys, or
    /// holds an invalid value.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir and then `~/.config/motifscope/`.
    /// Returns the defaults if neither holds a readable file.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("motifscope").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("motifscope")
                .join("config.toml"),
        ];
        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                }
            }
        }

        Self::default()
    }

    /// Applies `MOTIFSCOPE_*` environment overrides.
    ///
    /// | Variable | Setting |
    /// |----------|---------|
    /// | `MOTIFSCOPE_DEPTH` | retrieval depth |
    /// | `MOTIFSCOPE_MAX_MOTIFS` | motif cap |
    /// | `MOTIFSCOPE_TIMEOUT_SECS` | edit distance budget |
    /// | `MOTIFSCOPE_SEED` | RNG seed |
    /// | `MOTIFSCOPE_LOG_FORMAT` | `pretty` or `json` |
    /// | `MOTIFSCOPE_LOG_FILE` | log file path |
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("MOTIFSCOPE_DEPTH")
            && let Ok(depth) = val.parse()
        {
            self.retrieval.depth = depth;
        }
        if let Ok(val) = std::env::var("MOTIFSCOPE_MAX_MOTIFS")
            && let Ok(max) = val.parse()
        {
            self.retrieval.max_motifs = Some(max);
        }
        if let Ok(val) = std::env::var("MOTIFSCOPE_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<f64>()
            && let Ok(timeout) = Duration::try_from_secs_f64(secs)
        {
            self.validation.timeout = timeout;
        }
        if let Ok(val) = std::env::var("MOTIFSCOPE_SEED")
            && let Ok(seed) = val.parse()
        {
            self.seed = seed;
        }
        if let Ok(val) = std::env::var("MOTIFSCOPE_LOG_FORMAT") {
            self.logging.format = LogFormat::parse(&val);
        }
        if let Ok(val) = std::env::var("MOTIFSCOPE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(val));
        }
        self
    }

    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(seed) = file.seed {
            config.seed = seed;
        }
        if let Some(retrieval) = file.retrieval {
            if let Some(depth) = retrieval.depth {
                config.retrieval.depth = depth;
            }
            config.retrieval.max_motifs = retrieval.max_motifs;
        }
        if let Some(validation) = file.validation {
            if let Some(secs) = validation.timeout_secs {
                config.validation.timeout = Duration::try_from_secs_f64(secs).map_err(|e| {
                    Error::InvalidInput(format!("validation.timeout_secs = {secs}: {e}"))
                })?;
            }
            if let Some(ranks) = validation.sample_ranks {
                config.validation.sample_ranks = ranks;
            }
            if let Some(expand) = validation.expand_hits {
                config.validation.expand_hits = expand;
            }
            if let Some(shuffle) = validation.shuffle {
                config.validation.shuffle = shuffle;
            }
        }
        if let Some(pruning) = file.pruning {
            if let Some(shortest) = pruning.shortest {
                config.pruning.shortest = shortest;
            }
            if let Some(sparsest) = pruning.sparsest {
                config.pruning.sparsest = sparsest;
            }
            if let Some(required) = pruning.require_non_canonical {
                config.pruning.require_non_canonical = required;
            }
            config.pruning.non_redundant = pruning.non_redundant.map(PathBuf::from);
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }

        Ok(config)
    }

    /// Sets the retrieval depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.retrieval.depth = depth;
        self
    }

    /// Sets the motif cap.
    #[must_use]
    pub const fn with_max_motifs(mut self, max_motifs: Option<usize>) -> Self {
        self.retrieval.max_motifs = max_motifs;
        self
    }

    /// Sets the edit distance budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.validation.timeout = timeout;
        self
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the validator configuration.
    #[must_use]
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig::new()
            .with_depth(self.retrieval.depth)
            .with_timeout(self.validation.timeout)
            .with_sample_ranks(self.validation.sample_ranks.clone())
            .with_expand_hits(self.validation.expand_hits)
    }

    /// Builds the pruner configuration, without the non-redundant set.
    #[must_use]
    pub const fn prune_config(&self) -> PruneConfig {
        PruneConfig {
            sparsest: self.pruning.sparsest,
            shortest: self.pruning.shortest,
            require_non_canonical: self.pruning.require_non_canonical,
            non_redundant: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MotifscopeConfig::new();
        assert_eq!(config.retrieval.depth, 1);
        assert_eq!(config.validation.timeout, Duration::from_secs(2));
        assert_eq!(config.validation.sample_ranks, vec![0, 10, 100, 1000]);
        assert_eq!(config.pruning.shortest, 4);
        assert_eq!(config.pruning.sparsest, 3);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_parse_sections() {
        let config = MotifscopeConfig::parse(
            r#"
            seed = 7

            [retrieval]
            depth = 2
            max_motifs = 50

            [validation]
            timeout_secs = 0.5
            sample_ranks = [0, 5]
            expand_hits = false

            [pruning]
            sparsest = 5
            non_redundant = "nr.txt"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.retrieval.depth, 2);
        assert_eq!(config.retrieval.max_motifs, Some(50));
        assert_eq!(config.validation.timeout, Duration::from_millis(500));
        assert_eq!(config.validation.sample_ranks, vec![0, 5]);
        assert!(!config.validation.expand_hits);
        assert!(config.validation.shuffle);
        assert_eq!(config.pruning.sparsest, 5);
        assert_eq!(config.pruning.shortest, 4);
        assert_eq!(config.pruning.non_redundant, Some(PathBuf::from("nr.txt")));
        assert_eq!(config.logging.format, LogFormat::Json);

        let validation = config.validation_config();
        assert_eq!(validation.depth, 2);
        assert!(!validation.expand_hits);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(MotifscopeConfig::parse("[retrieval]\ndepht = 2").is_err());
        let err = MotifscopeConfig::parse("[validation]\ntimeout_secs = -1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\ndepth = 3\n").unwrap();
        assert_eq!(MotifscopeConfig::load_from_file(&path).unwrap().retrieval.depth, 3);
        assert!(MotifscopeConfig::load_from_file(&dir.path().join("missing.toml")).is_err());
    }
}
