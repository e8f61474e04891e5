//! Edit distance validation records.

use super::{MotifId, SkippedMotif};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Result of a bounded edit distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditDistance {
    /// The search completed; the value is the exact minimum cost.
    Exact {
        /// Minimum edit cost.
        value: f64,
    },
    /// The time budget ran out before the search completed.
    TimedOut {
        /// Cheapest complete edit path seen before the deadline, if any.
        best_upper_bound: Option<f64>,
    },
}

impl EditDistance {
    /// Creates an exact distance.
    #[must_use]
    pub const fn exact(value: f64) -> Self {
        Self::Exact { value }
    }

    /// Returns the exact value, or `None` for a timeout.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Exact { value } => Some(*value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Returns true if the computation ran out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

impl fmt::Display for EditDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { value } => write!(f, "{value:.1}"),
            Self::TimedOut { .. } => write!(f, "timeout"),
        }
    }
}

/// What a validation sample was compared against.
///
/// Serialized through its display form (`rank_10`, `decoy_matched`,
/// `decoy_raw`) so it can key a JSON map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SampleKey {
    /// The hit at this rank (0 = best score).
    Rank(usize),
    /// A random decoy resized to the query's size.
    DecoyMatched,
    /// The same decoy, unresized.
    DecoyRaw,
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rank(rank) => write!(f, "rank_{rank}"),
            Self::DecoyMatched => write!(f, "decoy_matched"),
            Self::DecoyRaw => write!(f, "decoy_raw"),
        }
    }
}

impl FromStr for SampleKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "decoy_matched" => Ok(Self::DecoyMatched),
            "decoy_raw" => Ok(Self::DecoyRaw),
            _ => s
                .strip_prefix("rank_")
                .and_then(|rank| rank.parse().ok())
                .map(Self::Rank)
                .ok_or_else(|| Error::InvalidInput(format!("unknown sample key: {s}"))),
        }
    }
}

impl TryFrom<String> for SampleKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SampleKey> for String {
    fn from(key: SampleKey) -> Self {
        key.to_string()
    }
}

/// One edit distance measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    /// The measured distance.
    pub distance: EditDistance,
    /// Nodes in the query graph.
    pub query_size: usize,
    /// Nodes in the compared graph.
    pub candidate_size: usize,
    /// Retrieval score of the hit, for rank samples.
    pub score: Option<f64>,
    /// Wall-clock time spent computing the distance.
    pub elapsed: Duration,
}

/// Validation of one motif's retrieval against decoys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// The validated motif.
    pub motif_id: MotifId,
    /// Residues in the motif's query instance.
    pub motif_len: usize,
    /// Trimming depth actually applied to the query.
    pub effective_depth: usize,
    /// Candidates returned by the index.
    pub candidate_count: usize,
    /// Distance per sample.
    pub samples: BTreeMap<SampleKey, DistanceSample>,
    /// Motif the decoy was drawn from.
    pub decoy_source: Option<MotifId>,
    /// Total time spent on this motif.
    pub motif_time: Duration,
}

impl ValidationRecord {
    /// Returns the distance for a sample, if it was taken.
    #[must_use]
    pub fn distance(&self, key: SampleKey) -> Option<EditDistance> {
        self.samples.get(&key).map(|sample| sample.distance)
    }

    /// Number of samples that ran out of time.
    #[must_use]
    pub fn timeouts(&self) -> usize {
        self.samples
            .values()
            .filter(|sample| sample.distance.is_timeout())
            .count()
    }
}

/// Outcome of a validation sweep over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// One record per validated motif, in corpus order.
    pub records: Vec<ValidationRecord>,
    /// Motifs that could not be validated.
    pub skipped: Vec<SkippedMotif>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_key_order() {
        let mut keys = vec![
            SampleKey::DecoyRaw,
            SampleKey::Rank(100),
            SampleKey::DecoyMatched,
            SampleKey::Rank(0),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SampleKey::Rank(0),
                SampleKey::Rank(100),
                SampleKey::DecoyMatched,
                SampleKey::DecoyRaw
            ]
        );
        assert_eq!(SampleKey::Rank(10).to_string(), "rank_10");
    }

    #[test]
    fn test_sample_key_parse() {
        let keys = [
            SampleKey::Rank(0),
            SampleKey::Rank(1000),
            SampleKey::DecoyMatched,
            SampleKey::DecoyRaw,
        ];
        for key in keys {
            assert_eq!(key.to_string().parse::<SampleKey>().unwrap(), key);
        }
        assert!("rank_".parse::<SampleKey>().is_err());
        assert!("decoy".parse::<SampleKey>().is_err());
    }

    #[test]
    fn test_record_json_roundtrip() {
        let sample = |distance| DistanceSample {
            distance,
            query_size: 5,
            candidate_size: 6,
            score: Some(0.5),
            elapsed: Duration::from_millis(12),
        };
        let mut samples = BTreeMap::new();
        samples.insert(SampleKey::Rank(0), sample(EditDistance::exact(2.0)));
        let timeout = EditDistance::TimedOut {
            best_upper_bound: Some(9.0),
        };
        samples.insert(SampleKey::Rank(10), sample(timeout));
        samples.insert(SampleKey::DecoyRaw, sample(EditDistance::exact(4.0)));
        let record = ValidationRecord {
            motif_id: MotifId::new("carnaval", "12"),
            motif_len: 5,
            effective_depth: 1,
            candidate_count: 30,
            samples,
            decoy_source: Some(MotifId::new("bgsu", "HL_1")),
            motif_time: Duration::from_millis(40),
        };
        let report = ValidationReport {
            records: vec![record.clone()],
            skipped: Vec::new(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["samples"]["rank_10"]["distance"]["best_upper_bound"].is_number());
        assert!(json["samples"]["decoy_raw"].is_object());

        let parsed: ValidationReport =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_edit_distance_accessors() {
        assert_eq!(EditDistance::exact(3.0).value(), Some(3.0));
        let timeout = EditDistance::TimedOut {
            best_upper_bound: Some(7.0),
        };
        assert!(timeout.is_timeout());
        assert_eq!(timeout.value(), None);
        assert_eq!(timeout.to_string(), "timeout");
    }
}
