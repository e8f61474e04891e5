//! Report export.
//!
//! Reports are flattened into one row per motif and written as CSV or JSON.
//! Validation rows carry one column per sample key, so the CSV header
//! depends on the sample ranks that were actually taken.

use crate::models::{AbTestRecord, AbTestReport, EditDistance, ValidationRecord, ValidationReport};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array of rows.
    Json,
}

impl Format {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is missing or not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "cannot determine report format: {} has no extension",
                    path.display()
                ))
            })?;
        ext.parse()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(Error::InvalidInput(format!("unknown report format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Flattened A/B record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbTestRow {
    /// Corpus tag.
    pub source: String,
    /// Motif id within the corpus.
    pub motif: String,
    /// Candidates retrieved by the real query.
    pub candidates: usize,
    /// Real query mean rank.
    pub real_mean_rank: f64,
    /// Real query rank ratio.
    pub real_rank_ratio: f64,
    /// Real query failures.
    pub real_fail_count: usize,
    /// Real query failure ratio.
    pub real_fail_ratio: f64,
    /// Motif the decoy was drawn from.
    pub decoy_source: Option<String>,
    /// Decoy query mean rank.
    pub decoy_mean_rank: Option<f64>,
    /// Decoy query rank ratio.
    pub decoy_rank_ratio: Option<f64>,
    /// Decoy query failures.
    pub decoy_fail_count: Option<usize>,
    /// Decoy query failure ratio.
    pub decoy_fail_ratio: Option<f64>,
}

impl From<&AbTestRecord> for AbTestRow {
    fn from(record: &AbTestRecord) -> Self {
        let decoy = record.decoy.as_ref();
        Self {
            source: record.motif_id.source.clone(),
            motif: record.motif_id.local_id.clone(),
            candidates: record.real.candidate_count,
            real_mean_rank: record.real.mean_rank,
            real_rank_ratio: record.real.rank_ratio,
            real_fail_count: record.real.fail_count,
            real_fail_ratio: record.real.fail_ratio,
            decoy_source: record.decoy_source.as_ref().map(ToString::to_string),
            decoy_mean_rank: decoy.map(|d| d.mean_rank),
            decoy_rank_ratio: decoy.map(|d| d.rank_ratio),
            decoy_fail_count: decoy.map(|d| d.fail_count),
            decoy_fail_ratio: decoy.map(|d| d.fail_ratio),
        }
    }
}

/// Flattened validation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRow {
    /// Corpus tag.
    pub source: String,
    /// Motif id within the corpus.
    pub motif: String,
    /// Residues in the query instance.
    pub motif_len: usize,
    /// Trimming depth applied to the query.
    pub effective_depth: usize,
    /// Candidates retrieved.
    pub candidates: usize,
    /// Distance per sample key; `None` marks a timeout.
    pub distances: BTreeMap<String, Option<f64>>,
    /// Motif the decoy was drawn from.
    pub decoy_source: Option<String>,
    /// Total time spent on the motif, in milliseconds.
    pub motif_time_ms: f64,
}

impl From<&ValidationRecord> for ValidationRow {
    fn from(record: &ValidationRecord) -> Self {
        Self {
            source: record.motif_id.source.clone(),
            motif: record.motif_id.local_id.clone(),
            motif_len: record.motif_len,
            effective_depth: record.effective_depth,
            candidates: record.candidate_count,
            distances: record
                .samples
                .iter()
                .map(|(key, sample)| (key.to_string(), sample.distance.value()))
                .collect(),
            decoy_source: record.decoy_source.as_ref().map(ToString::to_string),
            motif_time_ms: record.motif_time.as_secs_f64() * 1000.0,
        }
    }
}

/// Writes the rows of an A/B report.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if writing fails.
pub fn write_ab_test<W: Write>(writer: W, report: &AbTestReport, format: Format) -> Result<()> {
    let rows: Vec<AbTestRow> = report.records.iter().map(AbTestRow::from).collect();
    match format {
        Format::Json => write_json_rows(writer, &rows),
        Format::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in &rows {
                csv_writer
                    .serialize(row)
                    .map_err(|e| Error::operation("write_csv", e))?;
            }
            csv_writer.flush().map_err(|e| Error::operation("flush_csv", e))
        }
    }
}

/// Writes the rows of a validation report.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if writing fails.
pub fn write_validation<W: Write>(
    writer: W,
    report: &ValidationReport,
    format: Format,
) -> Result<()> {
    let rows: Vec<ValidationRow> = report.records.iter().map(ValidationRow::from).collect();
    match format {
        Format::Json => write_json_rows(writer, &rows),
        Format::Csv => write_validation_csv(writer, report, &rows),
    }
}

/// Opens `path` and hands a buffered writer to `write`.
///
/// The format comes from `format` or, when absent, from the extension.
///
/// # Errors
///
/// Returns an error if the format cannot be determined, the file cannot be
/// created, or `write` fails.
pub fn write_report<F>(path: &Path, format: Option<Format>, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>, Format) -> Result<()>,
{
    let format = match format {
        Some(format) => format,
        None => Format::from_path(path)?,
    };
    let file = File::create(path)
        .map_err(|e| Error::operation(format!("create {}", path.display()), e))?;
    write(BufWriter::new(file), format)?;
    tracing::info!(path = %path.display(), %format, "wrote report");
    Ok(())
}

fn write_json_rows<W: Write, T: Serialize>(mut writer: W, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| Error::operation("write_json", e))?;
    writer.flush().map_err(|e| Error::operation("flush_json", e))
}

fn write_validation_csv<W: Write>(
    writer: W,
    report: &ValidationReport,
    rows: &[ValidationRow],
) -> Result<()> {
    let keys: BTreeSet<_> = report
        .records
        .iter()
        .flat_map(|record| record.samples.keys().copied())
        .collect();
    let sample_columns: Vec<String> = keys.iter().map(ToString::to_string).collect();

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let mut header = vec![
        "source".to_string(),
        "motif".to_string(),
        "motif_len".to_string(),
        "effective_depth".to_string(),
        "candidates".to_string(),
    ];
    header.extend(sample_columns.iter().cloned());
    header.extend(["decoy_source".to_string(), "motif_time_ms".to_string()]);
    csv_writer
        .write_record(&header)
        .map_err(|e| Error::operation("write_csv_headers", e))?;

    for (record, row) in report.records.iter().zip(rows) {
        let mut fields = vec![
            row.source.clone(),
            row.motif.clone(),
            row.motif_len.to_string(),
            row.effective_depth.to_string(),
            row.candidates.to_string(),
        ];
        fields.extend(keys.iter().map(|key| {
            record
                .distance(*key)
                .map(|distance| distance_cell(&distance))
                .unwrap_or_default()
        }));
        fields.push(row.decoy_source.clone().unwrap_or_default());
        fields.push(format!("{:.3}", row.motif_time_ms));
        csv_writer
            .write_record(&fields)
            .map_err(|e| Error::operation("write_csv", e))?;
    }
    csv_writer.flush().map_err(|e| Error::operation("flush_csv", e))
}

fn distance_cell(distance: &EditDistance) -> String {
    match distance {
        EditDistance::Exact { value } => value.to_string(),
        EditDistance::TimedOut { .. } => "timeout".to_string(),
    }
}
