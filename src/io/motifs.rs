//! Motif document parsing.
//!
//! A motif document groups motifs by corpus:
//!
//! ```json
//! {
//!   "carnaval": {
//!     "12": [
//!       [{"node": "4pr6.B.122"}, {"node": null}, {"node": "4pr6.B.161"}],
//!       [{"node": "1ffk.0.77"}, {"node": "1ffk.0.78"}]
//!     ]
//!   },
//!   "bgsu": {},
//!   "rna3dmotif": {}
//! }
//! ```
//!
//! Residues that could not be located in a structure are `null`. They are
//! dropped, then empty instances are dropped, then motifs left without
//! instances are dropped.

use crate::models::{Motif, MotifCorpus, MotifId, MotifInstance, NodeId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Corpus tags read from a motif document, in load order.
pub const MOTIF_SOURCES: &[&str] = &["rna3dmotif", "bgsu", "carnaval"];

#[derive(Debug, Serialize, Deserialize)]
struct ResidueSlot {
    node: Option<NodeId>,
}

type SourceSection = BTreeMap<String, Vec<Vec<ResidueSlot>>>;

/// Parses a motif document from a JSON string.
///
/// Sources absent from the document are skipped; other top-level keys are
/// ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the document is not valid JSON or does
/// not have the expected shape.
pub fn parse_motifs(json: &str) -> Result<MotifCorpus> {
    let mut document: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| Error::InvalidInput(format!("malformed motif document: {e}")))?;

    let mut corpus = MotifCorpus::new();
    let mut dropped_slots = 0usize;
    for source in MOTIF_SOURCES {
        let Some(raw) = document.remove(*source) else {
            tracing::debug!(source, "motif source absent from document");
            continue;
        };
        let section: SourceSection = serde_json::from_value(raw).map_err(|e| {
            Error::InvalidInput(format!("malformed '{source}' section: {e}"))
        })?;
        for (local_id, raw_instances) in section {
            let mut instances = Vec::with_capacity(raw_instances.len());
            for slots in raw_instances {
                let total = slots.len();
                let nodes: Vec<NodeId> = slots.into_iter().filter_map(|slot| slot.node).collect();
                dropped_slots += total - nodes.len();
                if let Ok(instance) = MotifInstance::new(nodes) {
                    instances.push(instance);
                }
            }
            if let Ok(motif) = Motif::new(MotifId::new(*source, local_id), instances) {
                corpus.insert(motif);
            }
        }
    }

    tracing::info!(
        motifs = corpus.len(),
        dropped_slots,
        "parsed motif document"
    );
    Ok(corpus)
}

/// Reads and parses a motif document.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be read, or the
/// errors of [`parse_motifs`].
pub fn load_motifs(path: &Path) -> Result<MotifCorpus> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::operation(format!("read_motifs {}", path.display()), e))?;
    parse_motifs(&json)
}

/// Writes a corpus as a motif document.
///
/// Motifs are grouped by source and keyed by local id, so reading the file
/// back yields the same motifs with local ids in sorted order.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be written.
pub fn write_motifs(path: &Path, corpus: &MotifCorpus) -> Result<()> {
    let mut document: BTreeMap<&str, BTreeMap<&str, Vec<Vec<ResidueSlot>>>> = BTreeMap::new();
    for motif in corpus {
        let instances = motif
            .instances()
            .iter()
            .map(|instance| {
                instance
                    .nodes()
                    .iter()
                    .map(|node| ResidueSlot {
                        node: Some(node.clone()),
                    })
                    .collect()
            })
            .collect();
        document
            .entry(motif.id().source.as_str())
            .or_default()
            .insert(motif.id().local_id.as_str(), instances);
    }
    crate::io::write_json(path, &document)
}

/// Loads the set of non-redundant graph names.
///
/// `path` is either a directory holding one file per graph (the file stem is
/// the graph name, e.g. `1ffk.json`) or a text file with one name per line.
/// Names are lowercased; blank lines and `#` comments are ignored.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the path cannot be read.
pub fn load_non_redundant(path: &Path) -> Result<BTreeSet<String>> {
    let names: BTreeSet<String> = if path.is_dir() {
        std::fs::read_dir(path)
            .map_err(|e| Error::operation("read_non_redundant_dir", e))?
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_lowercase)
            })
            .collect()
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_non_redundant_list", e))?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect()
    };
    tracing::debug!(graphs = names.len(), path = %path.display(), "loaded non-redundant set");
    Ok(names)
}
