//! File formats read and written by motifscope.
//!
//! | File | Direction | Format | Module |
//! |------|-----------|--------|--------|
//! | Motif document | read/write | JSON | [`motifs`] |
//! | Non-redundant graph list | read | directory or text | [`motifs`] |
//! | Graph catalog snapshot | read/write | JSON | [`snapshot`] |
//! | Recorded index snapshot | read/write | JSON | [`snapshot`] |
//! | A/B and validation reports | write | CSV or JSON | [`report`] |

pub mod motifs;
pub mod report;
pub mod snapshot;

pub use motifs::{MOTIF_SOURCES, load_motifs, load_non_redundant, parse_motifs, write_motifs};
pub use report::{AbTestRow, Format, ValidationRow, write_ab_test, write_report, write_validation};
pub use snapshot::{
    GraphCatalogSnapshot, IndexSnapshot, load_graph_provider, load_index, read_json, write_json,
};
