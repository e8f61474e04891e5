//! Collaborator traits.

mod graph;
mod index;

pub use graph::StructuralGraphProvider;
pub use index::StructuralIndex;
