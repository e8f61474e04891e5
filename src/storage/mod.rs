//! Collaborator abstractions and their in-memory adapters.
//!
//! The pipeline reads from two external collaborators:
//! - **Graphs**: whole structural graphs, resolved from a residue id
//! - **Index**: the precomputed structural index that answers similarity queries
//!
//! Both are read-only to the core. Production deployments wrap their own
//! graph store and index behind the traits; the in-memory adapters back the
//! CLI (loaded from JSON snapshots) and the tests.

pub mod graph;
pub mod index;
pub mod traits;

pub use graph::InMemoryGraphProvider;
pub use index::InMemoryStructuralIndex;
pub use traits::{StructuralGraphProvider, StructuralIndex};
