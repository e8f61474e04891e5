//! Structural index adapters.
//!
//! | Index | Use Case |
//! |-------|----------|
//! | [`InMemoryStructuralIndex`] | Replays recorded query results; CLI and tests |

mod memory;

pub use memory::InMemoryStructuralIndex;
