//! Structural graph providers.
//!
//! | Provider | Use Case |
//! |----------|----------|
//! | [`InMemoryGraphProvider`] | CLI (from a JSON catalog snapshot) and tests |

mod memory;

pub use memory::InMemoryGraphProvider;
