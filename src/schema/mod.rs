//! Schema module - The parsed schema tree and the leaf index built over it.
//!
//! The index is consulted by schema tooling that needs the target of a
//! leafref; it is built once and never mutated.

mod entry;
mod index;

pub use entry::*;
pub use index::*;
