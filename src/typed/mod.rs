//! Typed module - Operations on trees that follow their field path tags.
//!
//! This module provides the tree walk, flattening, diffing and list
//! validation.

mod diff;
mod flatten;
mod validation;
mod walk;

#[cfg(test)]
mod roundtrip_test;

pub use diff::*;
pub use flatten::*;
pub use validation::*;
pub use walk::*;
