//! Value module - Opaque leaf payloads held by data tree nodes.
//!
//! Values are compared and stringified for keys, never encoded for the wire.

mod value;

pub use value::*;
