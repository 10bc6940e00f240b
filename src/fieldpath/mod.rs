//! Field path module - addresses of nodes in a data tree.
//!
//! A `Path` is one absolute address; a `PathSpec` is the set of addresses
//! that denote the same node when schema compression gives it more than one.

mod key;
mod path;
mod pathspec;
mod serialize;

pub use key::*;
pub use path::*;
pub use pathspec::*;
pub use serialize::*;

use thiserror::Error;

/// PathError reports a failure to compute or parse an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("could not find path annotation for parent node")]
    MissingAnnotation,

    #[error("list entry {0} has no list element to key")]
    InvalidListMember(String),

    #[error("field {field} declares no schema path")]
    MissingSchemaPath { field: String },

    #[error("malformed list key: {0}")]
    MalformedKey(String),

    #[error("cannot parse path {input:?}: {message}")]
    Parse { input: String, message: String },

    #[error("cannot join paths with origins {prefix:?} and {suffix:?}")]
    OriginMismatch { prefix: String, suffix: String },
}
