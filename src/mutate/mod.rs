//! Mutate module - applying addressed edits to a data tree.
//!
//! Paths are resolved against field path tags, so a compressed field is
//! reachable through each of its declared paths. Failures are not rolled
//! back: a batch that fails partway leaves the edits applied so far.

mod node;
mod request;
mod unmarshal;

pub use node::*;
pub use request::*;
pub use unmarshal::*;

use crate::fieldpath::PathError;
use crate::model::ModelError;
use thiserror::Error;

/// UnmarshalOptions configures address resolution and subtree unmarshalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalOptions {
    /// Resolve fields through their shadow paths and ignore their primary
    /// paths instead of the reverse.
    pub prefer_shadow_path: bool,
    /// Skip unknown members of unmarshalled subtrees instead of failing.
    pub ignore_extra_fields: bool,
    /// Create missing containers and list entries along a path.
    pub init_missing_elements: bool,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        UnmarshalOptions {
            prefer_shadow_path: false,
            ignore_extra_fields: false,
            init_missing_elements: true,
        }
    }
}

impl UnmarshalOptions {
    pub fn new() -> Self {
        UnmarshalOptions::default()
    }

    pub fn prefer_shadow_path(mut self, prefer: bool) -> Self {
        self.prefer_shadow_path = prefer;
        self
    }

    pub fn ignore_extra_fields(mut self, ignore: bool) -> Self {
        self.ignore_extra_fields = ignore;
        self
    }

    pub fn init_missing_elements(mut self, init: bool) -> Self {
        self.init_missing_elements = init;
        self
    }
}

/// MutationError reports a failure to resolve or apply an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("no field of {type_name} matches path {path}")]
    NoMatch { type_name: String, path: String },

    #[error("unknown field {field} in value for {type_name}")]
    UnexpectedField { type_name: String, field: String },

    #[error("{path} addresses a leaf, not a node")]
    NotANode { path: String },

    #[error("path continues past leaf at {path}")]
    PathBeyondLeaf { path: String },

    #[error("unexpected key on non-list element {path}")]
    UnexpectedKey { path: String },

    #[error("list element {path} needs keys {keys:?}")]
    MissingKeys { path: String, keys: Vec<String> },

    #[error("key leaf {field} value {value} does not match entry key {key}")]
    KeyMismatch {
        field: String,
        value: String,
        key: String,
    },

    #[error("{path} does not exist and missing elements are not created")]
    MissingElement { path: String },

    #[error("cannot set {path} to a {value_type} value")]
    InvalidValue { path: String, value_type: &'static str },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Path(#[from] PathError),
}
