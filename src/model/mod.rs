//! Model module - the contract a generated data model offers the core.
//!
//! `ModelSchema` declares struct types and their fields (paths, shadow
//! paths, kinds). `Node` is the generic runtime node built over it and
//! `KeyedList` holds list entries by key.

mod list;
mod node;
mod types;

pub use list::*;
pub(crate) use list::canonical_key;
pub use node::*;
pub use types::*;

use thiserror::Error;

/// ModelError reports misuse of the data-model contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid model schema: {0}")]
    InvalidSchema(String),

    #[error("unknown type {0}")]
    UnknownType(String),

    #[error("type {type_name} has no field {field}")]
    UnknownField { type_name: String, field: String },

    #[error("field {field} is not a {expected}")]
    WrongKind { field: String, expected: &'static str },

    #[error("field {field} does not accept {value}")]
    InvalidValue { field: String, value: String },

    #[error("key field {field} is not set")]
    MissingKey { field: String },

    #[error("invalid key {key} for list of {type_name}")]
    InvalidKey { type_name: String, key: String },

    #[error("duplicate key {key} in list of {type_name}")]
    DuplicateKey { type_name: String, key: String },
}
