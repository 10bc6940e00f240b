//! # gNMI Tree
//!
//! Mapping between schema-described data trees and flat, path-addressed
//! updates.
//!
//! A field of a generated data model may be reachable through more than one
//! path (schema compression) and may carry a shadow path that is only used
//! on request. This crate computes the addresses of every node under those
//! rules, diffs two trees into updates and deletes, and applies SetRequests
//! and Notifications back onto a tree.
//!
//! ## Modules
//!
//! - [`schema`] - Schema entries and the leafref index built over them
//! - [`fieldpath`] - Paths, list keys and sets of equivalent paths
//! - [`model`] - The generated data model contract: types, nodes and keyed lists
//! - [`typed`] - Tree walk, flattening, diff and list validation
//! - [`mutate`] - Get-or-create, set and delete by path, and request application
//! - [`notification`] - Protocol message shapes
//! - [`value`] - Opaque leaf payloads

pub mod error;
pub mod fieldpath;
pub mod model;
pub mod mutate;
pub mod notification;
pub mod schema;
pub mod typed;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use error::Error;
pub use fieldpath::{ListKey, Path, PathElem, PathSpec};
pub use model::{KeyedList, ModelSchema, Node};
pub use mutate::{
    delete_node, get_or_create_node, set_node, unmarshal_notifications, unmarshal_set_request, UnmarshalOptions,
};
pub use notification::{Notification, SetRequest, Update};
pub use schema::{SchemaEntry, SchemaIndex};
pub use typed::{diff, flatten, validate, DiffOptions, DiffResult};
pub use value::Value;
