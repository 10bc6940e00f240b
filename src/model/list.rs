//! Keyed lists: plain keyed associations and user-ordered maps.

use super::node::Node;
use super::types::{ListSpec, ModelSchema};
use super::ModelError;
use crate::fieldpath::{ListKey, Path};
use crate::typed::{validate_list, ValidationErrors};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// KeyedList holds the entries of a list field by key.
///
/// A system-ordered list iterates in key order. A user-ordered list
/// iterates in the order entries were appended.
#[derive(Clone)]
pub struct KeyedList {
    schema: Arc<ModelSchema>,
    spec: ListSpec,
    order: Vec<ListKey>,
    entries: BTreeMap<ListKey, Node>,
}

impl KeyedList {
    pub fn new(schema: &Arc<ModelSchema>, spec: ListSpec) -> Result<KeyedList, ModelError> {
        if schema.find_type(&spec.element_type).is_none() {
            return Err(ModelError::UnknownType(spec.element_type.clone()));
        }
        Ok(KeyedList {
            schema: Arc::clone(schema),
            spec,
            order: Vec::new(),
            entries: BTreeMap::new(),
        })
    }

    pub fn spec(&self) -> &ListSpec {
        &self.spec
    }

    pub fn key_names(&self) -> &[String] {
        &self.spec.keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ListKey) -> Option<&Node> {
        self.entries.get(key)
    }

    /// Returns a mutable entry. Changing its key leaves through the returned
    /// reference desynchronizes it from its lookup key; `validate` reports it.
    pub fn get_mut(&mut self, key: &ListKey) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &ListKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the lookup keys in iteration order.
    pub fn keys(&self) -> Vec<&ListKey> {
        if self.spec.is_user_ordered() {
            self.order.iter().collect()
        } else {
            self.entries.keys().collect()
        }
    }

    /// Iterates (lookup key, entry) pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ListKey, &Node)> {
        self.keys()
            .into_iter()
            .filter_map(move |k| self.entries.get_key_value(k))
    }

    /// Creates an empty, unattached entry of the list's element type.
    pub fn new_entry(&self) -> Result<Node, ModelError> {
        Node::new(&self.schema, &self.spec.element_type)
    }

    /// Consumes the list, yielding entries in iteration order.
    pub fn into_entries(mut self) -> Vec<(ListKey, Node)> {
        let keys: Vec<ListKey> = self.keys().into_iter().cloned().collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k).map(|entry| (k, entry)))
            .collect()
    }

    /// Appends an entry, keyed by its own key leaves.
    pub fn append(&mut self, entry: Node) -> Result<(), ModelError> {
        if entry.type_name() != self.spec.element_type {
            return Err(ModelError::WrongKind {
                field: entry.type_name().to_string(),
                expected: "list entry",
            });
        }
        let key = entry.list_key(&self.spec.keys)?;
        if self.entries.contains_key(&key) {
            return Err(ModelError::DuplicateKey {
                type_name: self.spec.element_type.clone(),
                key: key.to_string(),
            });
        }
        self.order.push(key.clone());
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Returns `key` in the form entries are stored under, so that `042`
    /// and `42` address the same entry of a list keyed by an integer.
    pub fn canonical_key(&self, key: &ListKey) -> Result<ListKey, ModelError> {
        canonical_key(&self.schema, &self.spec, key)
    }

    /// Creates an entry with the given key and appends it.
    pub fn append_new(&mut self, key: &ListKey) -> Result<&mut Node, ModelError> {
        if !key.has_names(&self.spec.keys) {
            return Err(ModelError::InvalidKey {
                type_name: self.spec.element_type.clone(),
                key: key.to_string(),
            });
        }
        let mut entry = self.new_entry()?;
        entry.set_key(key)?;
        let stored = entry.list_key(&self.spec.keys)?;
        self.append(entry)?;
        self.entries
            .get_mut(&stored)
            .ok_or_else(|| ModelError::MissingKey {
                field: stored.to_string(),
            })
    }

    /// Returns the entry with the given key, appending it if absent. The key
    /// is compared in canonical form.
    pub fn get_or_create(&mut self, key: &ListKey) -> Result<&mut Node, ModelError> {
        let key = self.canonical_key(key)?;
        if !self.entries.contains_key(&key) {
            return self.append_new(&key);
        }
        self.entries.get_mut(&key).ok_or_else(|| ModelError::MissingKey {
            field: key.to_string(),
        })
    }

    /// Removes and returns the entry with the given key.
    pub fn remove(&mut self, key: &ListKey) -> Option<Node> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry)
    }

    /// Checks key consistency, uniqueness and cardinality of this list and
    /// of the lists nested in its entries.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_list(self, &Path::new())
    }
}

/// Parses each key value with its leaf type and prints it back.
pub(crate) fn canonical_key(schema: &Arc<ModelSchema>, spec: &ListSpec, key: &ListKey) -> Result<ListKey, ModelError> {
    if !key.has_names(&spec.keys) {
        return Err(ModelError::InvalidKey {
            type_name: spec.element_type.clone(),
            key: key.to_string(),
        });
    }
    let mut entry = Node::new(schema, &spec.element_type)?;
    entry.set_key(key)?;
    entry.list_key(&spec.keys)
}

impl PartialEq for KeyedList {
    fn eq(&self, other: &Self) -> bool {
        if self.spec != other.spec || self.entries != other.entries {
            return false;
        }
        !self.spec.is_user_ordered() || self.order == other.order
    }
}

impl fmt::Debug for KeyedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
