//! Flattening a tree into a map from canonical address to leaf value.

use super::walk::{walk, TreeVisitor, WalkOptions};
use crate::fieldpath::{Path, PathError, PathSpec};
use crate::model::{FieldDef, FieldValue, Node};
use crate::value::Value;
use std::collections::{BTreeMap, HashSet};

/// DiffOptions modulates flatten and diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Address fields by their shadow paths when they declare one.
    pub prefer_shadow_path: bool,
    /// Record each leaf under its least specific path only.
    pub map_to_single_path: bool,
    /// Do not report leaves present only in the modified tree.
    pub ignore_additions: bool,
}

impl DiffOptions {
    pub fn new() -> Self {
        DiffOptions::default()
    }

    pub fn prefer_shadow_path(mut self, prefer: bool) -> Self {
        self.prefer_shadow_path = prefer;
        self
    }

    pub fn map_to_single_path(mut self, single: bool) -> Self {
        self.map_to_single_path = single;
        self
    }

    pub fn ignore_additions(mut self, ignore: bool) -> Self {
        self.ignore_additions = ignore;
        self
    }

    pub(crate) fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            prefer_shadow_path: self.prefer_shadow_path,
            map_to_single_path: self.map_to_single_path,
        }
    }
}

/// LeafEntry is one flattened leaf: its value and the concrete address
/// used when reporting it.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry {
    pub value: Value,
    pub path: Path,
}

/// LeafMap maps the canonical key of a leaf's PathSpec to the leaf.
pub type LeafMap = BTreeMap<String, LeafEntry>;

#[derive(Default)]
struct Flattener {
    processed: HashSet<String>,
    leaves: LeafMap,
}

impl<'a> TreeVisitor<'a> for Flattener {
    fn visit_leaf(&mut self, _def: &'a FieldDef, value: &'a FieldValue, paths: &PathSpec) -> Result<(), PathError> {
        let key = paths.canonical_key();
        if !self.processed.insert(key.clone()) {
            return Ok(());
        }

        let value = match value {
            FieldValue::Leaf(v) => v.clone(),
            FieldValue::LeafList(vs) => Value::List(vs.clone()),
            _ => return Ok(()),
        };
        if value.is_default() {
            return Ok(());
        }

        let path = paths.first().cloned().ok_or(PathError::MissingAnnotation)?;
        self.leaves.insert(key, LeafEntry { value, path });
        Ok(())
    }
}

/// Reduces the tree to its set leaves, each recorded once under the
/// canonical key of its address set. Unset and default values are skipped.
pub fn flatten(root: &Node, opts: &DiffOptions) -> Result<LeafMap, PathError> {
    let mut flattener = Flattener::default();
    walk(root, opts.walk_options(), &mut flattener)?;
    tracing::trace!(leaves = flattener.leaves.len(), "flattened tree");
    Ok(flattener.leaves)
}
