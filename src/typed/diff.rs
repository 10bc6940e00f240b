//! Diffing two trees of the same type into updates and deletes.

use super::flatten::{flatten, DiffOptions};
use crate::error::Error;
use crate::fieldpath::Path;
use crate::model::Node;
use crate::notification::{Notification, Update};
use std::collections::BTreeMap;

/// DiffResult is the edit set transforming one tree into another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    pub updates: Vec<Update>,
    pub deletes: Vec<Path>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Converts the edit set into a non-atomic notification with no prefix.
    pub fn into_notification(self) -> Notification {
        Notification {
            prefix: None,
            delete: self.deletes,
            update: self.updates,
            atomic: false,
        }
    }
}

/// Computes the updates and deletes that turn `original` into `modified`.
///
/// Both trees must be of the same type. Leaves are compared on their
/// in-memory values. Output is ordered by canonical address.
pub fn diff(original: &Node, modified: &Node, opts: &DiffOptions) -> Result<DiffResult, Error> {
    if original.type_name() != modified.type_name() {
        return Err(Error::TypeMismatch {
            original: original.type_name().to_string(),
            modified: modified.type_name().to_string(),
        });
    }

    let orig_leaves = flatten(original, opts)?;
    let mut mod_leaves = flatten(modified, opts)?;

    let mut updates = BTreeMap::new();
    let mut deletes = Vec::new();
    for (key, orig) in orig_leaves {
        match mod_leaves.remove(&key) {
            None => deletes.push(orig.path),
            Some(m) if m.value != orig.value => {
                updates.insert(key, Update::new(m.path, m.value));
            }
            Some(_) => {}
        }
    }
    if !opts.ignore_additions {
        for (key, m) in mod_leaves {
            updates.insert(key, Update::new(m.path, m.value));
        }
    }

    tracing::debug!(
        updates = updates.len(),
        deletes = deletes.len(),
        "computed diff"
    );
    Ok(DiffResult {
        updates: updates.into_values().collect(),
        deletes,
    })
}
