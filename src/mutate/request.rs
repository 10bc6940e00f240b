//! Applying SetRequests and Notifications to a tree.

use super::node::{delete_node, get_or_create_node, set_node};
use super::{MutationError, UnmarshalOptions};
use crate::fieldpath::Path;
use crate::model::Node;
use crate::notification::{Notification, SetRequest};

/// Applies a SetRequest to the tree rooted at `root`: deletes, then
/// replaces, then updates.
///
/// The prefix is resolved to a subject node first. When that fails, for
/// example because the prefix names a container that schema compression
/// removed, the root becomes the subject and the prefix is joined onto
/// every path instead.
///
/// Nothing is rolled back on error; clone the tree first if the batch must
/// apply atomically.
pub fn unmarshal_set_request(
    root: &mut Node,
    req: &SetRequest,
    opts: &UnmarshalOptions,
) -> Result<(), MutationError> {
    let prefix = req.prefix.clone().unwrap_or_default();
    match get_or_create_node(root, &prefix, opts) {
        Ok(subject) => {
            let retain: Vec<String> = prefix
                .last()
                .map(|e| e.key.keys().cloned().collect())
                .unwrap_or_default();
            return apply(subject, None, &retain, req, opts);
        }
        Err(err) => {
            tracing::debug!(prefix = %prefix, error = %err, "prefix not resolved, joining it onto each path");
        }
    }
    apply(root, Some(&prefix), &[], req, opts)
}

fn apply(
    subject: &mut Node,
    join: Option<&Path>,
    retain: &[String],
    req: &SetRequest,
    opts: &UnmarshalOptions,
) -> Result<(), MutationError> {
    for path in &req.delete {
        let path = joined(join, path)?;
        tracing::trace!(path = %path, "delete");
        delete(subject, &path, retain, opts)?;
    }
    for update in &req.replace {
        let path = joined(join, &update.path)?;
        tracing::trace!(path = %path, "replace");
        delete(subject, &path, retain, opts)?;
        set_node(subject, &path, &update.val, opts)?;
    }
    for update in &req.update {
        let path = joined(join, &update.path)?;
        tracing::trace!(path = %path, "update");
        set_node(subject, &path, &update.val, opts)?;
    }
    Ok(())
}

// The empty path clears the subject, keeping the key leaves of a list entry.
fn delete(subject: &mut Node, path: &Path, retain: &[String], opts: &UnmarshalOptions) -> Result<(), MutationError> {
    if path.is_empty() {
        subject.clear(retain);
        return Ok(());
    }
    delete_node(subject, path, opts)
}

fn joined(prefix: Option<&Path>, path: &Path) -> Result<Path, MutationError> {
    match prefix {
        Some(prefix) => Ok(prefix.join(path)?),
        None => Ok(path.clone()),
    }
}

/// Applies notifications in order. An atomic notification first clears
/// everything under its prefix.
pub fn unmarshal_notifications(
    root: &mut Node,
    notifications: &[Notification],
    opts: &UnmarshalOptions,
) -> Result<(), MutationError> {
    for n in notifications {
        let mut delete = n.delete.clone();
        if n.atomic {
            delete.push(Path::new());
        }
        let req = SetRequest {
            prefix: n.prefix.clone(),
            delete,
            replace: Vec::new(),
            update: n.update.clone(),
        };
        unmarshal_set_request(root, &req, opts)?;
    }
    Ok(())
}
