//! Path resolution against a tree: get-or-create, set and delete.

use super::unmarshal::{unmarshal_into, unmarshal_list};
use super::{MutationError, UnmarshalOptions};
use crate::fieldpath::{ListKey, Path, PathElem};
use crate::model::{canonical_key, FieldKind, FieldValue, ModelError, Node};
use crate::value::{Map, Value};

/// FieldMatch is the field whose declared path is the longest prefix of
/// the remaining path elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldMatch {
    pub name: String,
    pub consumed: usize,
    /// Matched through a path that is not in use: the shadow path when not
    /// preferring shadows, or the primary path when preferring them.
    pub ignored: bool,
}

pub(crate) fn match_field(node: &Node, elems: &[PathElem], prefer_shadow: bool) -> Option<FieldMatch> {
    let mut best: Option<FieldMatch> = None;
    for field in node.fields() {
        if field.def.annotation {
            continue;
        }
        let candidates = field
            .def
            .paths_for(prefer_shadow)
            .iter()
            .map(|p| (p, false))
            .chain(field.def.ignored_paths(prefer_shadow).iter().map(|p| (p, true)));
        for (schema_path, ignored) in candidates {
            if !is_prefix(schema_path, elems) {
                continue;
            }
            let better = match &best {
                None => true,
                Some(b) => {
                    schema_path.len() > b.consumed
                        || (schema_path.len() == b.consumed && b.ignored && !ignored)
                }
            };
            if better {
                best = Some(FieldMatch {
                    name: field.def.name.clone(),
                    consumed: schema_path.len(),
                    ignored,
                });
            }
        }
    }
    best
}

// Keys may only appear on the last element of the matched prefix.
fn is_prefix(schema_path: &[String], elems: &[PathElem]) -> bool {
    if schema_path.is_empty() || schema_path.len() > elems.len() {
        return false;
    }
    schema_path
        .iter()
        .zip(elems)
        .enumerate()
        .all(|(i, (name, elem))| {
            strip_module(&elem.name) == name && (i + 1 == schema_path.len() || !elem.has_key())
        })
}

/// Drops a `module:` qualifier from a name.
pub(crate) fn strip_module(name: &str) -> &str {
    name.split_once(':').map(|(_, n)| n).unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Leaf,
    LeafList,
    Container,
    List(Vec<String>),
}

pub(crate) fn target(node: &Node, name: &str) -> Result<Target, MutationError> {
    let def = node.field_def(name)?;
    match def.kind() {
        Some(FieldKind::Leaf(_)) => Ok(Target::Leaf),
        Some(FieldKind::LeafList(_)) => Ok(Target::LeafList),
        Some(FieldKind::Container(_)) => Ok(Target::Container),
        Some(FieldKind::List(spec)) => Ok(Target::List(spec.keys.clone())),
        None => Err(ModelError::InvalidSchema(format!("field {} has no kind", name)).into()),
    }
}

fn path_string(elems: &[PathElem]) -> String {
    Path::from_elems(elems.to_vec()).to_string()
}

struct Resolved<'e> {
    name: String,
    /// The matched elements; the last one carries any list key.
    matched: &'e [PathElem],
    rest: &'e [PathElem],
}

impl<'e> Resolved<'e> {
    fn last(&self) -> &'e PathElem {
        &self.matched[self.matched.len() - 1]
    }

    fn at(&self) -> String {
        path_string(self.matched)
    }

    /// The key on the last matched element, in the canonical form the
    /// entries of the list field are stored under.
    fn entry_key(&self, node: &Node, keys: &[String]) -> Result<ListKey, MutationError> {
        let key = self.last().list_key();
        if !key.has_names(keys) {
            return Err(MutationError::MissingKeys {
                path: self.at(),
                keys: keys.to_vec(),
            });
        }
        match node.field_def(&self.name)?.kind() {
            Some(FieldKind::List(spec)) => Ok(canonical_key(node.schema(), spec, &key)?),
            _ => Ok(key),
        }
    }

    fn reject_key(&self) -> Result<(), MutationError> {
        if self.last().has_key() {
            return Err(MutationError::UnexpectedKey { path: self.at() });
        }
        Ok(())
    }
}

/// Matches the next field along `elems`. Returns None for a match through
/// an ignored path.
fn resolve<'e>(
    node: &Node,
    elems: &'e [PathElem],
    opts: &UnmarshalOptions,
) -> Result<Option<Resolved<'e>>, MutationError> {
    let m = match_field(node, elems, opts.prefer_shadow_path).ok_or_else(|| MutationError::NoMatch {
        type_name: node.type_name().to_string(),
        path: path_string(elems),
    })?;
    if m.ignored {
        tracing::debug!(
            field = %m.name,
            path = %path_string(elems),
            "path matches ignored field path"
        );
        return Ok(None);
    }
    let (matched, rest) = elems.split_at(m.consumed);
    Ok(Some(Resolved {
        name: m.name,
        matched,
        rest,
    }))
}

fn container_for<'n>(
    node: &'n mut Node,
    r: &Resolved<'_>,
    opts: &UnmarshalOptions,
) -> Result<&'n mut Node, MutationError> {
    r.reject_key()?;
    if !opts.init_missing_elements && node.container(&r.name).is_none() {
        return Err(MutationError::MissingElement { path: r.at() });
    }
    Ok(node.get_or_create_container(&r.name)?)
}

fn entry_for<'n>(
    node: &'n mut Node,
    r: &Resolved<'_>,
    key: &ListKey,
    opts: &UnmarshalOptions,
) -> Result<&'n mut Node, MutationError> {
    if !opts.init_missing_elements && !node.list(&r.name).is_some_and(|l| l.contains(key)) {
        return Err(MutationError::MissingElement { path: r.at() });
    }
    Ok(node.get_or_create_list(&r.name)?.get_or_create(key)?)
}

/// Returns the node addressed by `path`, creating missing containers and
/// list entries on the way unless `init_missing_elements` is off.
pub fn get_or_create_node<'n>(
    root: &'n mut Node,
    path: &Path,
    opts: &UnmarshalOptions,
) -> Result<&'n mut Node, MutationError> {
    get_or_create(root, path.as_slice(), opts)
}

fn get_or_create<'n>(
    node: &'n mut Node,
    elems: &[PathElem],
    opts: &UnmarshalOptions,
) -> Result<&'n mut Node, MutationError> {
    if elems.is_empty() {
        return Ok(node);
    }
    let r = resolve(node, elems, opts)?.ok_or_else(|| MutationError::NoMatch {
        type_name: node.type_name().to_string(),
        path: path_string(elems),
    })?;
    match target(node, &r.name)? {
        Target::Leaf | Target::LeafList => Err(MutationError::NotANode { path: r.at() }),
        Target::Container => {
            let child = container_for(node, &r, opts)?;
            get_or_create(child, r.rest, opts)
        }
        Target::List(keys) => {
            let key = r.entry_key(node, &keys)?;
            let entry = entry_for(node, &r, &key, opts)?;
            get_or_create(entry, r.rest, opts)
        }
    }
}

/// Sets the value at `path`.
///
/// A `Value::Map` at a container or list entry is unmarshalled and merged
/// into it; a `Value::List` at an unkeyed list address merges entries.
/// Paths matching an ignored field path are skipped.
pub fn set_node(root: &mut Node, path: &Path, value: &Value, opts: &UnmarshalOptions) -> Result<(), MutationError> {
    set_at(root, path.as_slice(), value, opts, None)
}

fn set_at(
    node: &mut Node,
    elems: &[PathElem],
    value: &Value,
    opts: &UnmarshalOptions,
    entry_key: Option<&ListKey>,
) -> Result<(), MutationError> {
    if elems.is_empty() {
        return match value {
            Value::Map(map) => set_subtree(node, map, opts, entry_key),
            other => Err(MutationError::InvalidValue {
                path: node.type_name().to_string(),
                value_type: other.type_name(),
            }),
        };
    }

    let r = match resolve(node, elems, opts)? {
        Some(r) => r,
        None => return Ok(()),
    };
    match target(node, &r.name)? {
        Target::Leaf => {
            r.reject_key()?;
            if !r.rest.is_empty() {
                return Err(MutationError::PathBeyondLeaf { path: r.at() });
            }
            if let Some(key) = entry_key {
                check_key_leaf(node, &r.name, value, key)?;
            }
            node.set_leaf(&r.name, value.clone())?;
        }
        Target::LeafList => {
            r.reject_key()?;
            if !r.rest.is_empty() {
                return Err(MutationError::PathBeyondLeaf { path: r.at() });
            }
            match value {
                Value::List(items) => node.set_leaf_list(&r.name, items.clone())?,
                Value::Null => {
                    node.clear_field(&r.name);
                }
                other => {
                    return Err(MutationError::InvalidValue {
                        path: r.at(),
                        value_type: other.type_name(),
                    })
                }
            }
        }
        Target::Container => {
            let child = container_for(node, &r, opts)?;
            set_at(child, r.rest, value, opts, None)?;
        }
        Target::List(keys) if r.last().has_key() => {
            let key = r.entry_key(node, &keys)?;
            let entry = entry_for(node, &r, &key, opts)?;
            set_at(entry, r.rest, value, opts, Some(&key))?;
        }
        Target::List(keys) => {
            if !r.rest.is_empty() {
                return Err(MutationError::MissingKeys { path: r.at(), keys });
            }
            match value {
                Value::List(items) => {
                    if !opts.init_missing_elements && node.list(&r.name).is_none() {
                        return Err(MutationError::MissingElement { path: r.at() });
                    }
                    unmarshal_list(node.get_or_create_list(&r.name)?, items, opts)?;
                }
                Value::Null => {
                    node.clear_field(&r.name);
                }
                other => {
                    return Err(MutationError::InvalidValue {
                        path: r.at(),
                        value_type: other.type_name(),
                    })
                }
            }
        }
    }
    Ok(())
}

fn set_subtree(
    node: &mut Node,
    map: &Map,
    opts: &UnmarshalOptions,
    entry_key: Option<&ListKey>,
) -> Result<(), MutationError> {
    let mut incoming = Node::new(node.schema(), node.type_name())?;
    unmarshal_into(&mut incoming, map, opts)?;
    if let Some(key) = entry_key {
        for (name, expected) in key.iter() {
            if let Some(v) = incoming.leaf(name) {
                if v.key_string().as_deref() != Some(expected.as_str()) {
                    return Err(key_mismatch(name, v, key));
                }
            }
        }
    }
    merge_node(node, incoming)
}

fn check_key_leaf(node: &Node, name: &str, value: &Value, key: &ListKey) -> Result<(), MutationError> {
    let expected = match key.get(name) {
        Some(expected) => expected,
        None => return Ok(()),
    };
    let def = node.field_def(name)?;
    let accepted = def.leaf.and_then(|t| t.accept(value, &def.enum_values));
    match accepted.as_ref().and_then(Value::key_string) {
        Some(s) if s == expected => Ok(()),
        _ => Err(key_mismatch(name, value, key)),
    }
}

fn key_mismatch(name: &str, value: &Value, key: &ListKey) -> MutationError {
    MutationError::KeyMismatch {
        field: name.to_string(),
        value: value.to_json().to_string(),
        key: key.to_string(),
    }
}

/// Overlays the set fields of `src` onto `dst`. Containers and list entries
/// merge recursively; leaves and leaf-lists are overwritten.
pub(crate) fn merge_node(dst: &mut Node, src: Node) -> Result<(), MutationError> {
    for (name, value) in src.into_fields() {
        match value {
            FieldValue::Container(child) => {
                let target = dst.get_or_create_container(&name)?;
                merge_node(target, *child)?;
            }
            FieldValue::List(list) => {
                let target = dst.get_or_create_list(&name)?;
                for (key, entry) in list.into_entries() {
                    merge_node(target.get_or_create(&key)?, entry)?;
                }
            }
            leaf => dst.insert_field(name, leaf),
        }
    }
    Ok(())
}

/// Deletes the value or subtree at `path`. The empty path clears the node.
///
/// Deleting a list entry's key leaf deletes the entry. Deleting a location
/// that is not set is a no-op. A path ending at a container that schema
/// compression removed clears every field declared beneath it.
pub fn delete_node(root: &mut Node, path: &Path, opts: &UnmarshalOptions) -> Result<(), MutationError> {
    if path.is_empty() {
        root.clear(&[]);
        return Ok(());
    }
    delete_at(root, path.as_slice(), opts, None)?;
    Ok(())
}

// Returns true when the caller must remove the entry `node` belongs to.
fn delete_at(
    node: &mut Node,
    elems: &[PathElem],
    opts: &UnmarshalOptions,
    entry_key: Option<&ListKey>,
) -> Result<bool, MutationError> {
    let r = match resolve(node, elems, opts) {
        Ok(Some(r)) => r,
        Ok(None) => return Ok(false),
        Err(err @ MutationError::NoMatch { .. }) => return clear_beneath(node, elems, opts, entry_key, err),
        Err(err) => return Err(err),
    };
    match target(node, &r.name)? {
        Target::Leaf | Target::LeafList => {
            if !r.rest.is_empty() {
                return Err(MutationError::PathBeyondLeaf { path: r.at() });
            }
            if entry_key.is_some_and(|k| k.get(&r.name).is_some()) {
                return Ok(true);
            }
            node.clear_field(&r.name);
        }
        Target::Container => {
            r.reject_key()?;
            if r.rest.is_empty() {
                node.clear_field(&r.name);
            } else if let Some(child) = node.container_mut(&r.name) {
                delete_at(child, r.rest, opts, None)?;
            }
        }
        Target::List(keys) if r.last().has_key() => {
            let key = r.entry_key(node, &keys)?;
            let list = match node.list_mut(&r.name) {
                Some(list) => list,
                None => return Ok(false),
            };
            let remove = match list.get_mut(&key) {
                Some(_) if r.rest.is_empty() => true,
                Some(entry) => delete_at(entry, r.rest, opts, Some(&key))?,
                None => false,
            };
            if remove {
                list.remove(&key);
                if list.is_empty() {
                    node.clear_field(&r.name);
                }
            }
        }
        Target::List(keys) => {
            if !r.rest.is_empty() {
                return Err(MutationError::MissingKeys { path: r.at(), keys });
            }
            node.clear_field(&r.name);
        }
    }
    Ok(false)
}

// `elems` names no field but may name a compressed-out container. Clears
// the fields whose declared paths run through it; key leaves of the entry
// `node` belongs to are kept. Fails with `no_match` when no path does.
fn clear_beneath(
    node: &mut Node,
    elems: &[PathElem],
    opts: &UnmarshalOptions,
    entry_key: Option<&ListKey>,
    no_match: MutationError,
) -> Result<bool, MutationError> {
    let prefer = opts.prefer_shadow_path;
    let mut covered = false;
    let mut clear = Vec::new();
    for field in node.fields() {
        if field.def.annotation {
            continue;
        }
        if field.def.paths_for(prefer).iter().any(|p| runs_through(p, elems)) {
            covered = true;
            clear.push(field.def.name.clone());
        } else if field.def.ignored_paths(prefer).iter().any(|p| runs_through(p, elems)) {
            covered = true;
        }
    }
    if !covered {
        return Err(no_match);
    }
    tracing::debug!(path = %path_string(elems), fields = ?clear, "clearing fields beneath compressed path");
    for name in clear {
        if entry_key.is_some_and(|k| k.get(&name).is_some()) {
            continue;
        }
        node.clear_field(&name);
    }
    Ok(false)
}

// A declared path runs through `elems` when `elems` is a strict, unkeyed
// prefix of it.
fn runs_through(schema_path: &[String], elems: &[PathElem]) -> bool {
    elems.len() < schema_path.len()
        && schema_path
            .iter()
            .zip(elems)
            .all(|(name, elem)| strip_module(&elem.name) == name && !elem.has_key())
}
