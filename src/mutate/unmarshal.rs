//! Unmarshalling decoded JSON-like subtrees into nodes.
//!
//! Members nest the way field path tags do: a field tagged `config/mtu`
//! is read from `{"config": {"mtu": ...}}`. Member names may carry a
//! `module:` qualifier.

use super::node::{merge_node, strip_module, target, Target};
use super::{MutationError, UnmarshalOptions};
use crate::error::Error;
use crate::fieldpath::SchemaPath;
use crate::model::{KeyedList, Node};
use crate::value::{Map, Value};

/// Unmarshals a JSON document into `node`, merging with its current content.
pub fn unmarshal(json: &str, node: &mut Node, opts: &UnmarshalOptions) -> Result<(), Error> {
    let value = crate::value::from_json(json)?;
    match value {
        Value::Map(map) => Ok(unmarshal_into(node, &map, opts)?),
        other => Err(MutationError::InvalidValue {
            path: node.type_name().to_string(),
            value_type: other.type_name(),
        }
        .into()),
    }
}

/// Unmarshals `map` into `node`. Members that no declared field path
/// reaches, at any depth, fail unless `ignore_extra_fields` is set.
pub fn unmarshal_into(node: &mut Node, map: &Map, opts: &UnmarshalOptions) -> Result<(), MutationError> {
    check_members(node, map, opts)?;

    let fields: Vec<(String, Vec<SchemaPath>)> = node
        .fields()
        .filter(|f| !f.def.annotation)
        .map(|f| (f.def.name.clone(), f.def.paths_for(opts.prefer_shadow_path).to_vec()))
        .collect();
    for (name, paths) in fields {
        for schema_path in &paths {
            if let Some(value) = lookup(map, schema_path) {
                unmarshal_field(node, &name, value, opts)?;
            }
        }
    }
    Ok(())
}

/// Unmarshals a sequence of entry maps into `list`, merging each into the
/// existing entry with the same key. New entries are appended in order.
pub fn unmarshal_list(list: &mut KeyedList, items: &[Value], opts: &UnmarshalOptions) -> Result<(), MutationError> {
    for item in items {
        let map = item.as_map().ok_or_else(|| MutationError::InvalidValue {
            path: list.spec().element_type.clone(),
            value_type: item.type_name(),
        })?;
        let mut entry = list.new_entry()?;
        unmarshal_into(&mut entry, map, opts)?;
        let key = entry
            .list_key(list.key_names())
            .map_err(|_| MutationError::MissingKeys {
                path: list.spec().element_type.clone(),
                keys: list.key_names().to_vec(),
            })?;
        merge_node(list.get_or_create(&key)?, entry)?;
    }
    Ok(())
}

fn check_members(node: &Node, map: &Map, opts: &UnmarshalOptions) -> Result<(), MutationError> {
    let declared: Vec<&[String]> = node
        .fields()
        .filter(|f| !f.def.annotation)
        .flat_map(|f| {
            f.def
                .schema_paths()
                .iter()
                .chain(f.def.shadow_schema_paths().iter())
        })
        .map(Vec::as_slice)
        .collect();
    check_level(node, map, &declared, 0, opts)
}

// Every member at `depth` must continue at least one declared path. A member
// that completes a path belongs to that field and is not descended into.
fn check_level(
    node: &Node,
    map: &Map,
    declared: &[&[String]],
    depth: usize,
    opts: &UnmarshalOptions,
) -> Result<(), MutationError> {
    for (member, value) in map.iter() {
        let name = strip_module(member);
        let reached: Vec<&[String]> = declared
            .iter()
            .copied()
            .filter(|p| p.get(depth).is_some_and(|n| n == name))
            .collect();
        if reached.is_empty() {
            if opts.ignore_extra_fields {
                tracing::debug!(type_name = node.type_name(), field = %member, depth, "ignoring unknown field");
                continue;
            }
            return Err(MutationError::UnexpectedField {
                type_name: node.type_name().to_string(),
                field: member.clone(),
            });
        }
        if reached.iter().any(|p| p.len() == depth + 1) {
            continue;
        }
        if let Some(inner) = value.as_map() {
            check_level(node, inner, &reached, depth + 1, opts)?;
        }
    }
    Ok(())
}

fn lookup<'v>(map: &'v Map, schema_path: &[String]) -> Option<&'v Value> {
    let (first, rest) = schema_path.split_first()?;
    let mut current = member(map, first)?;
    for name in rest {
        current = member(current.as_map()?, name)?;
    }
    Some(current)
}

fn member<'v>(map: &'v Map, name: &str) -> Option<&'v Value> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| strip_module(k) == name)
            .map(|(_, v)| v)
    })
}

fn unmarshal_field(node: &mut Node, name: &str, value: &Value, opts: &UnmarshalOptions) -> Result<(), MutationError> {
    let invalid = |value: &Value| MutationError::InvalidValue {
        path: name.to_string(),
        value_type: value.type_name(),
    };
    match target(node, name)? {
        Target::Leaf => node.set_leaf(name, value.clone())?,
        Target::LeafList => match value {
            Value::List(items) => node.set_leaf_list(name, items.clone())?,
            other => return Err(invalid(other)),
        },
        Target::Container => match value {
            Value::Map(map) => unmarshal_into(node.get_or_create_container(name)?, map, opts)?,
            other => return Err(invalid(other)),
        },
        Target::List(_) => match value {
            Value::List(items) => unmarshal_list(node.get_or_create_list(name)?, items, opts)?,
            other => return Err(invalid(other)),
        },
    }
    Ok(())
}
