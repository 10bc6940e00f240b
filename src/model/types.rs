//! The declarative description of generated data-model types.

use super::ModelError;
use crate::fieldpath::SchemaPath;
use crate::schema::OrderedBy;
use crate::value::{EnumValue, Value};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ModelSchema is the set of struct types of a generated data model.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelSchema {
    pub types: Vec<StructType>,

    #[serde(skip)]
    type_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for ModelSchema {
    fn clone(&self) -> Self {
        ModelSchema {
            types: self.types.clone(),
            type_map: OnceCell::new(),
        }
    }
}

impl ModelSchema {
    pub fn new(types: Vec<StructType>) -> Self {
        ModelSchema {
            types,
            type_map: OnceCell::new(),
        }
    }

    /// Parses and checks a YAML model description.
    pub fn from_yaml(yaml: &str) -> Result<Self, ModelError> {
        let schema: ModelSchema =
            serde_yaml::from_str(yaml).map_err(|e| ModelError::InvalidSchema(e.to_string()))?;
        schema.check()?;
        Ok(schema)
    }

    /// Returns the struct type with the given name.
    pub fn find_type(&self, name: &str) -> Option<&StructType> {
        let map = self.type_map.get_or_init(|| {
            self.types
                .iter()
                .enumerate()
                .map(|(i, t)| (t.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.types[i])
    }

    /// Checks that every field has exactly one kind and a path, that
    /// referenced types exist and that list keys name leaves of the
    /// element type.
    pub fn check(&self) -> Result<(), ModelError> {
        for t in &self.types {
            for field in &t.fields {
                let invalid = |msg: &str| {
                    ModelError::InvalidSchema(format!("{}.{}: {}", t.name, field.name, msg))
                };
                let kinds = [
                    field.leaf.is_some(),
                    field.leaf_list.is_some(),
                    field.container.is_some(),
                    field.list.is_some(),
                ];
                if kinds.iter().filter(|k| **k).count() != 1 {
                    return Err(invalid("field must declare exactly one kind"));
                }
                if !field.annotation && field.schema_paths().is_empty() {
                    return Err(invalid("field declares no path"));
                }
                if let Some(container) = &field.container {
                    if self.find_type(container).is_none() {
                        return Err(invalid(&format!("unknown type {}", container)));
                    }
                }
                if let Some(list) = &field.list {
                    let element = self
                        .find_type(&list.element_type)
                        .ok_or_else(|| invalid(&format!("unknown type {}", list.element_type)))?;
                    if list.keys.is_empty() {
                        return Err(invalid("list declares no key"));
                    }
                    for key in &list.keys {
                        match element.find_field(key) {
                            Some(f) if f.leaf.is_some() => {}
                            _ => return Err(invalid(&format!("key {} is not a leaf", key))),
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// StructType is one generated type: a named set of fields.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StructType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,

    #[serde(skip)]
    field_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for StructType {
    fn clone(&self) -> Self {
        StructType {
            name: self.name.clone(),
            fields: self.fields.clone(),
            field_map: OnceCell::new(),
        }
    }
}

impl StructType {
    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        let map = self.field_map.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.fields[i])
    }
}

/// FieldDef describes one field of a generated type.
///
/// `path` holds one or more relative schema paths separated by `|`; a
/// compressed field reachable at several locations declares them all.
/// `shadowPath` is the alternate path set used only when preferred.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<LeafType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_list: Option<LeafType>,

    /// Name of the struct type held by a container field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListSpec>,

    /// Enumeration names, in ordinal order starting at 1.
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Marks tree-internal bookkeeping that is never addressed.
    #[serde(default)]
    pub annotation: bool,

    #[serde(skip)]
    paths: OnceCell<Vec<SchemaPath>>,

    #[serde(skip)]
    shadow_paths: OnceCell<Vec<SchemaPath>>,
}

/// FieldKind is the kind of a field, borrowed from its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    Leaf(LeafType),
    LeafList(LeafType),
    Container(&'a str),
    List(&'a ListSpec),
}

impl FieldDef {
    pub fn kind(&self) -> Option<FieldKind<'_>> {
        if let Some(t) = self.leaf {
            return Some(FieldKind::Leaf(t));
        }
        if let Some(t) = self.leaf_list {
            return Some(FieldKind::LeafList(t));
        }
        if let Some(c) = &self.container {
            return Some(FieldKind::Container(c));
        }
        self.list.as_ref().map(FieldKind::List)
    }

    /// Returns the declared schema paths.
    pub fn schema_paths(&self) -> &[SchemaPath] {
        self.paths.get_or_init(|| parse_path_tag(&self.path))
    }

    /// Returns the declared shadow schema paths, empty if none.
    pub fn shadow_schema_paths(&self) -> &[SchemaPath] {
        self.shadow_paths
            .get_or_init(|| self.shadow_path.as_deref().map(parse_path_tag).unwrap_or_default())
    }

    pub fn has_shadow(&self) -> bool {
        !self.shadow_schema_paths().is_empty()
    }

    /// Returns the paths used to address the field.
    pub fn paths_for(&self, prefer_shadow: bool) -> &[SchemaPath] {
        if prefer_shadow && self.has_shadow() {
            self.shadow_schema_paths()
        } else {
            self.schema_paths()
        }
    }

    /// Returns the paths whose matches are silently ignored.
    pub fn ignored_paths(&self, prefer_shadow: bool) -> &[SchemaPath] {
        if prefer_shadow && self.has_shadow() {
            self.schema_paths()
        } else {
            self.shadow_schema_paths()
        }
    }
}

fn parse_path_tag(tag: &str) -> Vec<SchemaPath> {
    tag.split('|')
        .map(|p| {
            p.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<SchemaPath>()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// LeafType is the semantic type of a leaf, used to check values on set
/// and to parse list keys from their string form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    #[default]
    Any,
    String,
    Int,
    Uint,
    Bool,
    Decimal,
    Bytes,
    Enum,
}

impl LeafType {
    /// Returns the value as stored in a leaf of this type, or None if the
    /// value is not acceptable.
    pub fn accept(&self, value: &Value, enum_values: &[String]) -> Option<Value> {
        match (self, value) {
            (LeafType::Any, v) => Some(v.clone()),
            (LeafType::String, Value::String(_)) => Some(value.clone()),
            (LeafType::Int, Value::Int(_)) => Some(value.clone()),
            (LeafType::Int, Value::Uint(u)) => i64::try_from(*u).ok().map(Value::Int),
            (LeafType::Uint, Value::Uint(_)) => Some(value.clone()),
            (LeafType::Uint, Value::Int(i)) => u64::try_from(*i).ok().map(Value::Uint),
            (LeafType::Bool, Value::Bool(_)) => Some(value.clone()),
            (LeafType::Decimal, Value::Float(_)) => Some(value.clone()),
            (LeafType::Decimal, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (LeafType::Decimal, Value::Uint(u)) => Some(Value::Float(*u as f64)),
            (LeafType::Bytes, Value::Bytes(_)) => Some(value.clone()),
            (LeafType::Bytes, Value::List(items)) => items
                .iter()
                .map(|i| match i {
                    Value::Int(o) => u8::try_from(*o).ok(),
                    Value::Uint(o) => u8::try_from(*o).ok(),
                    _ => None,
                })
                .collect::<Option<Vec<u8>>>()
                .map(Value::Bytes),
            (LeafType::Enum, Value::Enum(e)) if e.is_unset() => Some(value.clone()),
            (LeafType::Enum, Value::Enum(e)) => enum_value(&e.name, enum_values),
            (LeafType::Enum, Value::String(s)) => enum_value(s, enum_values),
            _ => None,
        }
    }

    /// Parses the string form of a key leaf.
    pub fn parse_key(&self, raw: &str, enum_values: &[String]) -> Option<Value> {
        match self {
            LeafType::Any | LeafType::String => Some(Value::String(raw.to_string())),
            LeafType::Int => raw.parse().ok().map(Value::Int),
            LeafType::Uint => raw.parse().ok().map(Value::Uint),
            LeafType::Bool => raw.parse().ok().map(Value::Bool),
            LeafType::Decimal => raw.parse().ok().map(Value::Float),
            LeafType::Enum => enum_value(raw, enum_values),
            LeafType::Bytes => None,
        }
    }
}

fn enum_value(name: &str, enum_values: &[String]) -> Option<Value> {
    let pos = enum_values.iter().position(|v| v == name)?;
    Some(Value::Enum(EnumValue::new(pos as i64 + 1, name)))
}

/// ListSpec describes a list field: its entry type, key leaves, ordering
/// and cardinality bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSpec {
    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default, rename = "key")]
    pub keys: Vec<String>,

    #[serde(default)]
    pub ordered_by: OrderedBy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_elements: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,
}

impl ListSpec {
    pub fn is_user_ordered(&self) -> bool {
        self.ordered_by == OrderedBy::User
    }
}
