//! Generic runtime tree node.

use super::list::KeyedList;
use super::types::{FieldDef, FieldKind, ModelSchema, StructType};
use super::ModelError;
use crate::fieldpath::ListKey;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// FieldValue is the current value of a set field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Leaf(Value),
    LeafList(Vec<Value>),
    Container(Box<Node>),
    List(KeyedList),
}

/// FieldInfo is one entry of a node's field enumeration: the field's
/// definition and its value, if set.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo<'a> {
    pub def: &'a FieldDef,
    pub value: Option<&'a FieldValue>,
}

/// Node is an instance of a struct type: a container, a list entry or
/// the root of a data tree.
///
/// Unset fields are absent; leaves never hold `Value::Null`.
#[derive(Clone)]
pub struct Node {
    schema: Arc<ModelSchema>,
    type_index: usize,
    fields: BTreeMap<String, FieldValue>,
}

impl Node {
    /// Creates an empty node of the named type.
    pub fn new(schema: &Arc<ModelSchema>, type_name: &str) -> Result<Node, ModelError> {
        let type_index = schema
            .types
            .iter()
            .position(|t| t.name == type_name)
            .ok_or_else(|| ModelError::UnknownType(type_name.to_string()))?;
        Ok(Node {
            schema: Arc::clone(schema),
            type_index,
            fields: BTreeMap::new(),
        })
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn struct_type(&self) -> &StructType {
        &self.schema.types[self.type_index]
    }

    pub fn type_name(&self) -> &str {
        &self.struct_type().name
    }

    /// Enumerates every declared field in declaration order, set or not.
    pub fn fields(&self) -> impl Iterator<Item = FieldInfo<'_>> {
        self.struct_type().fields.iter().map(move |def| FieldInfo {
            def,
            value: self.fields.get(&def.name),
        })
    }

    pub fn field_def(&self, name: &str) -> Result<&FieldDef, ModelError> {
        self.struct_type()
            .find_field(name)
            .ok_or_else(|| ModelError::UnknownField {
                type_name: self.type_name().to_string(),
                field: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn leaf(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(FieldValue::Leaf(v)) => Some(v),
            _ => None,
        }
    }

    /// Sets a leaf, converting the value to the leaf's type. `Null` unsets it.
    pub fn set_leaf(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let value = value.into();
        let def = self.field_def(name)?;
        let leaf_type = match def.kind() {
            Some(FieldKind::Leaf(t)) => t,
            _ => return Err(wrong_kind(name, "leaf")),
        };
        if value.is_null() {
            self.fields.remove(name);
            return Ok(());
        }
        let accepted = leaf_type
            .accept(&value, &def.enum_values)
            .ok_or_else(|| invalid_value(name, &value))?;
        self.fields.insert(name.to_string(), FieldValue::Leaf(accepted));
        Ok(())
    }

    pub fn leaf_list(&self, name: &str) -> Option<&[Value]> {
        match self.fields.get(name) {
            Some(FieldValue::LeafList(v)) => Some(v),
            _ => None,
        }
    }

    /// Replaces a leaf-list. An empty list unsets it.
    pub fn set_leaf_list(&mut self, name: &str, values: Vec<Value>) -> Result<(), ModelError> {
        let def = self.field_def(name)?;
        let leaf_type = match def.kind() {
            Some(FieldKind::LeafList(t)) => t,
            _ => return Err(wrong_kind(name, "leaf-list")),
        };
        let accepted = values
            .iter()
            .map(|v| {
                leaf_type
                    .accept(v, &def.enum_values)
                    .ok_or_else(|| invalid_value(name, v))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if accepted.is_empty() {
            self.fields.remove(name);
        } else {
            self.fields.insert(name.to_string(), FieldValue::LeafList(accepted));
        }
        Ok(())
    }

    pub fn container(&self, name: &str) -> Option<&Node> {
        match self.fields.get(name) {
            Some(FieldValue::Container(n)) => Some(n.as_ref()),
            _ => None,
        }
    }

    pub fn container_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self.fields.get_mut(name) {
            Some(FieldValue::Container(n)) => Some(n.as_mut()),
            _ => None,
        }
    }

    /// Returns the named container, creating it empty if unset.
    pub fn get_or_create_container(&mut self, name: &str) -> Result<&mut Node, ModelError> {
        let type_name = match self.field_def(name)?.kind() {
            Some(FieldKind::Container(t)) => t.to_string(),
            _ => return Err(wrong_kind(name, "container")),
        };
        if !self.fields.contains_key(name) {
            let node = Node::new(&self.schema, &type_name)?;
            self.fields
                .insert(name.to_string(), FieldValue::Container(Box::new(node)));
        }
        match self.fields.get_mut(name) {
            Some(FieldValue::Container(node)) => Ok(node.as_mut()),
            _ => Err(wrong_kind(name, "container")),
        }
    }

    pub fn list(&self, name: &str) -> Option<&KeyedList> {
        match self.fields.get(name) {
            Some(FieldValue::List(l)) => Some(l),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, name: &str) -> Option<&mut KeyedList> {
        match self.fields.get_mut(name) {
            Some(FieldValue::List(l)) => Some(l),
            _ => None,
        }
    }

    /// Returns the named list, creating it empty if unset.
    pub fn get_or_create_list(&mut self, name: &str) -> Result<&mut KeyedList, ModelError> {
        let spec = match self.field_def(name)?.kind() {
            Some(FieldKind::List(spec)) => spec.clone(),
            _ => return Err(wrong_kind(name, "list")),
        };
        if !self.fields.contains_key(name) {
            let list = KeyedList::new(&self.schema, spec)?;
            self.fields.insert(name.to_string(), FieldValue::List(list));
        }
        match self.fields.get_mut(name) {
            Some(FieldValue::List(list)) => Ok(list),
            _ => Err(wrong_kind(name, "list")),
        }
    }

    /// Sets a field to an already checked value.
    pub(crate) fn insert_field(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    /// Consumes the node, yielding its set fields.
    pub fn into_fields(self) -> impl Iterator<Item = (String, FieldValue)> {
        self.fields.into_iter()
    }

    /// Unsets a field, returning its previous value.
    pub fn clear_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Unsets every field except those named in `retain`.
    pub fn clear(&mut self, retain: &[String]) {
        self.fields.retain(|name, _| retain.contains(name));
    }

    /// Extracts the key of this node as a list entry keyed by `key_names`.
    pub fn list_key(&self, key_names: &[String]) -> Result<ListKey, ModelError> {
        let mut key = ListKey::new();
        for name in key_names {
            let raw = self
                .leaf(name)
                .and_then(Value::key_string)
                .ok_or_else(|| ModelError::MissingKey {
                    field: name.clone(),
                })?;
            key.insert(name.as_str(), raw);
        }
        Ok(key)
    }

    /// Sets the key leaves from the string form of a key.
    pub fn set_key(&mut self, key: &ListKey) -> Result<(), ModelError> {
        for (name, raw) in key.iter() {
            let def = self.field_def(name)?;
            let value = match def.kind() {
                Some(FieldKind::Leaf(t)) => t.parse_key(raw, &def.enum_values),
                _ => return Err(wrong_kind(name, "leaf")),
            }
            .ok_or_else(|| ModelError::InvalidKey {
                type_name: self.type_name().to_string(),
                key: key.to_string(),
            })?;
            self.fields.insert(name.clone(), FieldValue::Leaf(value));
        }
        Ok(())
    }
}

fn wrong_kind(field: &str, expected: &'static str) -> ModelError {
    ModelError::WrongKind {
        field: field.to_string(),
        expected,
    }
}

fn invalid_value(field: &str, value: &Value) -> ModelError {
    ModelError::InvalidValue {
        field: field.to_string(),
        value: value.to_json().to_string(),
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.fields == other.fields
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.type_name())
            .field("fields", &self.fields)
            .finish()
    }
}
