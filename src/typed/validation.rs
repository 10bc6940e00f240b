//! List validation: key consistency, uniqueness and cardinality.

use crate::fieldpath::Path;
use crate::model::{FieldValue, KeyedList, Node};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// ValidationError represents one violated list invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{path}: entry key {embedded} does not match lookup key {lookup}")]
    KeyMismatch {
        path: String,
        lookup: String,
        embedded: String,
    },

    #[error("{path}: key field {field} is not set")]
    MissingKeyField { path: String, field: String },

    #[error("{path}: duplicate key in list: {key}")]
    DuplicateKey { path: String, key: String },

    #[error("{path}: list has {count} elements, min-elements is {min}")]
    TooFewElements { path: String, count: usize, min: usize },

    #[error("{path}: list has {count} elements, max-elements is {max}")]
    TooManyElements { path: String, count: usize, max: usize },
}

impl ValidationError {
    /// Creates a key mismatch error.
    pub fn key_mismatch(path: impl Into<String>, lookup: impl Into<String>, embedded: impl Into<String>) -> Self {
        ValidationError::KeyMismatch {
            path: path.into(),
            lookup: lookup.into(),
            embedded: embedded.into(),
        }
    }

    /// Creates a missing key field error.
    pub fn missing_key_field(path: impl Into<String>, field: impl Into<String>) -> Self {
        ValidationError::MissingKeyField {
            path: path.into(),
            field: field.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(path: impl Into<String>, key: impl Into<String>) -> Self {
        ValidationError::DuplicateKey {
            path: path.into(),
            key: key.into(),
        }
    }
}

/// ValidationErrors is a collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        ValidationErrors { errors: Vec::new() }
    }

    /// Creates ValidationErrors from a single error.
    pub fn from_error(error: ValidationError) -> Self {
        ValidationErrors {
            errors: vec![error],
        }
    }

    /// Adds an error.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Extends with another ValidationErrors.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Returns Err(self) if any error was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates every list in the tree rooted at `root`, at every depth.
///
/// All violations are reported; nothing is corrected.
pub fn validate(root: &Node) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();
    validate_node(root, &Path::new(), &mut errs);
    errs.into_result()
}

/// Validates a single list whose field is addressed by `path`, and the
/// lists nested in its entries.
pub fn validate_list(list: &KeyedList, path: &Path) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();
    check_list(list, path, &mut errs);
    errs.into_result()
}

fn validate_node(node: &Node, path: &Path, errs: &mut ValidationErrors) {
    for field in node.fields() {
        let child_path = || match field.def.schema_paths().first() {
            Some(rel) => path.concat(&Path::from_schema_path(rel)),
            None => path.clone(),
        };
        match field.value {
            Some(FieldValue::Container(child)) => validate_node(child, &child_path(), errs),
            Some(FieldValue::List(list)) => check_list(list, &child_path(), errs),
            _ => {}
        }
    }
}

fn check_list(list: &KeyedList, path: &Path, errs: &mut ValidationErrors) {
    let spec = list.spec();
    let count = list.len();
    if let Some(min) = spec.min_elements {
        if count < min {
            errs.add(ValidationError::TooFewElements {
                path: path.to_string(),
                count,
                min,
            });
        }
    }
    if let Some(max) = spec.max_elements {
        if count > max {
            errs.add(ValidationError::TooManyElements {
                path: path.to_string(),
                count,
                max,
            });
        }
    }

    let mut seen = HashSet::new();
    for (lookup, entry) in list.iter() {
        let mut entry_path = path.clone();
        if let Some(last) = entry_path.last_mut() {
            last.key = lookup.as_map().clone();
        }
        let entry_str = entry_path.to_string();

        match entry.list_key(list.key_names()) {
            Ok(embedded) => {
                if embedded != *lookup {
                    errs.add(ValidationError::key_mismatch(
                        &entry_str,
                        lookup.to_string(),
                        embedded.to_string(),
                    ));
                }
                if !seen.insert(embedded.clone()) {
                    errs.add(ValidationError::duplicate_key(&entry_str, embedded.to_string()));
                }
            }
            Err(_) => {
                for name in list.key_names() {
                    if entry.leaf(name).and_then(|v| v.key_string()).is_none() {
                        errs.add(ValidationError::missing_key_field(&entry_str, name));
                    }
                }
            }
        }

        validate_node(entry, &entry_path, errs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::ListKey;
    use crate::fixtures;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::key_mismatch("/a[k=1]", "k=1", "k=2");
        assert!(format!("{}", err).contains("does not match"));
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errs = ValidationErrors::new();
        assert!(errs.is_empty());
        assert!(errs.clone().into_result().is_ok());

        errs.add(ValidationError::duplicate_key("/a", "k=1"));
        assert_eq!(errs.len(), 1);
        assert!(errs.into_result().is_err());
    }

    #[test]
    fn test_max_elements() {
        let mut device = fixtures::device();
        let list = device.get_or_create_list("ordered-list").unwrap();
        for i in 0..5 {
            list.append_new(&ListKey::single("key", i.to_string())).unwrap();
        }
        assert!(validate(&device).is_ok());

        device
            .list_mut("ordered-list")
            .unwrap()
            .append_new(&ListKey::single("key", "5"))
            .unwrap();
        let errs = validate(&device).unwrap_err();
        assert_eq!(
            errs.iter().collect::<Vec<_>>(),
            vec![&ValidationError::TooManyElements {
                path: "/ordered-lists/ordered-list".into(),
                count: 6,
                max: 5,
            }]
        );
    }

    #[test]
    fn test_multi_key_mismatch() {
        let mut device = fixtures::device();
        let key = ListKey::from([("key1", "foo"), ("key2", "42")]);
        let list = device.get_or_create_list("multi-keyed-list").unwrap();
        list.append_new(&key).unwrap();
        assert!(list.validate().is_ok());

        list.get_mut(&key).unwrap().set_leaf("key2", 43u64).unwrap();
        let errs = validate(&device).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(matches!(
            errs.iter().next(),
            Some(ValidationError::KeyMismatch { embedded, .. }) if embedded == "key1=foo,key2=43"
        ));
    }

    #[test]
    fn test_missing_and_duplicate_embedded_keys() {
        let mut device = fixtures::device();
        let list = device.get_or_create_list("interface").unwrap();
        list.append_new(&ListKey::single("name", "eth0")).unwrap();
        list.append_new(&ListKey::single("name", "eth1")).unwrap();

        list.get_mut(&ListKey::single("name", "eth1"))
            .unwrap()
            .set_leaf("name", "eth0")
            .unwrap();
        let errs = validate(&device).unwrap_err();
        assert!(errs.iter().any(|e| matches!(e, ValidationError::DuplicateKey { .. })));
        assert!(errs.iter().any(|e| matches!(e, ValidationError::KeyMismatch { .. })));

        list_clear_name(&mut device);
        let errs = validate(&device).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ValidationError::MissingKeyField { field, .. } if field == "name")));
    }

    fn list_clear_name(device: &mut Node) {
        let entry = device
            .list_mut("interface")
            .unwrap()
            .get_mut(&ListKey::single("name", "eth0"))
            .unwrap();
        entry.clear_field("name");
    }

    #[test]
    fn test_nested_lists_are_validated() {
        let mut device = fixtures::device();
        let inner = device
            .get_or_create_list("ordered-list")
            .unwrap()
            .append_new(&ListKey::single("key", "outer"))
            .unwrap()
            .get_or_create_list("ordered-list")
            .unwrap();
        inner.append_new(&ListKey::single("key", "a")).unwrap();
        inner
            .get_mut(&ListKey::single("key", "a"))
            .unwrap()
            .set_leaf("key", "b")
            .unwrap();

        let errs = validate(&device).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs.to_string().starts_with(
            "/ordered-lists/ordered-list[key=outer]/ordered-lists/ordered-list[key=a]"
        ));
    }
}
