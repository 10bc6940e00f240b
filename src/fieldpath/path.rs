//! Path element and path types.

use super::key::ListKey;
use super::PathError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PathElem is one level of an address: a name plus, for list entries,
/// the key-name to string-value mapping that selects the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElem {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub key: BTreeMap<String, String>,
}

impl PathElem {
    /// Creates an unkeyed element.
    pub fn new(name: impl Into<String>) -> Self {
        PathElem {
            name: name.into(),
            key: BTreeMap::new(),
        }
    }

    /// Creates an element selecting the list entry with `key`.
    pub fn keyed(name: impl Into<String>, key: &ListKey) -> Self {
        PathElem {
            name: name.into(),
            key: key.as_map().clone(),
        }
    }

    /// Adds a key to the element.
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    /// Returns true if the element carries a key.
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Returns the element's key as a ListKey.
    pub fn list_key(&self) -> ListKey {
        ListKey::from(self.key.clone())
    }
}

/// Path is an absolute address: an ordered sequence of elements with an
/// optional origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, rename = "elem")]
    elems: Vec<PathElem>,
}

impl Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Path {
            origin: None,
            elems: Vec::new(),
        }
    }

    /// Creates a path from a vector of elements.
    pub fn from_elems(elems: Vec<PathElem>) -> Self {
        Path { origin: None, elems }
    }

    /// Creates an unkeyed path from a schema path.
    pub fn from_schema_path(schema_path: &[String]) -> Self {
        schema_path.iter().map(PathElem::new).collect()
    }

    /// Parses the string form `/a/b[k=v]/c`.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        super::parse_path(s)
    }

    /// Returns the number of elements in the path.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Returns true if the path has no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &PathElem> {
        self.elems.iter()
    }

    /// Appends an element.
    pub fn push(&mut self, elem: PathElem) {
        self.elems.push(elem);
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<PathElem> {
        self.elems.pop()
    }

    /// Returns the last element.
    pub fn last(&self) -> Option<&PathElem> {
        self.elems.last()
    }

    /// Returns a mutable reference to the last element.
    pub fn last_mut(&mut self) -> Option<&mut PathElem> {
        self.elems.last_mut()
    }

    /// Creates a new path with the given element appended.
    pub fn with(&self, elem: PathElem) -> Self {
        let mut path = self.clone();
        path.push(elem);
        path
    }

    /// Returns a new path with the elements of `suffix` appended.
    pub fn concat(&self, suffix: &Path) -> Self {
        let mut path = self.clone();
        path.elems.extend(suffix.elems.iter().cloned());
        path
    }

    /// Joins `suffix` onto this path, treating this path as a prefix.
    ///
    /// Fails if both paths carry an origin and the origins differ.
    pub fn join(&self, suffix: &Path) -> Result<Self, PathError> {
        let origin = match (&self.origin, &suffix.origin) {
            (Some(a), Some(b)) if a != b => {
                return Err(PathError::OriginMismatch {
                    prefix: a.clone(),
                    suffix: b.clone(),
                })
            }
            (Some(a), _) => Some(a.clone()),
            (None, b) => b.clone(),
        };
        let mut joined = self.concat(suffix);
        joined.origin = origin;
        Ok(joined)
    }

    /// Returns a slice of the path elements.
    pub fn as_slice(&self) -> &[PathElem] {
        &self.elems
    }
}

impl FromIterator<PathElem> for Path {
    fn from_iter<T: IntoIterator<Item = PathElem>>(iter: T) -> Self {
        Path {
            origin: None,
            elems: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Path {
    type Item = PathElem;
    type IntoIter = std::vec::IntoIter<PathElem>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElem;
    type IntoIter = std::slice::Iter<'a, PathElem>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

impl std::fmt::Display for PathElem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (name, value) in &self.key {
            write!(f, "[{}=", name)?;
            for c in value.chars() {
                if c == ']' || c == '\\' {
                    write!(f, "\\")?;
                }
                write!(f, "{}", c)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}:", origin)?;
        }
        if self.elems.is_empty() {
            return write!(f, "/");
        }
        for elem in &self.elems {
            write!(f, "/{}", elem)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_operations() {
        let mut path = Path::new();
        assert!(path.is_empty());

        path.push(PathElem::new("interfaces"));
        path.push(PathElem::new("interface").with_key("name", "eth0"));
        assert_eq!(path.len(), 2);
        assert!(path.last().unwrap().has_key());

        let popped = path.pop();
        assert_eq!(popped.map(|e| e.name), Some("interface".to_string()));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_path_display() {
        let path = Path::from_elems(vec![
            PathElem::new("interfaces"),
            PathElem::new("interface").with_key("name", "eth0"),
            PathElem::new("config"),
        ]);
        assert_eq!(path.to_string(), "/interfaces/interface[name=eth0]/config");
        assert_eq!(Path::new().to_string(), "/");
    }

    #[test]
    fn test_display_escapes_key_values() {
        let path = Path::from_elems(vec![PathElem::new("a").with_key("k", "x]y")]);
        assert_eq!(path.to_string(), r"/a[k=x\]y]");
    }

    #[test]
    fn test_join() {
        let prefix = Path::from_schema_path(&["a".to_string()]);
        let suffix = Path::from_schema_path(&["b".to_string(), "c".to_string()]);
        assert_eq!(prefix.join(&suffix).unwrap().to_string(), "/a/b/c");

        let mut a = prefix.clone();
        a.origin = Some("openconfig".into());
        let mut b = suffix.clone();
        b.origin = Some("cli".into());
        assert!(matches!(a.join(&b), Err(PathError::OriginMismatch { .. })));
        assert_eq!(a.join(&suffix).unwrap().origin.as_deref(), Some("openconfig"));
    }
}
