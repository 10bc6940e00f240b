//! PathSpec: the set of equivalent absolute addresses of one node.

use super::key::ListKey;
use super::path::{Path, PathElem};
use super::PathError;
use std::collections::BTreeSet;

/// SchemaPath is a relative path declared by a field, as plain names.
pub type SchemaPath = Vec<String>;

/// PathSpec holds every absolute address that denotes the same node.
///
/// More than one address exists when schema compression lets a value be
/// reached through structurally different locations. Equality is set
/// equality over the addresses.
#[derive(Debug, Clone, Default)]
pub struct PathSpec {
    paths: Vec<Path>,
}

impl PathSpec {
    /// Returns the PathSpec of a field of the root node: one address per
    /// declared schema path.
    pub fn root(schema_paths: &[SchemaPath]) -> Self {
        PathSpec {
            paths: schema_paths.iter().map(|p| Path::from_schema_path(p)).collect(),
        }
    }

    /// Wraps already computed addresses.
    pub fn from_paths(paths: Vec<Path>) -> Self {
        PathSpec { paths }
    }

    /// Returns the PathSpec of a field of the node this PathSpec addresses:
    /// every parent address joined with every declared relative path.
    pub fn child(&self, schema_paths: &[SchemaPath]) -> Result<PathSpec, PathError> {
        if self.paths.is_empty() {
            return Err(PathError::MissingAnnotation);
        }
        let mut paths = Vec::with_capacity(self.paths.len() * schema_paths.len());
        for parent in &self.paths {
            for relative in schema_paths {
                let mut path = parent.clone();
                for name in relative {
                    path.push(PathElem::new(name.as_str()));
                }
                paths.push(path);
            }
        }
        Ok(PathSpec { paths })
    }

    /// Returns the PathSpec of the list entry with `key`, given the PathSpec
    /// of the list field. The key is placed on the last element of each
    /// address.
    pub fn list_entry(&self, key: &ListKey) -> Result<PathSpec, PathError> {
        if self.paths.is_empty() {
            return Err(PathError::MissingAnnotation);
        }
        if key.is_empty() {
            return Err(PathError::MalformedKey("empty key".to_string()));
        }
        let mut paths = self.paths.clone();
        for path in &mut paths {
            let last = path
                .last_mut()
                .ok_or_else(|| PathError::InvalidListMember(key.to_string()))?;
            last.key = key.as_map().clone();
        }
        Ok(PathSpec { paths })
    }

    /// Reduces the PathSpec to its least specific address.
    pub fn single(&self) -> PathSpec {
        PathSpec {
            paths: least_specific_path(&self.paths).cloned().into_iter().collect(),
        }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn first(&self) -> Option<&Path> {
        self.paths.first()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns true if `path` is one of the addresses.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Returns the deterministic key identifying this address set: the
    /// sorted string forms of the addresses joined with `|`.
    pub fn canonical_key(&self) -> String {
        let set: BTreeSet<String> = self.paths.iter().map(|p| p.to_string()).collect();
        set.into_iter().collect::<Vec<_>>().join("|")
    }
}

impl PartialEq for PathSpec {
    fn eq(&self, other: &Self) -> bool {
        let a: BTreeSet<&Path> = self.paths.iter().collect();
        let b: BTreeSet<&Path> = other.paths.iter().collect();
        a == b
    }
}

impl Eq for PathSpec {}

/// Returns the path with the fewest elements; the first one wins a tie.
pub fn least_specific_path(paths: &[Path]) -> Option<&Path> {
    paths.iter().min_by_key(|p| p.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(parts: &[&str]) -> SchemaPath {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_child_is_cartesian_product() {
        let root = PathSpec::root(&[sp(&["a"]), sp(&["b", "c"])]);
        let child = root.child(&[sp(&["d"]), sp(&["e"])]).unwrap();
        let got: Vec<String> = child.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(got, vec!["/a/d", "/a/e", "/b/c/d", "/b/c/e"]);
    }

    #[test]
    fn test_child_of_unaddressed_parent_fails() {
        let err = PathSpec::default().child(&[sp(&["a"])]).unwrap_err();
        assert_eq!(err, PathError::MissingAnnotation);
    }

    #[test]
    fn test_list_entry_sets_key_on_last_element() {
        let list = PathSpec::root(&[sp(&["interfaces", "interface"])]);
        let entry = list.list_entry(&ListKey::single("name", "eth0")).unwrap();
        assert_eq!(entry.first().unwrap().to_string(), "/interfaces/interface[name=eth0]");

        assert!(matches!(
            list.list_entry(&ListKey::new()),
            Err(PathError::MalformedKey(_))
        ));
        assert!(matches!(
            PathSpec::root(&[vec![]]).list_entry(&ListKey::single("k", "v")),
            Err(PathError::InvalidListMember(_))
        ));
    }

    #[test]
    fn test_set_equality_and_canonical_key() {
        let a = PathSpec::root(&[sp(&["x"]), sp(&["y"])]);
        let b = PathSpec::root(&[sp(&["y"]), sp(&["x"])]);
        assert_eq!(a, b);
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "/x|/y");
        assert_ne!(a, PathSpec::root(&[sp(&["x"])]));
    }

    #[test]
    fn test_least_specific_path() {
        let spec = PathSpec::root(&[sp(&["a", "b"]), sp(&["c"]), sp(&["d"])]);
        assert_eq!(spec.single().first().unwrap().to_string(), "/c");
        assert!(least_specific_path(&[]).is_none());
    }
}
