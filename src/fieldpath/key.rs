//! List keys.

use std::collections::BTreeMap;
use std::fmt;

/// ListKey maps each key leaf name of a list to its string-encoded value.
///
/// Single-leaf and composite keys share this form; two keys are equal
/// only when every component matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListKey(BTreeMap<String, String>);

impl ListKey {
    pub fn new() -> Self {
        ListKey(BTreeMap::new())
    }

    /// Creates a single-leaf key.
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut key = ListKey::new();
        key.insert(name, value);
        key
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Returns true if the key names are exactly `names`, in any order.
    pub fn has_names(&self, names: &[String]) -> bool {
        self.0.len() == names.len() && names.iter().all(|n| self.0.contains_key(n))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl From<BTreeMap<String, String>> for ListKey {
    fn from(map: BTreeMap<String, String>) -> Self {
        ListKey(map)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ListKey {
    fn from(pairs: [(K, V); N]) -> Self {
        ListKey(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
