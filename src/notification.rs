//! Protocol message shapes, already decoded.

use crate::fieldpath::Path;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Update pairs an address with the value to set there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub path: Path,
    pub val: Value,
}

impl Update {
    pub fn new(path: Path, val: impl Into<Value>) -> Self {
        Update {
            path,
            val: val.into(),
        }
    }
}

/// Notification carries deletes and updates relative to an optional prefix.
///
/// An atomic notification replaces the whole subject: its deletes implicitly
/// include everything under the prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<Update>,
    #[serde(default)]
    pub atomic: bool,
}

/// SetRequest is a batch of deletes, replaces and updates, applied in
/// that order relative to an optional prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<Update>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<Update>,
}

impl SetRequest {
    pub fn new() -> Self {
        SetRequest::default()
    }

    pub fn prefix(mut self, prefix: Path) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn delete(mut self, path: Path) -> Self {
        self.delete.push(path);
        self
    }

    pub fn replace(mut self, path: Path, val: impl Into<Value>) -> Self {
        self.replace.push(Update::new(path, val));
        self
    }

    pub fn update(mut self, path: Path, val: impl Into<Value>) -> Self {
        self.update.push(Update::new(path, val));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_json() {
        let req = SetRequest::new()
            .delete(Path::parse("/x").unwrap())
            .update(Path::parse("/interfaces/interface[name=eth0]/config/mtu").unwrap(), 1500i64);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "delete": [{"elem": [{"name": "x"}]}],
                "update": [{
                    "path": {"elem": [
                        {"name": "interfaces"},
                        {"name": "interface", "key": {"name": "eth0"}},
                        {"name": "config"},
                        {"name": "mtu"}
                    ]},
                    "val": 1500
                }]
            })
        );
        let parsed: SetRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, req);
    }
}
