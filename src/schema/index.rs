//! Leaf index over a schema, used to resolve leafref targets.

use super::entry::{EntryKind, SchemaEntry};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// SchemaError reports a failure to build the index or resolve a leafref.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate schema path registered: /{0}")]
    DuplicatePath(String),

    #[error("empty leafref path")]
    EmptyPath,

    #[error("invalid path element that contains multiple namespace specifiers: {0}")]
    InvalidNamespace(String),

    #[error("path statement has to begin with either '../' or '/': {0}")]
    NotRelative(String),

    #[error("calling node must be specified when mapping relative path: {0}")]
    MissingContext(String),

    #[error("invalid calling node {context}, was a module: {path}")]
    ContextIsModule { path: String, context: String },

    #[error("invalid path specified {path}, for caller {context}, tries to recurse above the root")]
    AboveRoot { path: String, context: String },

    #[error("could not resolve leafref path: /{0}")]
    Unresolved(String),
}

/// SchemaIndex maps every leaf and leaf-list of a schema by its
/// normalized path: plain names, no module prefix, no key predicates.
///
/// Built once; immutable afterwards and safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    leaves: HashMap<Vec<String>, Arc<SchemaEntry>>,
}

impl SchemaIndex {
    /// Builds the index from a set of module entries.
    ///
    /// Fails if two schema locations normalize to the same path.
    pub fn build<'a, I>(modules: I) -> Result<SchemaIndex, SchemaError>
    where
        I: IntoIterator<Item = &'a Arc<SchemaEntry>>,
    {
        let mut index = SchemaIndex::default();
        for module in modules {
            for entry in module.children() {
                if entry.is_leaf() {
                    index.add(vec![entry.name().to_string()], entry)?;
                    continue;
                }
                index.add_children(entry)?;
            }
        }
        tracing::debug!(leaves = index.leaves.len(), "built schema index");
        Ok(index)
    }

    fn add_children(&mut self, entry: &Arc<SchemaEntry>) -> Result<(), SchemaError> {
        for child in entry.children() {
            if child.is_leaf() {
                self.add(child.normalized_path(), child)?;
                continue;
            }
            self.add_children(child)?;
        }
        Ok(())
    }

    fn add(&mut self, path: Vec<String>, entry: &Arc<SchemaEntry>) -> Result<(), SchemaError> {
        if self.leaves.contains_key(&path) {
            return Err(SchemaError::DuplicatePath(path.join("/")));
        }
        self.leaves.insert(path, Arc::clone(entry));
        Ok(())
    }

    /// Returns the number of indexed leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Looks up a leaf by normalized path.
    pub fn get(&self, path: &[String]) -> Option<&Arc<SchemaEntry>> {
        self.leaves.get(path)
    }

    /// Resolves a leafref `path` statement to its target leaf.
    ///
    /// Absolute paths start with `/`; relative paths start with `..` and are
    /// resolved against the normalized path of `context`. Key predicates and
    /// namespace prefixes are discarded.
    pub fn resolve_leafref(
        &self,
        path: &str,
        context: Option<&SchemaEntry>,
    ) -> Result<Arc<SchemaEntry>, SchemaError> {
        let fixed = fix_schema_tree_path(path, context)?;
        let target = self
            .leaves
            .get(&fixed)
            .ok_or_else(|| SchemaError::Unresolved(fixed.join("/")))?;
        Ok(Arc::clone(target))
    }
}

/// Splits an XPath on `/`, dropping bracketed key predicates, so that
/// `/interfaces/interface[name="eth0"]` becomes `["", "interfaces", "interface"]`.
pub fn split_xpath_parts(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut in_key = false;
    for c in path.chars() {
        match c {
            '/' if !in_key => {
                parts.push(std::mem::take(&mut buf));
                continue;
            }
            '[' => {
                in_key = true;
                continue;
            }
            ']' => {
                in_key = false;
                continue;
            }
            _ => {}
        }
        if !in_key {
            buf.push(c);
        }
    }
    if !buf.is_empty() {
        parts.push(buf);
    }
    parts
}

/// Strips `prefix:` namespaces from split path parts.
pub fn remove_namespaces(parts: Vec<String>) -> Result<Vec<String>, SchemaError> {
    parts
        .into_iter()
        .map(|part| match part.split_once(':') {
            None => Ok(part),
            Some((_, name)) if !name.contains(':') => Ok(name.to_string()),
            Some(_) => Err(SchemaError::InvalidNamespace(part)),
        })
        .collect()
}

fn fix_schema_tree_path(path: &str, context: Option<&SchemaEntry>) -> Result<Vec<String>, SchemaError> {
    let parts = remove_namespaces(split_xpath_parts(path))?;
    let first = parts.first().ok_or(SchemaError::EmptyPath)?;

    if first.is_empty() {
        return Ok(parts[1..].to_vec());
    }
    if first != ".." {
        return Err(SchemaError::NotRelative(path.to_string()));
    }

    let context = context.ok_or_else(|| SchemaError::MissingContext(path.to_string()))?;
    if context.kind() == EntryKind::Module {
        return Err(SchemaError::ContextIsModule {
            path: path.to_string(),
            context: context.name().to_string(),
        });
    }

    let mut fixed = context.normalized_path();
    let mut remaining = Vec::new();
    for part in parts {
        if part == ".." {
            if fixed.pop().is_none() {
                return Err(SchemaError::AboveRoot {
                    path: path.to_string(),
                    context: format!("/{}", context.path().join("/")),
                });
            }
            continue;
        }
        remaining.push(part);
    }
    fixed.extend(remaining);
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntryDef;

    const INTERFACES: &str = r#"
name: openconfig-interfaces
kind: module
children:
- name: interfaces
  children:
  - name: interface
    kind: list
    key: [name]
    children:
    - name: name
      kind: leaf
    - name: config
      children:
      - name: name
        kind: leaf
      - name: mtu
        kind: leaf
    - name: subinterfaces
      children:
      - name: subinterface
        kind: list
        key: [index]
        children:
        - name: index
          kind: leaf
        - name: parent-ref
          kind: leaf
- name: hostname
  kind: leaf
"#;

    fn module() -> Arc<SchemaEntry> {
        SchemaEntry::from_yaml(INTERFACES).unwrap()
    }

    #[test]
    fn test_build_registers_leaves_only() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        assert_eq!(index.len(), 6);
        assert!(index.get(&["hostname".to_string()]).is_some());
        assert!(index
            .get(&["interfaces".into(), "interface".into(), "config".into(), "mtu".into()])
            .is_some());
        assert!(index.get(&["interfaces".into()]).is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let a = module();
        let b: EntryDef = serde_yaml::from_str(
            r#"
name: other
kind: module
children:
- name: hostname
  kind: leaf
"#,
        )
        .unwrap();
        let b = SchemaEntry::build(&b);
        let err = SchemaIndex::build([&a, &b]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicatePath("hostname".into()));
    }

    #[test]
    fn test_split_xpath_parts_drops_predicates() {
        assert_eq!(
            split_xpath_parts(r#"/interfaces/interface[name="a/b"]/config/mtu"#),
            vec!["", "interfaces", "interface", "config", "mtu"]
        );
        assert_eq!(split_xpath_parts("../config/name"), vec!["..", "config", "name"]);
    }

    #[test]
    fn test_remove_namespaces() {
        let parts = vec!["oc-if:interfaces".to_string(), "interface".to_string()];
        assert_eq!(remove_namespaces(parts).unwrap(), vec!["interfaces", "interface"]);

        let err = remove_namespaces(vec!["a:b:c".to_string()]).unwrap_err();
        assert_eq!(err, SchemaError::InvalidNamespace("a:b:c".into()));
    }

    #[test]
    fn test_resolve_absolute() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        let target = index
            .resolve_leafref("/oc-if:interfaces/oc-if:interface[oc-if:name=current()/../name]/oc-if:config/oc-if:mtu", None)
            .unwrap();
        assert_eq!(target.name(), "mtu");
    }

    #[test]
    fn test_resolve_relative() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        let context = module
            .find(&["interfaces", "interface", "subinterfaces", "subinterface", "parent-ref"])
            .unwrap();

        let target = index
            .resolve_leafref("../../../config/name", Some(&**context))
            .unwrap();
        assert_eq!(
            target.normalized_path(),
            vec!["interfaces", "interface", "config", "name"]
        );
    }

    #[test]
    fn test_resolve_above_root_fails() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        let context = module.find(&["hostname"]).unwrap();
        let err = index.resolve_leafref("../../hostname", Some(&**context)).unwrap_err();
        assert!(matches!(err, SchemaError::AboveRoot { .. }));
    }

    #[test]
    fn test_resolve_relative_requires_context() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        let err = index.resolve_leafref("../hostname", None).unwrap_err();
        assert!(matches!(err, SchemaError::MissingContext(_)));

        let err = index.resolve_leafref("../hostname", Some(&*module)).unwrap_err();
        assert!(matches!(err, SchemaError::ContextIsModule { .. }));
    }

    #[test]
    fn test_resolve_rejects_bad_paths() {
        let module = module();
        let index = SchemaIndex::build([&module]).unwrap();
        assert_eq!(
            index.resolve_leafref("interfaces/interface", None).unwrap_err(),
            SchemaError::NotRelative("interfaces/interface".into())
        );
        assert_eq!(index.resolve_leafref("", None).unwrap_err(), SchemaError::EmptyPath);
        assert_eq!(
            index.resolve_leafref("/interfaces/interface", None).unwrap_err(),
            SchemaError::Unresolved("interfaces/interface".into())
        );
        assert_eq!(
            index.resolve_leafref("/interfaces/interface/config", None).unwrap_err(),
            SchemaError::Unresolved("interfaces/interface/config".into())
        );
    }
}
