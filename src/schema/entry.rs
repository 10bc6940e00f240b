//! Schema entries: the immutable, parsed description of a data tree.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// EntryKind is the kind of a schema node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Module,
    #[default]
    Container,
    List,
    Leaf,
    LeafList,
    /// Choice and case group their children without appearing in data paths.
    Choice,
    Case,
}

/// OrderedBy is the ordering discipline of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderedBy {
    /// Entries are addressed by key only; order is not significant.
    #[default]
    System,
    /// Entry order is significant and preserved as appended.
    User,
}

/// EntryDef is the declarative form of a schema entry, as loaded from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDef {
    pub name: String,

    #[serde(default)]
    pub kind: EntryKind,

    /// Key leaf names, for lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key: Vec<String>,

    #[serde(default)]
    pub ordered_by: OrderedBy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_elements: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elements: Option<usize>,

    /// Config (true) or state (false); inherited from the parent when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryDef>,
}

/// SchemaEntry is a node of the built schema tree.
///
/// Children are owned; the parent link is a lookup-only back reference.
#[derive(Debug)]
pub struct SchemaEntry {
    name: String,
    kind: EntryKind,
    keys: Vec<String>,
    ordered_by: OrderedBy,
    min_elements: Option<usize>,
    max_elements: Option<usize>,
    config: Option<bool>,
    parent: Weak<SchemaEntry>,
    children: Vec<Arc<SchemaEntry>>,
}

impl SchemaEntry {
    /// Builds the entry tree rooted at `def`.
    pub fn build(def: &EntryDef) -> Arc<SchemaEntry> {
        Self::build_with_parent(def, Weak::new())
    }

    /// Parses a YAML entry definition and builds it.
    pub fn from_yaml(yaml: &str) -> Result<Arc<SchemaEntry>, serde_yaml::Error> {
        let def: EntryDef = serde_yaml::from_str(yaml)?;
        Ok(Self::build(&def))
    }

    fn build_with_parent(def: &EntryDef, parent: Weak<SchemaEntry>) -> Arc<SchemaEntry> {
        Arc::new_cyclic(|me| SchemaEntry {
            name: def.name.clone(),
            kind: def.kind,
            keys: def.key.clone(),
            ordered_by: def.ordered_by,
            min_elements: def.min_elements,
            max_elements: def.max_elements,
            config: def.config,
            parent,
            children: def
                .children
                .iter()
                .map(|child| Self::build_with_parent(child, me.clone()))
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn ordered_by(&self) -> OrderedBy {
        self.ordered_by
    }

    pub fn min_elements(&self) -> Option<usize> {
        self.min_elements
    }

    pub fn max_elements(&self) -> Option<usize> {
        self.max_elements
    }

    pub fn parent(&self) -> Option<Arc<SchemaEntry>> {
        self.parent.upgrade()
    }

    pub fn children(&self) -> &[Arc<SchemaEntry>] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Arc<SchemaEntry>> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follows `path` down through named children.
    pub fn find(&self, path: &[&str]) -> Option<&Arc<SchemaEntry>> {
        let (first, rest) = path.split_first()?;
        let mut current = self.child(first)?;
        for name in rest {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Returns true for leaves and leaf-lists, the only entries a leafref can target.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, EntryKind::Leaf | EntryKind::LeafList)
    }

    /// Returns true for entries that can hold children.
    pub fn is_dir(&self) -> bool {
        !self.is_leaf()
    }

    /// Returns whether the entry is configuration, inheriting from ancestors.
    pub fn is_config(&self) -> bool {
        match self.config {
            Some(config) => config,
            None => self.parent().map(|p| p.is_config()).unwrap_or(true),
        }
    }

    /// Returns the full schema path, module name first.
    pub fn path(&self) -> Vec<String> {
        let mut path = vec![self.name.clone()];
        let mut parent = self.parent();
        while let Some(p) = parent {
            path.push(p.name.clone());
            parent = p.parent();
        }
        path.reverse();
        path
    }

    /// Returns the data tree path of the entry, module segment stripped and
    /// choice/case entries elided.
    pub fn normalized_path(&self) -> Vec<String> {
        let mut path = Vec::new();
        if self.kind != EntryKind::Module && !self.is_choice_or_case() {
            path.push(self.name.clone());
        }
        let mut parent = self.parent();
        while let Some(p) = parent {
            if p.kind != EntryKind::Module && !p.is_choice_or_case() {
                path.push(p.name.clone());
            }
            parent = p.parent();
        }
        path.reverse();
        path
    }

    fn is_choice_or_case(&self) -> bool {
        matches!(self.kind, EntryKind::Choice | EntryKind::Case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = r#"
name: acme
kind: module
children:
- name: system
  children:
  - name: hostname
    kind: leaf
  - name: protocol
    kind: choice
    children:
    - name: tcp
      kind: case
      children:
      - name: port
        kind: leaf
- name: routes
  config: false
  children:
  - name: route
    kind: list
    key: [prefix]
    orderedBy: user
    maxElements: 5
    children:
    - name: prefix
      kind: leaf
"#;

    #[test]
    fn test_build_links_parents() {
        let module = SchemaEntry::from_yaml(MODULE).unwrap();
        let hostname = module.find(&["system", "hostname"]).unwrap();
        assert_eq!(hostname.parent().unwrap().name(), "system");
        assert_eq!(hostname.path(), vec!["acme", "system", "hostname"]);
        assert_eq!(hostname.normalized_path(), vec!["system", "hostname"]);
    }

    #[test]
    fn test_choice_and_case_are_elided() {
        let module = SchemaEntry::from_yaml(MODULE).unwrap();
        let port = module.find(&["system", "protocol", "tcp", "port"]).unwrap();
        assert_eq!(port.normalized_path(), vec!["system", "port"]);
    }

    #[test]
    fn test_list_attributes() {
        let module = SchemaEntry::from_yaml(MODULE).unwrap();
        let route = module.find(&["routes", "route"]).unwrap();
        assert_eq!(route.kind(), EntryKind::List);
        assert_eq!(route.keys(), ["prefix".to_string()]);
        assert_eq!(route.ordered_by(), OrderedBy::User);
        assert_eq!(route.max_elements(), Some(5));
        assert_eq!(route.min_elements(), None);
    }

    #[test]
    fn test_config_is_inherited() {
        let module = SchemaEntry::from_yaml(MODULE).unwrap();
        assert!(module.find(&["system", "hostname"]).unwrap().is_config());
        assert!(!module.find(&["routes", "route", "prefix"]).unwrap().is_config());
    }
}
