//! Top-down tree walk that computes the PathSpec of every node and field.
//!
//! The PathSpec of a node is computed once and handed to its fields, so a
//! walk is linear in the size of the tree.

use crate::fieldpath::{Path, PathError, PathSpec};
use crate::model::{FieldDef, FieldValue, Node};

/// WalkOptions selects which declared paths address each field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Address fields by their shadow paths when they declare one.
    pub prefer_shadow_path: bool,
    /// Keep only the least specific path of each field.
    pub map_to_single_path: bool,
}

/// TreeVisitor receives the nodes and leaf fields of a walk.
pub trait TreeVisitor<'a> {
    /// Called for the root, every container and every list entry.
    fn visit_node(&mut self, _node: &'a Node, _paths: &PathSpec) -> Result<(), PathError> {
        Ok(())
    }

    /// Called for every set leaf and leaf-list field.
    fn visit_leaf(
        &mut self,
        _def: &'a FieldDef,
        _value: &'a FieldValue,
        _paths: &PathSpec,
    ) -> Result<(), PathError> {
        Ok(())
    }
}

/// Walks the tree rooted at `root`. The root is addressed by the empty path.
pub fn walk<'a, V: TreeVisitor<'a>>(
    root: &'a Node,
    opts: WalkOptions,
    visitor: &mut V,
) -> Result<(), PathError> {
    let root_paths = PathSpec::from_paths(vec![Path::new()]);
    walk_node(root, &root_paths, opts, visitor)
}

fn walk_node<'a, V: TreeVisitor<'a>>(
    node: &'a Node,
    paths: &PathSpec,
    opts: WalkOptions,
    visitor: &mut V,
) -> Result<(), PathError> {
    visitor.visit_node(node, paths)?;

    for field in node.fields() {
        let value = match field.value {
            Some(value) if !field.def.annotation => value,
            _ => continue,
        };
        let field_paths = field_paths(field.def, paths, opts)?;

        match value {
            FieldValue::Leaf(_) | FieldValue::LeafList(_) => {
                visitor.visit_leaf(field.def, value, &field_paths)?;
            }
            FieldValue::Container(child) => {
                walk_node(child, &field_paths, opts, visitor)?;
            }
            FieldValue::List(list) => {
                for (_, entry) in list.iter() {
                    let key = entry
                        .list_key(list.key_names())
                        .map_err(|e| PathError::MalformedKey(e.to_string()))?;
                    let entry_paths = field_paths.list_entry(&key)?;
                    walk_node(entry, &entry_paths, opts, visitor)?;
                }
            }
        }
    }
    Ok(())
}

fn field_paths(def: &FieldDef, parent: &PathSpec, opts: WalkOptions) -> Result<PathSpec, PathError> {
    let schema_paths = def.paths_for(opts.prefer_shadow_path);
    if schema_paths.is_empty() {
        return Err(PathError::MissingSchemaPath {
            field: def.name.clone(),
        });
    }
    let paths = parent.child(schema_paths)?;
    if opts.map_to_single_path {
        return Ok(paths.single());
    }
    Ok(paths)
}

struct NodeCollector<'a> {
    nodes: Vec<(PathSpec, &'a Node)>,
}

impl<'a> TreeVisitor<'a> for NodeCollector<'a> {
    fn visit_node(&mut self, node: &'a Node, paths: &PathSpec) -> Result<(), PathError> {
        self.nodes.push((paths.clone(), node));
        Ok(())
    }
}

/// Returns the PathSpec of the root, every container and every list entry
/// of the tree, in walk order.
pub fn node_paths(root: &Node, opts: WalkOptions) -> Result<Vec<(PathSpec, &Node)>, PathError> {
    let mut collector = NodeCollector { nodes: Vec::new() };
    walk(root, opts, &mut collector)?;
    Ok(collector.nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::ListKey;
    use crate::fixtures;

    #[test]
    fn test_node_paths_compose_through_lists() {
        let mut device = fixtures::device();
        device
            .get_or_create_list("interface")
            .unwrap()
            .append_new(&ListKey::single("name", "eth0"))
            .unwrap();

        let nodes = node_paths(&device, WalkOptions::default()).unwrap();
        let got: Vec<String> = nodes.iter().map(|(p, _)| p.canonical_key()).collect();
        assert_eq!(got, vec!["/", "/interfaces/interface[name=eth0]"]);
        assert_eq!(nodes[1].1.type_name(), "Interface");
    }

    #[test]
    fn test_nested_ordered_lists() {
        let mut device = fixtures::device();
        let outer = device
            .get_or_create_list("ordered-list")
            .unwrap()
            .append_new(&ListKey::single("key", "o"))
            .unwrap();
        outer
            .get_or_create_list("ordered-list")
            .unwrap()
            .append_new(&ListKey::single("key", "i"))
            .unwrap();

        let nodes = node_paths(&device, WalkOptions::default()).unwrap();
        assert_eq!(
            nodes.last().unwrap().0.canonical_key(),
            "/ordered-lists/ordered-list[key=o]/ordered-lists/ordered-list[key=i]"
        );
    }

    #[derive(Default)]
    struct LeafPaths(Vec<String>);

    impl<'a> TreeVisitor<'a> for LeafPaths {
        fn visit_leaf(&mut self, def: &'a FieldDef, _: &'a FieldValue, paths: &PathSpec) -> Result<(), PathError> {
            self.0.push(format!("{}={}", def.name, paths.canonical_key()));
            Ok(())
        }
    }

    #[test]
    fn test_leaf_paths_follow_options() {
        let mut device = fixtures::device();
        device.set_leaf("hostname", "r1").unwrap();
        device.set_leaf("metadata", "internal").unwrap();
        device
            .get_or_create_container("settings")
            .unwrap()
            .set_leaf("x", 1i64)
            .unwrap();

        let mut visitor = LeafPaths::default();
        walk(&device, WalkOptions::default(), &mut visitor).unwrap();
        assert_eq!(
            visitor.0,
            vec![
                "hostname=/system/config/hostname|/system/state/hostname",
                "x=/settings/state/x",
            ]
        );

        let opts = WalkOptions {
            prefer_shadow_path: true,
            map_to_single_path: true,
        };
        let mut visitor = LeafPaths::default();
        walk(&device, opts, &mut visitor).unwrap();
        assert_eq!(
            visitor.0,
            vec!["hostname=/system/config/hostname", "x=/settings/config/x"]
        );
    }
}
