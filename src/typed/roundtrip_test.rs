//! Scenarios crossing the typed and mutate modules: addresses produced by
//! a walk resolve back to the walked nodes, and applying a diff reproduces
//! the modified tree.

use crate::fieldpath::ListKey;
use crate::fixtures;
use crate::model::Node;
use crate::mutate::{get_or_create_node, unmarshal_notifications, UnmarshalOptions};
use crate::typed::{diff, flatten, node_paths, DiffOptions, WalkOptions};
use crate::value::Value;
use pretty_assertions::assert_eq;

fn original() -> Node {
    let mut device = fixtures::device();
    device.set_leaf("hostname", "r1").unwrap();
    device.set_leaf("a", 1i64).unwrap();
    device
        .get_or_create_container("settings")
        .unwrap()
        .set_leaf("x", 1i64)
        .unwrap();

    let eth0 = device
        .get_or_create_list("interface")
        .unwrap()
        .append_new(&ListKey::single("name", "eth0"))
        .unwrap();
    eth0.set_leaf("mtu", 1500u64).unwrap();
    eth0.set_leaf("description", "uplink").unwrap();
    eth0.set_leaf_list("ip", vec!["10.0.0.1".into()]).unwrap();

    device
        .get_or_create_list("multi-keyed-list")
        .unwrap()
        .append_new(&ListKey::from([("key1", "foo"), ("key2", "42")]))
        .unwrap()
        .set_leaf("value", "v1")
        .unwrap();
    device
}

fn modified() -> Node {
    let mut device = original();
    device.set_leaf("hostname", "r2").unwrap();
    device.clear_field("a");
    device.set_leaf("b", 2i64).unwrap();
    device.set_leaf("cookie", vec![7u8, 8]).unwrap();

    let list = device.get_or_create_list("interface").unwrap();
    let eth0 = list.get_mut(&ListKey::single("name", "eth0")).unwrap();
    eth0.set_leaf("mtu", 9000u64).unwrap();
    eth0.clear_field("description");
    eth0.set_leaf_list("ip", vec!["10.0.0.1".into(), "10.0.0.2".into()])
        .unwrap();
    let eth1 = list.append_new(&ListKey::single("name", "eth1")).unwrap();
    eth1.set_leaf("enabled", true).unwrap();
    eth1.set_leaf("admin-status", "DOWN").unwrap();

    device.clear_field("multi-keyed-list");

    let ordered = device.get_or_create_list("ordered-list").unwrap();
    for key in ["c", "a"] {
        ordered
            .append_new(&ListKey::single("key", key))
            .unwrap()
            .set_leaf("value", key.to_uppercase())
            .unwrap();
    }
    device
}

fn assert_round_trip(opts: DiffOptions) {
    let original = original();
    let modified = modified();

    let notification = diff(&original, &modified, &opts).unwrap().into_notification();
    let mut applied = original.clone();
    unmarshal_notifications(&mut applied, &[notification], &UnmarshalOptions::default()).unwrap();

    assert_eq!(flatten(&applied, &opts).unwrap(), flatten(&modified, &opts).unwrap());
}

#[test]
fn test_diff_applies_to_modified_with_single_paths() {
    assert_round_trip(DiffOptions::new().map_to_single_path(true));
}

#[test]
fn test_diff_applies_to_modified_with_all_paths() {
    assert_round_trip(DiffOptions::new());
}

#[test]
fn test_diff_of_identical_trees_is_empty() {
    let tree = modified();
    assert!(diff(&tree, &tree.clone(), &DiffOptions::new()).unwrap().is_empty());
}

#[test]
fn test_walked_addresses_resolve_to_walked_nodes() {
    let tree = modified();
    let no_init = UnmarshalOptions::new().init_missing_elements(false);

    for opts in [
        WalkOptions::default(),
        WalkOptions {
            prefer_shadow_path: false,
            map_to_single_path: true,
        },
    ] {
        for (spec, node) in node_paths(&tree, opts).unwrap() {
            for path in spec.paths() {
                let mut copy = tree.clone();
                let got = get_or_create_node(&mut copy, path, &no_init).unwrap();
                assert_eq!(got.type_name(), node.type_name(), "{}", path);
                assert!(*got == *node, "{} resolved to a different node", path);
            }
        }
    }
}

#[test]
fn test_shadow_diff_applies_with_shadow_preference() {
    let original = fixtures::device();
    let mut modified = fixtures::device();
    modified
        .get_or_create_container("settings")
        .unwrap()
        .set_leaf("x", 5i64)
        .unwrap();

    let opts = DiffOptions::new().prefer_shadow_path(true);
    let notification = diff(&original, &modified, &opts).unwrap().into_notification();
    assert_eq!(notification.update[0].path.to_string(), "/settings/config/x");

    let mut ignored = original.clone();
    unmarshal_notifications(&mut ignored, &[notification.clone()], &UnmarshalOptions::default()).unwrap();
    assert_eq!(ignored.container("settings").and_then(|s| s.leaf("x")), None);

    let mut applied = original.clone();
    unmarshal_notifications(
        &mut applied,
        &[notification],
        &UnmarshalOptions::new().prefer_shadow_path(true),
    )
    .unwrap();
    assert_eq!(
        applied.container("settings").and_then(|s| s.leaf("x")),
        Some(&Value::Int(5))
    );
}
