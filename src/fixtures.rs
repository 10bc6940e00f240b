//! Shared test model.

use crate::model::{ModelSchema, Node};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub(crate) const MODEL_YAML: &str = r#"
types:
- name: Device
  fields:
  - name: hostname
    path: system/config/hostname|system/state/hostname
    leaf: string
  - name: interface
    path: interfaces/interface
    list: {type: Interface, key: [name]}
  - name: ordered-list
    path: ordered-lists/ordered-list
    list: {type: OrderedList, key: [key], orderedBy: user, maxElements: 5}
  - name: multi-keyed-list
    path: multi-keyed-lists/multi-keyed-list
    list: {type: MultiKeyed, key: [key1, key2]}
  - name: a
    path: a
    leaf: int
  - name: b
    path: b
    leaf: int
  - name: x
    path: x
    leaf: int
  - name: y
    path: y
    leaf: int
  - name: z
    path: z
    leaf: int
  - name: cookie
    path: cookie
    leaf: bytes
  - name: settings
    path: settings
    container: Settings
  - name: holder
    path: holder
    container: Holder
  - name: metadata
    annotation: true
    leaf: any
- name: Interface
  fields:
  - name: name
    path: config/name|name
    leaf: string
  - name: mtu
    path: config/mtu
    leaf: uint
  - name: enabled
    path: config/enabled
    leaf: bool
  - name: admin-status
    path: state/admin-status
    leaf: enum
    enum: [UP, DOWN]
  - name: description
    path: config/description
    leaf: string
  - name: ip
    path: config/ip
    leafList: string
- name: Settings
  fields:
  - name: x
    path: state/x
    shadowPath: config/x
    leaf: int
- name: OrderedList
  fields:
  - name: key
    path: config/key|key
    leaf: string
  - name: value
    path: config/value
    leaf: string
  - name: ordered-list
    path: ordered-lists/ordered-list
    list: {type: OrderedList, key: [key], orderedBy: user}
- name: MultiKeyed
  fields:
  - name: key1
    path: config/key1|key1
    leaf: string
  - name: key2
    path: config/key2|key2
    leaf: uint
  - name: value
    path: config/value
    leaf: string
- name: Holder
  fields:
  - name: key-list
    path: config/key-list
    shadowPath: state/key-list
    leafList: string
"#;

pub(crate) static MODEL: Lazy<Arc<ModelSchema>> =
    Lazy::new(|| Arc::new(ModelSchema::from_yaml(MODEL_YAML).unwrap()));

pub(crate) fn node(type_name: &str) -> Node {
    Node::new(&MODEL, type_name).unwrap()
}

pub(crate) fn device() -> Node {
    node("Device")
}
