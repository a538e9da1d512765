//! Write-back link behavior.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use treepath::{link, remove, update, DataLink, HostLink, TraverseError, ValueLink};

#[test]
fn test_value_link_records_last_update() {
    let mut target = ValueLink::new(json!({"name": "old"}));
    link::apply(&mut target, |tree| update(tree, "name", json!("new"))).unwrap();

    assert_eq!(target.data, json!({"name": "new"}));
    assert_eq!(target.path, "name");
    assert_eq!(target.insert, json!("new"));
}

#[test]
fn test_value_link_untouched_on_failure() {
    let mut target = ValueLink::new(json!({"name": "old"}));
    let err = link::apply(&mut target, |tree| update(tree, "missing", json!("new"))).unwrap_err();

    assert!(matches!(err, TraverseError::KeyNotFound { .. }));
    assert_eq!(target.data, json!({"name": "old"}));
    assert_eq!(target.path, "");
}

#[test]
fn test_value_link_into_data() {
    let mut target = ValueLink::new(json!({"blocks": []}));
    link::apply(&mut target, |tree| {
        update(tree, "blocks.$", json!({"id": null, "content": "asd"}))
    })
    .unwrap();

    let doc = target.into_data();
    assert_eq!(doc["blocks"], json!([{"id": 1, "content": "asd"}]));
    assert_eq!(doc["_ids"], json!({"blocks": 1}));
}

#[test]
fn test_host_link_pushes_into_owner() {
    let store = Rc::new(RefCell::new(json!({"name": "old"})));
    let sink = Rc::clone(&store);
    let mut target = HostLink::new(store.borrow().clone(), move |tree: &Value| {
        *sink.borrow_mut() = tree.clone();
    });

    link::apply(&mut target, |tree| update(tree, "name", json!("new"))).unwrap();

    assert_eq!(*store.borrow(), json!({"name": "new"}));
    assert_eq!(target.data(), &json!({"name": "new"}));
}

#[test]
fn test_host_link_setter_not_called_on_failure() {
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let mut target = HostLink::new(json!({"name": "old"}), move |_: &Value| {
        *counter.borrow_mut() += 1;
    });

    let result = link::apply(&mut target, |tree| update(tree, "missing", json!("new")));

    assert!(result.is_err());
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_apply_through_trait_object() {
    let mut target = ValueLink::new(json!({"blocks": [{"id": 1}]}));
    let dyn_link: &mut dyn DataLink = &mut target;
    link::apply(dyn_link, |tree| remove(tree, "blocks[1]")).unwrap();

    assert_eq!(target.data["blocks"], json!([]));
}
