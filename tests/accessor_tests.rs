use std::rc::Rc;

use serde_json::json;
use treeaccess::document::model::{NodeKind, Scalar};
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::tree::EditorTree;
use treeaccess::error::TreeError;

fn tree() -> EditorTree<ValueTree> {
    EditorTree::with_defaults(ValueTree::from_json(&json!({
        "name": "Ada",
        "list": ["x", "y", "z"],
        "address": {"city": "Paris"}
    })))
}

#[test]
fn test_same_node_same_accessor() {
    let tree = tree();
    let list = tree.root().child_at(1).unwrap();
    let again = tree.get(list.id()).unwrap();
    assert!(Rc::ptr_eq(&list, &again));
    assert!(Rc::ptr_eq(&list.child_at(0).unwrap(), &list.children()[0]));
}

#[test]
fn test_insert_at_keeps_existing_items() {
    let tree = tree();
    let list = tree.root().child_at(1).unwrap();
    let before: Vec<_> = list.children();

    let inserted = list.insert_at(1).unwrap();

    assert_eq!(list.child_count(), 4);
    assert_eq!(inserted.index(), Some(1));
    assert_eq!(inserted.value(), Some(Scalar::Null));
    let after = list.children();
    assert!(Rc::ptr_eq(&after[0], &before[0]));
    assert!(Rc::ptr_eq(&after[2], &before[1]));
    assert!(Rc::ptr_eq(&after[3], &before[2]));
    assert_eq!(after[3].path(), "list[3]");
    assert_eq!(tree.root().plain_value(), Some(json!({
        "name": "Ada",
        "list": ["x", null, "y", "z"],
        "address": {"city": "Paris"}
    })));
}

#[test]
fn test_insert_at_end_and_out_of_bounds() {
    let tree = tree();
    let list = tree.root().child_at(1).unwrap();
    let last = list.insert_at(3).unwrap();
    assert_eq!(last.index(), Some(3));

    let err = list.insert_at(9).unwrap_err();
    assert_eq!(err, TreeError::IndexOutOfBounds { index: 9, len: 4 });

    let name = tree.root().child_at(0).unwrap();
    assert!(matches!(name.insert_at(0), Err(TreeError::NotAnArray(_))));
}

#[test]
fn test_removed_node_leaves_cache_and_state() {
    let tree = tree();
    let address = tree.root().child_at(2).unwrap();
    let city = address.child_at(0).unwrap();
    city.state().set_menu_open(true);
    tree.state().set_active_node_id(Some(city.id().clone()));

    address.remove().unwrap();

    assert!(!city.is_alive());
    assert!(tree.get(city.id()).is_none());
    assert_eq!(tree.state().active_node_id(), None);
    assert!(!tree.state().node_ids().contains(city.id()));
}

#[test]
fn test_change_kind_gives_new_accessor() {
    let tree = tree();
    let name = tree.root().child_at(0).unwrap();
    let replaced = name.change_kind(NodeKind::Object).unwrap();

    assert_ne!(replaced.id(), name.id());
    assert!(!name.is_alive());
    assert!(replaced.is_object());
    assert_eq!(replaced.name(), "name");
    assert_eq!(replaced.index(), Some(0));
}

#[test]
fn test_paths_and_test_ids() {
    let tree = tree();
    let city = tree.root().child_at(2).unwrap().child_at(0).unwrap();
    assert_eq!(city.path(), "address.city");
    assert_eq!(city.test_id(), "root-address-city");
    assert_eq!(tree.root().test_id(), "root");
    let y = tree.root().child_at(1).unwrap().child_at(1).unwrap();
    assert_eq!(y.test_id(), "root-list-1");
    assert!(y.is_list_item());
}

#[test]
fn test_accessor_detaches_with_tree() {
    let tree = tree();
    let name = tree.root().child_at(0).unwrap();
    drop(tree);

    assert!(!name.is_alive());
    assert_eq!(name.name(), "");
    assert_eq!(name.set_value(Scalar::Bool(true)), Err(TreeError::Detached));
}

#[test]
fn test_set_value_marks_dirty() {
    let tree = tree();
    let name = tree.root().child_at(0).unwrap();
    assert!(!tree.root().is_dirty());
    name.set_value(Scalar::Text("Grace".into())).unwrap();
    assert_eq!(name.value(), Some(Scalar::Text("Grace".into())));
    assert!(name.is_dirty());
    assert!(tree.root().is_dirty());
}
