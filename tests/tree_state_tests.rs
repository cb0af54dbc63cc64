use std::cell::RefCell;
use std::rc::Rc;

use treeaccess::document::model::NodeId;
use treeaccess::editor::tree_state::{StateFlag, TreeState};

#[test]
fn test_flags_default_off_except_expanded() {
    let state = TreeState::new();
    let id = NodeId::from("n1");
    assert!(state.is_expanded(&id));
    assert!(!state.is_focused(&id));
    assert!(!state.is_menu_open(&id));
    assert!(!state.is_settings_open(&id));
    assert!(!state.is_drop(&id));
    assert!(!state.is_disabled_drop(&id));
    assert!(!state.is_dragged_over(&id));
}

#[test]
fn test_flag_changes_are_reported() {
    let state = TreeState::new();
    let id = NodeId::from("n1");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _subscription = state.subscribe(move |change| {
        sink.borrow_mut().push((change.flag, change.value));
    });

    state.set_menu_open(&id, true);
    state.toggle_expanded(&id);
    state.set_menu_open(&id, true);

    assert_eq!(
        *seen.borrow(),
        vec![(StateFlag::MenuOpen, true), (StateFlag::Expanded, false)]
    );
}

#[test]
fn test_active_node_notifies_subscribers() {
    let state = TreeState::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = state.subscribe_active(move |active| sink.borrow_mut().push(active.clone()));

    state.set_active_node_id(Some(NodeId::from("a")));
    state.set_active_node_id(Some(NodeId::from("a")));
    state.set_active_node_id(None);
    drop(subscription);
    state.set_active_node_id(Some(NodeId::from("b")));

    assert_eq!(*seen.borrow(), vec![Some(NodeId::from("a")), None]);
    assert!(state.is_active(&NodeId::from("b")));
}

#[test]
fn test_reset_forgets_everything() {
    let state = TreeState::new();
    let id = NodeId::from("n1");
    state.set_expanded(&id, false);
    state.set_active_node_id(Some(id.clone()));
    state.reset();

    assert!(state.is_empty());
    assert!(state.is_expanded(&id));
    assert_eq!(state.active_node_id(), None);
}
